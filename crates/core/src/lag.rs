//! Per-table lag aggregation.
//!
//! Every replica of every consuming segment contributes each entry of its
//! records lag map. Entries are not deduplicated by partition id: a
//! partition reported by two replicas (or two segments) is listed twice and
//! counted twice in the total.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::coerce::parse_lag;
use crate::segments::SegmentConsumingInfoMap;

/// Lag observed for one partition by one replica.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PartitionLag {
    pub partition_id: String,
    pub lag: i64,
}

impl PartitionLag {
    pub fn new(partition_id: impl Into<String>, lag: i64) -> Self {
        Self {
            partition_id: partition_id.into(),
            lag,
        }
    }
}

/// Lag collected for one table.
///
/// `total_lag` is kept equal to the sum of `partitions` by construction;
/// entries can only be added through [`TableLagSummary::record`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableLagSummary {
    table_name: String,
    partitions: Vec<PartitionLag>,
    total_lag: i64,
}

impl TableLagSummary {
    pub fn new(table_name: impl Into<String>) -> Self {
        Self {
            table_name: table_name.into(),
            partitions: Vec::new(),
            total_lag: 0,
        }
    }

    /// Appends one partition observation and adds it to the total.
    pub fn record(&mut self, partition_id: impl Into<String>, lag: i64) {
        self.total_lag = self.total_lag.saturating_add(lag);
        self.partitions.push(PartitionLag::new(partition_id, lag));
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    pub fn partitions(&self) -> &[PartitionLag] {
        &self.partitions
    }

    pub fn total_lag(&self) -> i64 {
        self.total_lag
    }

    /// Whether this table meets a lag threshold (inclusive).
    pub fn meets_threshold(&self, threshold: i64) -> bool {
        self.total_lag >= threshold
    }
}

/// Accumulates lag for any number of tables before threshold filtering.
///
/// A table gets an entry once it has at least one reporting replica, so a
/// table with no consuming segments never shows up in the output.
#[derive(Debug, Default)]
pub struct LagAccumulator {
    tables: BTreeMap<String, TableLagSummary>,
}

impl LagAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds one table's consuming segments into the accumulator.
    pub fn ingest(&mut self, table_name: &str, segments: &SegmentConsumingInfoMap) {
        for replicas in segments.values() {
            for replica in replicas {
                let summary = self
                    .tables
                    .entry(table_name.to_string())
                    .or_insert_with(|| TableLagSummary::new(table_name));

                for (partition_id, raw) in &replica.partition_offset_info.records_lag_map {
                    let lag = raw.as_deref().map(parse_lag).unwrap_or(0);
                    summary.record(partition_id.as_str(), lag);
                }
            }
        }
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.tables.len()
    }

    /// Returns the tables whose total lag is at least `threshold`.
    pub fn finish(self, threshold: i64) -> Vec<TableLagSummary> {
        self.tables
            .into_values()
            .filter(|summary| summary.meets_threshold(threshold))
            .collect()
    }
}

/// Aggregates one table's consuming segments and applies the lag threshold.
///
/// Returns zero or one summary. An empty result means the table is not
/// lagging (or has nothing consuming), never an error.
pub fn aggregate(
    table_name: &str,
    segments: &SegmentConsumingInfoMap,
    threshold: i64,
) -> Vec<TableLagSummary> {
    let mut acc = LagAccumulator::new();
    acc.ingest(table_name, segments);
    acc.finish(threshold)
}
