//! Lag report assembled from one pass over all clusters.
//!
//! Each cluster and table keeps its own outcome, so failures stay visible
//! next to successful results instead of aborting the pass.

use std::fmt;

use crate::cluster::ClusterSpec;
use crate::error::Result;
use crate::lag::TableLagSummary;

/// Separator printed between cluster sections.
pub const CLUSTER_DIVIDER: &str = "---------";

/// Outcome of fetching and aggregating one table.
#[derive(Debug)]
pub struct TableReport {
    pub table: String,
    pub outcome: Result<Vec<TableLagSummary>>,
}

impl TableReport {
    pub fn new(table: impl Into<String>, outcome: Result<Vec<TableLagSummary>>) -> Self {
        Self {
            table: table.into(),
            outcome,
        }
    }

    /// Summaries that passed the threshold, empty on failure.
    pub fn lagging(&self) -> &[TableLagSummary] {
        match &self.outcome {
            Ok(summaries) => summaries,
            Err(_) => &[],
        }
    }

    pub fn is_failed(&self) -> bool {
        self.outcome.is_err()
    }
}

/// Outcome of one cluster: either discovery failed, or one entry per table.
#[derive(Debug)]
pub struct ClusterReport {
    pub cluster: ClusterSpec,
    pub tables: Result<Vec<TableReport>>,
}

impl ClusterReport {
    pub fn new(cluster: ClusterSpec, tables: Result<Vec<TableReport>>) -> Self {
        Self { cluster, tables }
    }

    fn table_reports(&self) -> &[TableReport] {
        match &self.tables {
            Ok(tables) => tables,
            Err(_) => &[],
        }
    }

    pub fn lagging(&self) -> impl Iterator<Item = &TableLagSummary> {
        self.table_reports().iter().flat_map(|t| t.lagging())
    }

    pub fn discovery_failed(&self) -> bool {
        self.tables.is_err()
    }

    pub fn tables_polled(&self) -> usize {
        self.table_reports().len()
    }

    pub fn failed_tables(&self) -> usize {
        self.table_reports().iter().filter(|t| t.is_failed()).count()
    }
}

/// Counts summarizing a report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReportStats {
    pub clusters: usize,
    pub discovery_failures: usize,
    pub tables_polled: usize,
    pub fetch_failures: usize,
    pub lagging_tables: usize,
}

/// Report for a full pass, in cluster configuration order.
#[derive(Debug, Default)]
pub struct LagReport {
    pub clusters: Vec<ClusterReport>,
}

impl LagReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, cluster: ClusterReport) {
        self.clusters.push(cluster);
    }

    pub fn lagging(&self) -> impl Iterator<Item = &TableLagSummary> {
        self.clusters.iter().flat_map(|c| c.lagging())
    }

    pub fn has_lagging_tables(&self) -> bool {
        self.lagging().next().is_some()
    }

    pub fn stats(&self) -> ReportStats {
        ReportStats {
            clusters: self.clusters.len(),
            discovery_failures: self.clusters.iter().filter(|c| c.discovery_failed()).count(),
            tables_polled: self.clusters.iter().map(ClusterReport::tables_polled).sum(),
            fetch_failures: self.clusters.iter().map(ClusterReport::failed_tables).sum(),
            lagging_tables: self.lagging().count(),
        }
    }

    /// Renders the human-readable report.
    ///
    /// Each cluster section opens with `Cluster: <name>`, then one
    /// `Table: <name>, Cumulative total lag: <n>` line per lagging table, or
    /// `Table discovery failed` when the controller could not list tables.
    /// A divider line separates sections.
    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for LagReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, cluster) in self.clusters.iter().enumerate() {
            if i > 0 {
                writeln!(f, "{}", CLUSTER_DIVIDER)?;
            }
            writeln!(f, "Cluster: {}", cluster.cluster.name)?;
            if cluster.discovery_failed() {
                writeln!(f, "Table discovery failed")?;
            }
            for summary in cluster.lagging() {
                writeln!(
                    f,
                    "Table: {}, Cumulative total lag: {}",
                    summary.table_name(),
                    summary.total_lag()
                )?;
            }
        }
        Ok(())
    }
}
