//! One polling pass over every configured cluster.

use std::sync::Arc;
use std::time::Instant;

use controller_client::{table_names, ControllerApi};
use lag_core::{aggregate, ClusterReport, ClusterSpec, LagReport, Result, TableReport};
use telemetry::metrics;
use tracing::{error, info};

/// Polls clusters one after another and aggregates lag per table.
///
/// Discovery and fetch failures are logged and recorded in the report;
/// they never abort the pass.
#[derive(Clone)]
pub struct LagMonitor {
    controller: Arc<dyn ControllerApi>,
}

impl LagMonitor {
    pub fn new(controller: Arc<dyn ControllerApi>) -> Self {
        Self { controller }
    }

    /// Runs discovery, fetch and aggregation for every cluster in order.
    pub async fn run_pass(&self, clusters: &[ClusterSpec]) -> LagReport {
        let started = Instant::now();
        let mut report = LagReport::new();

        for cluster in clusters {
            info!(
                cluster = %cluster.name,
                url = %cluster.controller_url,
                threshold = cluster.lag_threshold,
                "Processing cluster"
            );
            metrics().clusters_polled.inc();

            let tables = self.poll_cluster(cluster).await;
            report.push(ClusterReport::new(cluster.clone(), tables));
        }

        let stats = report.stats();
        metrics().passes.inc();
        metrics()
            .pass_duration_ms
            .observe(elapsed_ms(started));
        metrics()
            .last_pass_lagging_tables
            .set(saturating_u64(stats.lagging_tables));

        info!(
            clusters = stats.clusters,
            discovery_failures = stats.discovery_failures,
            tables = stats.tables_polled,
            fetch_failures = stats.fetch_failures,
            lagging = stats.lagging_tables,
            elapsed_ms = elapsed_ms(started),
            "Pass complete"
        );

        report
    }

    async fn poll_cluster(&self, cluster: &ClusterSpec) -> Result<Vec<TableReport>> {
        let started = Instant::now();
        let discovered = self
            .controller
            .list_realtime_tables(&cluster.controller_url)
            .await;
        metrics()
            .controller_latency_ms
            .observe(elapsed_ms(started));

        let tables = match discovered {
            Ok(tables) => table_names(&tables),
            Err(e) => {
                error!(
                    cluster = %cluster.name,
                    kind = e.kind(),
                    error = %e,
                    "Table discovery failed, skipping cluster"
                );
                metrics().discovery_failures.inc();
                return Err(e);
            }
        };

        info!(cluster = %cluster.name, tables = tables.len(), "Discovered realtime tables");

        let mut reports = Vec::with_capacity(tables.len());
        for table in tables {
            reports.push(self.poll_table(cluster, table).await);
        }
        Ok(reports)
    }

    async fn poll_table(&self, cluster: &ClusterSpec, table: String) -> TableReport {
        info!(cluster = %cluster.name, table = %table, "Fetching consumer lag");
        metrics().tables_polled.inc();

        let started = Instant::now();
        let outcome = self
            .controller
            .consuming_segments_info(&cluster.controller_url, &table)
            .await
            .map(|info| aggregate(&table, info.segments(), cluster.lag_threshold));
        metrics()
            .controller_latency_ms
            .observe(elapsed_ms(started));

        match &outcome {
            Ok(lagging) => {
                for summary in lagging {
                    info!(
                        cluster = %cluster.name,
                        table = %summary.table_name(),
                        total_lag = summary.total_lag(),
                        partitions = summary.partitions().len(),
                        "Table over lag threshold"
                    );
                }
                metrics().tables_over_threshold.inc_by(saturating_u64(lagging.len()));
            }
            Err(e) => {
                error!(
                    cluster = %cluster.name,
                    table = %table,
                    kind = e.kind(),
                    error = %e,
                    "Consumer lag fetch failed, skipping table"
                );
                metrics().fetch_failures.inc();
            }
        }

        TableReport::new(table, outcome)
    }
}

fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}

fn saturating_u64(n: usize) -> u64 {
    u64::try_from(n).unwrap_or(u64::MAX)
}
