//! Mock implementations for testing.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use controller_client::{ControllerApi, RealtimeTables};
use lag_core::{ConsumingSegmentsInfo, Error, Result};
use parking_lot::Mutex;

/// A recorded controller call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    ListTables { controller_url: String },
    ConsumingInfo { controller_url: String, table: String },
}

#[derive(Default)]
struct MockCluster {
    fail_discovery: bool,
    tables: Vec<String>,
    segments: HashMap<String, ConsumingSegmentsInfo>,
    failing_tables: Vec<String>,
}

/// Mock controller keyed by controller URL.
///
/// Implements the same `ControllerApi` trait as the real `ControllerClient`
/// and records every call so tests can check ordering.
#[derive(Clone, Default)]
pub struct MockController {
    clusters: Arc<Mutex<HashMap<String, MockCluster>>>,
    calls: Arc<Mutex<Vec<Call>>>,
}

impl MockController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a table and the consuming info it returns.
    pub fn add_table(&self, controller_url: &str, table: &str, info: ConsumingSegmentsInfo) {
        let mut clusters = self.clusters.lock();
        let cluster = clusters.entry(controller_url.to_string()).or_default();
        cluster.tables.push(table.to_string());
        cluster.segments.insert(table.to_string(), info);
    }

    /// Registers a table whose fetch fails with a timeout.
    pub fn add_failing_table(&self, controller_url: &str, table: &str) {
        let mut clusters = self.clusters.lock();
        let cluster = clusters.entry(controller_url.to_string()).or_default();
        cluster.tables.push(table.to_string());
        cluster.failing_tables.push(table.to_string());
    }

    /// Makes discovery fail for a controller.
    pub fn fail_discovery(&self, controller_url: &str) {
        self.clusters
            .lock()
            .entry(controller_url.to_string())
            .or_default()
            .fail_discovery = true;
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl ControllerApi for MockController {
    async fn list_realtime_tables(&self, controller_url: &str) -> Result<RealtimeTables> {
        self.calls.lock().push(Call::ListTables {
            controller_url: controller_url.to_string(),
        });

        let clusters = self.clusters.lock();
        match clusters.get(controller_url) {
            Some(cluster) if cluster.fail_discovery => {
                Err(Error::http_status(503, "controller unavailable"))
            }
            Some(cluster) => Ok(RealtimeTables::from([("tables".to_string(), cluster.tables.clone())])),
            None => Err(Error::transport(format!("connection refused: {}", controller_url))),
        }
    }

    async fn consuming_segments_info(
        &self,
        controller_url: &str,
        table: &str,
    ) -> Result<ConsumingSegmentsInfo> {
        self.calls.lock().push(Call::ConsumingInfo {
            controller_url: controller_url.to_string(),
            table: table.to_string(),
        });

        let clusters = self.clusters.lock();
        let cluster = clusters
            .get(controller_url)
            .ok_or_else(|| Error::transport(format!("connection refused: {}", controller_url)))?;

        if cluster.failing_tables.iter().any(|t| t == table) {
            return Err(Error::transport("operation timed out"));
        }

        cluster
            .segments
            .get(table)
            .cloned()
            .ok_or_else(|| Error::http_status(404, format!("table {} not found", table)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_controller_serves_registered_tables() {
        let mock = MockController::new();
        mock.add_table("http://a:9000", "orders_REALTIME", ConsumingSegmentsInfo::default());

        let tables = mock.list_realtime_tables("http://a:9000").await.unwrap();
        assert_eq!(tables["tables"], vec!["orders_REALTIME".to_string()]);

        assert!(mock
            .consuming_segments_info("http://a:9000", "orders_REALTIME")
            .await
            .is_ok());
        assert_eq!(mock.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_mock_controller_failure_modes() {
        let mock = MockController::new();
        mock.fail_discovery("http://a:9000");
        mock.add_failing_table("http://b:9000", "slow_REALTIME");

        let err = mock.list_realtime_tables("http://a:9000").await.unwrap_err();
        assert_eq!(err.status(), Some(503));

        let err = mock
            .consuming_segments_info("http://b:9000", "slow_REALTIME")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "transport");

        assert!(mock.list_realtime_tables("http://unknown:9000").await.is_err());
    }
}
