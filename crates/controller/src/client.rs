//! HTTP client for the cluster controller REST API.

use std::collections::BTreeMap;

use async_trait::async_trait;
use lag_core::{ConsumingSegmentsInfo, ControllerCredentials, Error, Result};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use url::Url;

use crate::config::ControllerConfig;

/// Discovery response: response key to table names, e.g.
/// `{"tables": ["orders_REALTIME", "clicks_REALTIME"]}`.
pub type RealtimeTables = BTreeMap<String, Vec<String>>;

/// Controller operations the monitor depends on.
///
/// Implemented by [`ControllerClient`] over HTTP and by mocks in tests.
#[async_trait]
pub trait ControllerApi: Send + Sync {
    /// Lists real-time tables known to the controller at `controller_url`.
    async fn list_realtime_tables(&self, controller_url: &str) -> Result<RealtimeTables>;

    /// Fetches consuming segment telemetry for one table.
    async fn consuming_segments_info(
        &self,
        controller_url: &str,
        table: &str,
    ) -> Result<ConsumingSegmentsInfo>;
}

/// Flattens a discovery response into the table names to poll.
pub fn table_names(tables: &RealtimeTables) -> Vec<String> {
    tables.values().flatten().cloned().collect()
}

/// Controller client sharing one connection pool across all clusters.
#[derive(Clone)]
pub struct ControllerClient {
    http: reqwest::Client,
}

impl ControllerClient {
    /// Creates a client that sends `credentials` on every request.
    pub fn new(config: ControllerConfig, credentials: &ControllerCredentials) -> Result<Self> {
        let mut auth = HeaderValue::from_str(&credentials.header_value())
            .map_err(|e| Error::auth_config(format!("invalid controller credentials: {}", e)))?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);

        let http = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .default_headers(headers)
            .build()
            .map_err(|e| Error::config(format!("failed to create HTTP client: {}", e)))?;

        debug!(
            username = credentials.username(),
            timeout_secs = config.request_timeout_secs,
            "Created controller client"
        );

        Ok(Self { http })
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        debug!(url = %url, "GET");

        let response = self.http.get(url.clone()).send().await.map_err(|e| {
            warn!(url = %url, error = %e, "Controller request failed");
            Error::transport(format!("GET {} failed: {}", url, e))
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(url = %url, status = %status, body = %body, "Controller returned error");
            return Err(Error::http_status(
                status.as_u16(),
                format!("GET {} returned {}: {}", url, status, body),
            ));
        }

        let body = response.bytes().await.map_err(|e| {
            warn!(url = %url, error = %e, "Failed to read controller response");
            Error::transport(format!("GET {} body read failed: {}", url, e))
        })?;

        Ok(serde_json::from_slice(&body)?)
    }
}

#[async_trait]
impl ControllerApi for ControllerClient {
    async fn list_realtime_tables(&self, controller_url: &str) -> Result<RealtimeTables> {
        let mut url = endpoint(controller_url, &["tables"])?;
        url.query_pairs_mut().append_pair("type", "realtime");
        self.get_json(url).await
    }

    async fn consuming_segments_info(
        &self,
        controller_url: &str,
        table: &str,
    ) -> Result<ConsumingSegmentsInfo> {
        let url = endpoint(controller_url, &["tables", table, "consumingSegmentsInfo"])?;
        self.get_json(url).await
    }
}

/// Appends percent-encoded path segments to a controller base URL.
///
/// Keeps any path prefix on the base and ignores a trailing slash.
pub fn endpoint(controller_url: &str, segments: &[&str]) -> Result<Url> {
    let mut url = Url::parse(controller_url)
        .map_err(|e| Error::transport(format!("invalid controller URL {}: {}", controller_url, e)))?;

    url.path_segments_mut()
        .map_err(|_| Error::transport(format!("controller URL cannot be a base: {}", controller_url)))?
        .pop_if_empty()
        .extend(segments);

    Ok(url)
}
