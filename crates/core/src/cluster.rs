//! Monitored cluster definitions.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::{Error, Result};

/// One monitored cluster, as listed under `clusters` in the config file.
///
/// Field names match the JSON config (`pinotControllerURL`, `lagThreshold`).
/// The lowercase aliases cover config sources that fold key case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct ClusterSpec {
    #[validate(length(min = 1))]
    pub name: String,
    /// Controller base URL, e.g. `https://pinot-controller.prod:9000`.
    #[serde(rename = "pinotControllerURL", alias = "pinotcontrollerurl")]
    #[validate(url)]
    pub controller_url: String,
    /// Minimum total lag for a table to be reported.
    #[serde(rename = "lagThreshold", alias = "lagthreshold")]
    #[validate(range(min = 0))]
    pub lag_threshold: i64,
}

impl ClusterSpec {
    pub fn new(name: impl Into<String>, controller_url: impl Into<String>, lag_threshold: i64) -> Self {
        Self {
            name: name.into(),
            controller_url: controller_url.into(),
            lag_threshold,
        }
    }
}

/// Validates the configured cluster list.
pub fn validate_clusters(clusters: &[ClusterSpec]) -> Result<()> {
    if clusters.is_empty() {
        return Err(Error::config("no clusters configured"));
    }

    for (i, cluster) in clusters.iter().enumerate() {
        cluster
            .validate()
            .map_err(|e| Error::config(format!("clusters[{}] ({}): {}", i, cluster.name, e)))?;
    }

    Ok(())
}
