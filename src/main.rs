//! Pinot Consumer Lag Monitor
//!
//! Polls every configured cluster controller for its real-time tables,
//! aggregates per-partition consumer lag per table, and reports tables whose
//! total lag meets the cluster's threshold:
//! - Table discovery and consuming segment telemetry over the controller API
//! - Threshold-filtered lag report on stdout
//! - Optional email delivery and interval polling

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tokio::signal;
use tracing::{error, info, warn};

use controller_client::{ControllerClient, ControllerConfig};
use lag_core::{validate_clusters, ClusterSpec, ControllerCredentials, Error};
use monitor::{LagMonitor, MonitorScheduler, SchedulerConfig};
use notify::{EmailChannel, EmailConfig, NotificationChannel, NotificationWorker, SmtpCredentials};
use telemetry::init_tracing_from_env;

/// Environment variable naming the JSON config file.
const CONFIG_PATH_VAR: &str = "LAG_MONITOR_CONFIG";

const DEFAULT_CONFIG_PATH: &str = "config.json";

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct Config {
    #[serde(default)]
    clusters: Vec<ClusterSpec>,

    #[serde(default)]
    controller: ControllerConfig,

    /// Seconds between passes; absent runs a single pass
    #[serde(default)]
    poll_interval_secs: Option<u64>,

    #[serde(default)]
    email: EmailConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            clusters: Vec::new(),
            controller: ControllerConfig::default(),
            poll_interval_secs: None,
            email: EmailConfig::default(),
        }
    }
}

impl Config {
    fn validate(&self) -> lag_core::Result<()> {
        validate_clusters(&self.clusters)?;

        if self.controller.request_timeout_secs == 0 {
            return Err(Error::config("controller.request_timeout_secs must be positive"));
        }
        if self.poll_interval_secs == Some(0) {
            return Err(Error::config("poll_interval_secs must be positive"));
        }
        Ok(())
    }

    fn poll_interval(&self) -> Option<Duration> {
        self.poll_interval_secs.map(Duration::from_secs)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    init_tracing_from_env();

    // reqwest and lettre both sit on rustls 0.23, which needs a process-wide provider
    if rustls::crypto::ring::default_provider()
        .install_default()
        .is_err()
    {
        warn!("rustls crypto provider already installed");
    }

    info!("Starting lag monitor v{}", env!("CARGO_PKG_VERSION"));

    // Credentials are checked before anything touches the network
    let credentials =
        ControllerCredentials::from_env().context("Failed to read controller credentials")?;

    let config_path =
        std::env::var(CONFIG_PATH_VAR).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    let config = load_config(&config_path)
        .with_context(|| format!("Error loading config from {}", config_path))?;

    info!(
        clusters = config.clusters.len(),
        timeout_secs = config.controller.request_timeout_secs,
        poll_interval_secs = ?config.poll_interval_secs,
        email = config.email.is_enabled(),
        "Loaded config"
    );

    let controller = ControllerClient::new(config.controller.clone(), &credentials)
        .context("Failed to create controller client")?;

    let mut notifier = NotificationWorker::new();
    if config.email.is_enabled() {
        let smtp = SmtpCredentials::from_env().context("Failed to read SMTP credentials")?;
        let email = EmailChannel::new(&config.email, smtp).context("Invalid email config")?;
        notifier = notifier.with_channel(NotificationChannel::Email(Box::new(email)));
    }

    let scheduler = MonitorScheduler::new(
        SchedulerConfig {
            poll_interval: config.poll_interval(),
            subject: config.email.subject.clone(),
        },
        LagMonitor::new(Arc::new(controller)),
        config.clusters.clone(),
        notifier,
    );

    scheduler.run(shutdown_signal()).await;

    info!("Shutdown complete");
    Ok(())
}

/// Load configuration from the JSON file and environment.
fn load_config(path: &str) -> lag_core::Result<Config> {
    let built = config::Config::builder()
        // Start with defaults
        .add_source(
            config::Config::try_from(&Config::default())
                .map_err(|e| Error::config(format!("invalid defaults: {}", e)))?,
        )
        .add_source(config::File::new(path, config::FileFormat::Json).required(true))
        // Override with environment variables, e.g. LAG_MONITOR_CONTROLLER__REQUEST_TIMEOUT_SECS
        .add_source(
            config::Environment::with_prefix("LAG_MONITOR")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()
        .map_err(|e| Error::config(format!("error reading config file: {}", e)))?;

    let mut config: Config = built
        .try_deserialize()
        .map_err(|e| Error::config(format!("error parsing config file: {}", e)))?;

    // Lists don't come through the environment source cleanly
    if let Ok(recipients) = std::env::var("LAG_MONITOR_EMAIL_RECIPIENTS") {
        config.email.recipients = recipients
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
    }

    config.validate()?;
    Ok(config)
}

/// Graceful shutdown signal handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        }
        _ = terminate => {
            info!("Received terminate signal");
        }
    }
}
