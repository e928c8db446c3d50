//! Runs passes once or on a fixed interval and publishes each report.

use std::future::Future;
use std::time::Duration;

use lag_core::{ClusterSpec, LagReport, CLUSTER_DIVIDER};
use notify::{Notification, NotificationWorker};
use telemetry::metrics;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{error, info};

use crate::pass::LagMonitor;

/// Scheduler configuration.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Time between passes; `None` runs a single pass.
    pub poll_interval: Option<Duration>,
    /// Subject line for report notifications.
    pub subject: String,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            poll_interval: None,
            subject: "Pinot consumer lag report".to_string(),
        }
    }
}

/// Drives the monitor and hands reports to stdout and notification channels.
pub struct MonitorScheduler {
    config: SchedulerConfig,
    monitor: LagMonitor,
    clusters: Vec<ClusterSpec>,
    notifier: NotificationWorker,
}

impl MonitorScheduler {
    pub fn new(
        config: SchedulerConfig,
        monitor: LagMonitor,
        clusters: Vec<ClusterSpec>,
        notifier: NotificationWorker,
    ) -> Self {
        Self {
            config,
            monitor,
            clusters,
            notifier,
        }
    }

    /// Runs one pass, prints the report and sends notifications.
    pub async fn run_once(&self) -> LagReport {
        let report = self.monitor.run_pass(&self.clusters).await;

        println!("{}", CLUSTER_DIVIDER);
        print!("{}", report.render());

        if let Some(notification) = Notification::from_report(&report, &self.config.subject) {
            match self.notifier.send(&notification).await {
                Ok(()) => metrics().notifications_sent.inc(),
                Err(e) => {
                    error!(error = %e, "Failed to deliver lag notification");
                    metrics().notification_failures.inc();
                }
            }
        }

        info!(metrics = ?metrics().snapshot(), "Run metrics");
        report
    }

    /// Runs until `shutdown` resolves, or a single pass without an interval.
    ///
    /// A pass in flight is abandoned as soon as `shutdown` resolves.
    pub async fn run<F>(&self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        let Some(period) = self.config.poll_interval else {
            tokio::select! {
                _ = &mut shutdown => info!("Stopping lag monitor during pass"),
                _ = self.run_once() => {}
            }
            return;
        };

        info!(interval_secs = period.as_secs(), "Polling on interval");

        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("Stopping lag monitor");
                    return;
                }
                _ = ticker.tick() => {}
            }

            tokio::select! {
                _ = &mut shutdown => {
                    info!("Stopping lag monitor during pass");
                    return;
                }
                _ = self.run_once() => {}
            }
        }
    }
}
