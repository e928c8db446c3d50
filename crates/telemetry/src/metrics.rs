//! In-process run counters.
//!
//! Counters are process-wide and only ever grow; a snapshot is logged after
//! each pass so repeated polling shows the running totals.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// A counter metric.
#[derive(Debug, Default)]
pub struct Counter(AtomicU64);

impl Counter {
    pub fn new() -> Self {
        Self(AtomicU64::new(0))
    }

    pub fn inc(&self) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_by(&self, n: u64) {
        self.0.fetch_add(n, Ordering::Relaxed);
    }

    pub fn get(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }
}

/// A gauge metric holding the latest observed value.
#[derive(Debug, Default)]
pub struct Gauge(AtomicU64);

impl Gauge {
    pub fn new() -> Self {
        Self(AtomicU64::new(0))
    }

    pub fn set(&self, val: u64) {
        self.0.store(val, Ordering::Relaxed);
    }

    pub fn get(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }
}

/// Histogram for request and pass latency.
#[derive(Debug)]
pub struct Histogram {
    /// Buckets: 10ms, 50ms, 100ms, 500ms, 1s, 5s, 10s, 30s, 60s
    buckets: [AtomicU64; 9],
    sum: AtomicU64,
    count: AtomicU64,
}

impl Default for Histogram {
    fn default() -> Self {
        Self::new()
    }
}

impl Histogram {
    const BUCKET_BOUNDS: [u64; 9] = [10, 50, 100, 500, 1_000, 5_000, 10_000, 30_000, 60_000];

    pub fn new() -> Self {
        Self {
            buckets: Default::default(),
            sum: AtomicU64::new(0),
            count: AtomicU64::new(0),
        }
    }

    /// Records a value in milliseconds.
    pub fn observe(&self, ms: u64) {
        self.sum.fetch_add(ms, Ordering::Relaxed);
        self.count.fetch_add(1, Ordering::Relaxed);

        let idx = Self::BUCKET_BOUNDS
            .iter()
            .position(|&bound| ms <= bound)
            .unwrap_or(Self::BUCKET_BOUNDS.len() - 1);
        self.buckets[idx].fetch_add(1, Ordering::Relaxed);
    }

    pub fn count(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }

    pub fn mean(&self) -> f64 {
        let count = self.count();
        if count == 0 {
            0.0
        } else {
            self.sum.load(Ordering::Relaxed) as f64 / count as f64
        }
    }

    /// Returns `(upper bound ms, count)` pairs.
    #[cfg(test)]
    fn buckets(&self) -> Vec<(u64, u64)> {
        Self::BUCKET_BOUNDS
            .iter()
            .zip(self.buckets.iter())
            .map(|(&bound, count)| (bound, count.load(Ordering::Relaxed)))
            .collect()
    }
}

/// Collected metrics for the lag monitor.
#[derive(Debug, Default)]
pub struct Metrics {
    pub passes: Counter,
    pub clusters_polled: Counter,
    pub discovery_failures: Counter,
    pub tables_polled: Counter,
    pub fetch_failures: Counter,
    pub tables_over_threshold: Counter,
    pub notifications_sent: Counter,
    pub notification_failures: Counter,

    pub controller_latency_ms: Histogram,
    pub pass_duration_ms: Histogram,

    /// Lagging tables found by the most recent pass.
    pub last_pass_lagging_tables: Gauge,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes a snapshot of current metrics.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            timestamp: Utc::now(),
            passes: self.passes.get(),
            clusters_polled: self.clusters_polled.get(),
            discovery_failures: self.discovery_failures.get(),
            tables_polled: self.tables_polled.get(),
            fetch_failures: self.fetch_failures.get(),
            tables_over_threshold: self.tables_over_threshold.get(),
            notifications_sent: self.notifications_sent.get(),
            notification_failures: self.notification_failures.get(),
            controller_latency_mean_ms: self.controller_latency_ms.mean(),
            pass_duration_mean_ms: self.pass_duration_ms.mean(),
            last_pass_lagging_tables: self.last_pass_lagging_tables.get(),
        }
    }
}

/// A snapshot of metrics at a point in time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub timestamp: DateTime<Utc>,
    pub passes: u64,
    pub clusters_polled: u64,
    pub discovery_failures: u64,
    pub tables_polled: u64,
    pub fetch_failures: u64,
    pub tables_over_threshold: u64,
    pub notifications_sent: u64,
    pub notification_failures: u64,
    pub controller_latency_mean_ms: f64,
    pub pass_duration_mean_ms: f64,
    pub last_pass_lagging_tables: u64,
}

/// Global metrics registry.
pub static METRICS: std::sync::LazyLock<Metrics> = std::sync::LazyLock::new(Metrics::new);

/// Get the global metrics instance.
pub fn metrics() -> &'static Metrics {
    &METRICS
}
