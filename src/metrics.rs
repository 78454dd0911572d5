//! Request metrics and statistics tracking for the car price service.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};
use tracing::info;

/// Metrics collector for served requests
pub struct ServiceMetrics {
    /// Form page views
    pub form_views: AtomicU64,
    /// Successful predictions
    pub predictions_served: AtomicU64,
    /// Failed predictions
    pub predictions_failed: AtomicU64,
    /// Failures by kind
    failures_by_kind: RwLock<HashMap<String, u64>>,
    /// Prediction handling times (in microseconds)
    prediction_times: RwLock<Vec<u64>>,
    /// Start time for rate calculation
    start_time: Instant,
}

impl ServiceMetrics {
    /// Create a new metrics collector
    pub fn new() -> Self {
        Self {
            form_views: AtomicU64::new(0),
            predictions_served: AtomicU64::new(0),
            predictions_failed: AtomicU64::new(0),
            failures_by_kind: RwLock::new(HashMap::new()),
            prediction_times: RwLock::new(Vec::with_capacity(1000)),
            start_time: Instant::now(),
        }
    }

    /// Record a form page view
    pub fn record_form_view(&self) {
        self.form_views.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a successful prediction
    pub fn record_prediction(&self, elapsed: Duration) {
        self.predictions_served.fetch_add(1, Ordering::Relaxed);
        self.record_time(elapsed);
    }

    /// Record a failed prediction
    pub fn record_failure(&self, kind: &str, elapsed: Duration) {
        self.predictions_failed.fetch_add(1, Ordering::Relaxed);

        if let Ok(mut by_kind) = self.failures_by_kind.write() {
            *by_kind.entry(kind.to_string()).or_insert(0) += 1;
        }
        self.record_time(elapsed);
    }

    fn record_time(&self, elapsed: Duration) {
        if let Ok(mut times) = self.prediction_times.write() {
            times.push(elapsed.as_micros() as u64);
            // Keep only last 10000 for memory efficiency
            if times.len() > 10000 {
                times.drain(0..5000);
            }
        }
    }

    /// Get prediction time statistics
    pub fn get_prediction_stats(&self) -> LatencyStats {
        let sorted = match self.prediction_times.read() {
            Ok(times) if !times.is_empty() => {
                let mut sorted = times.clone();
                sorted.sort_unstable();
                sorted
            }
            _ => return LatencyStats::default(),
        };

        let count = sorted.len();
        let sum: u64 = sorted.iter().sum();
        let at = |q: f64| sorted[((count as f64 * q) as usize).min(count - 1)];

        LatencyStats {
            count: count as u64,
            mean_us: sum / count as u64,
            p50_us: at(0.5),
            p95_us: at(0.95),
            p99_us: at(0.99),
            max_us: sorted[count - 1],
        }
    }

    /// Get failures by kind
    pub fn get_failures_by_kind(&self) -> HashMap<String, u64> {
        self.failures_by_kind
            .read()
            .map(|m| m.clone())
            .unwrap_or_default()
    }

    /// Get prediction requests per second since startup
    pub fn get_throughput(&self) -> f64 {
        let elapsed = self.start_time.elapsed().as_secs_f64();
        let total = self.predictions_served.load(Ordering::Relaxed)
            + self.predictions_failed.load(Ordering::Relaxed);
        if elapsed > 0.0 {
            total as f64 / elapsed
        } else {
            0.0
        }
    }

    /// Print summary statistics
    pub fn print_summary(&self) {
        let served = self.predictions_served.load(Ordering::Relaxed);
        let failed = self.predictions_failed.load(Ordering::Relaxed);
        let views = self.form_views.load(Ordering::Relaxed);
        let stats = self.get_prediction_stats();

        info!(
            form_views = views,
            predictions_served = served,
            predictions_failed = failed,
            throughput = format!("{:.2} req/s", self.get_throughput()),
            "Service metrics"
        );
        info!(
            mean_us = stats.mean_us,
            p50_us = stats.p50_us,
            p95_us = stats.p95_us,
            p99_us = stats.p99_us,
            max_us = stats.max_us,
            "Prediction latency"
        );
        for (kind, count) in self.get_failures_by_kind() {
            info!(kind = %kind, count = count, "Prediction failures");
        }
    }
}

impl Default for ServiceMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Prediction latency statistics
#[derive(Debug, Default, PartialEq, Eq)]
pub struct LatencyStats {
    pub count: u64,
    pub mean_us: u64,
    pub p50_us: u64,
    pub p95_us: u64,
    pub p99_us: u64,
    pub max_us: u64,
}

/// Periodic metrics reporter
pub struct MetricsReporter {
    metrics: Arc<ServiceMetrics>,
    interval_secs: u64,
}

impl MetricsReporter {
    pub fn new(metrics: Arc<ServiceMetrics>, interval_secs: u64) -> Self {
        Self {
            metrics,
            interval_secs,
        }
    }

    /// Start the periodic reporting task
    pub async fn start(self) {
        let mut interval = tokio::time::interval(Duration::from_secs(self.interval_secs.max(1)));
        // The first tick completes immediately.
        interval.tick().await;
        loop {
            interval.tick().await;
            self.metrics.print_summary();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_recording() {
        let metrics = ServiceMetrics::new();

        metrics.record_form_view();
        metrics.record_prediction(Duration::from_micros(100));
        metrics.record_prediction(Duration::from_micros(300));
        metrics.record_failure("missing_input", Duration::from_micros(20));
        metrics.record_failure("missing_input", Duration::from_micros(40));
        metrics.record_failure("unknown_category", Duration::from_micros(60));

        assert_eq!(metrics.form_views.load(Ordering::Relaxed), 1);
        assert_eq!(metrics.predictions_served.load(Ordering::Relaxed), 2);
        assert_eq!(metrics.predictions_failed.load(Ordering::Relaxed), 3);

        let by_kind = metrics.get_failures_by_kind();
        assert_eq!(by_kind.get("missing_input"), Some(&2));
        assert_eq!(by_kind.get("unknown_category"), Some(&1));
    }

    #[test]
    fn test_latency_stats() {
        let metrics = ServiceMetrics::new();
        assert_eq!(metrics.get_prediction_stats(), LatencyStats::default());

        for us in [10, 20, 30, 40] {
            metrics.record_prediction(Duration::from_micros(us));
        }
        let stats = metrics.get_prediction_stats();
        assert_eq!(stats.count, 4);
        assert_eq!(stats.mean_us, 25);
        assert_eq!(stats.p50_us, 30);
        assert_eq!(stats.max_us, 40);
    }
}
