//! Metrics collection using Prometheus
//!
//! Counters and histograms describing rating updates, solver effort and
//! batch timings. Each collector owns its own registry so several engines
//! (or tests) can run side by side.

use crate::error::RatingError;
use anyhow::Result;
use prometheus::{
    Encoder, Histogram, HistogramOpts, IntCounter, IntCounterVec, Opts, Registry, TextEncoder,
};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Metrics collector for rating updates
#[derive(Clone)]
pub struct MetricsCollector {
    registry: Arc<Registry>,

    /// Successful competitor updates
    pub updates_total: IntCounter,

    /// Failed competitor updates by error kind
    pub update_failures_total: IntCounterVec,

    /// Illinois iterations per volatility solve
    pub solver_iterations: Histogram,

    /// Wall time of a full registry run
    pub batch_duration_seconds: Histogram,
}

impl MetricsCollector {
    /// Create a new metrics collector with its own registry
    pub fn new() -> Result<Self> {
        Self::with_registry(Arc::new(Registry::new()))
    }

    /// Create a new metrics collector with custom registry
    pub fn with_registry(registry: Arc<Registry>) -> Result<Self> {
        let updates_total = IntCounter::new(
            "glicko_updates_total",
            "Total successful competitor rating updates",
        )?;
        registry.register(Box::new(updates_total.clone()))?;

        let update_failures_total = IntCounterVec::new(
            Opts::new(
                "glicko_update_failures_total",
                "Total failed competitor rating updates",
            ),
            &["kind"],
        )?;
        registry.register(Box::new(update_failures_total.clone()))?;

        let solver_iterations = Histogram::with_opts(
            HistogramOpts::new(
                "glicko_solver_iterations",
                "Illinois iterations per volatility solve",
            )
            .buckets(vec![1.0, 2.0, 3.0, 5.0, 8.0, 13.0, 21.0, 34.0, 55.0, 100.0]),
        )?;
        registry.register(Box::new(solver_iterations.clone()))?;

        let batch_duration_seconds = Histogram::with_opts(HistogramOpts::new(
            "glicko_batch_duration_seconds",
            "Duration of a full rating period run in seconds",
        ))?;
        registry.register(Box::new(batch_duration_seconds.clone()))?;

        Ok(Self {
            registry,
            updates_total,
            update_failures_total,
            solver_iterations,
            batch_duration_seconds,
        })
    }

    /// Record a successful update
    pub fn record_update(&self, solver_iterations: usize) {
        self.updates_total.inc();
        if solver_iterations > 0 {
            self.solver_iterations.observe(solver_iterations as f64);
        }
    }

    /// Record a failed update
    pub fn record_failure(&self, error: &RatingError) {
        self.update_failures_total
            .with_label_values(&[error.kind()])
            .inc();
    }

    /// Record the duration of a registry-wide run
    pub fn record_batch(&self, duration: Duration) {
        self.batch_duration_seconds.observe(duration.as_secs_f64());
    }

    /// Render every metric in the Prometheus text exposition format
    pub fn render(&self) -> Result<String> {
        let metric_families = self.registry.gather();
        TextEncoder::new()
            .encode_to_string(&metric_families)
            .map_err(|e| anyhow::anyhow!("Failed to encode metrics: {}", e))
    }

    /// Create a timer for measuring operation duration
    pub fn start_timer(&self) -> MetricsTimer {
        MetricsTimer::new()
    }
}

impl std::fmt::Debug for MetricsCollector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetricsCollector")
            .field("updates_total", &self.updates_total.get())
            .finish_non_exhaustive()
    }
}

/// Timer for measuring operation durations
pub struct MetricsTimer {
    start: Instant,
}

impl MetricsTimer {
    fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Get the elapsed duration
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Stop the timer and return the duration
    pub fn stop(self) -> Duration {
        self.elapsed()
    }
}
