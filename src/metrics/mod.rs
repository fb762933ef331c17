//! Metrics for the rating engine
//!
//! Prometheus counters and histograms for rating updates, plus a timer
//! helper used to measure registry-wide runs.

pub mod collector;

pub use collector::{MetricsCollector, MetricsTimer};
