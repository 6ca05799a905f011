// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Metrics instrumentation for the waitlist engine.
//!
//! Uses the `metrics` crate for backend-agnostic metrics collection.
//! The embedding service is responsible for choosing the exporter
//! (Prometheus, OTEL, etc.)
//!
//! # Metric Naming Convention
//! - `waitlist_engine_` prefix for all metrics
//! - `_total` suffix for counters
//! - `_seconds` suffix for duration histograms
//!
//! # Labels
//! - `operation`: join, referral, move, remove, rebalance
//! - `status`: success, rejected, conflict, error

use metrics::{counter, gauge, histogram};
use std::time::{Duration, Instant};

/// Record an engine operation outcome
pub fn record_operation(operation: &str, status: &str) {
    counter!(
        "waitlist_engine_operations_total",
        "operation" => operation.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

/// Record operation latency
pub fn record_latency(operation: &str, duration: Duration) {
    histogram!(
        "waitlist_engine_operation_seconds",
        "operation" => operation.to_string()
    )
    .record(duration.as_secs_f64());
}

/// Record a retry after a lost commit race
pub fn record_retry(operation: &str) {
    counter!(
        "waitlist_engine_conflict_retries_total",
        "operation" => operation.to_string()
    )
    .increment(1);
}

/// Record a referral code collision (regeneration needed)
pub fn record_code_collision() {
    counter!("waitlist_engine_code_collisions_total").increment(1);
}

/// Record a credited referral
pub fn record_referral_credited() {
    counter!("waitlist_engine_referrals_credited_total").increment(1);
}

/// Set the current number of active waitlist entries
pub fn set_active_entries(count: u64) {
    gauge!("waitlist_engine_active_entries").set(count as f64);
}

/// A timing guard that records latency on drop
pub struct LatencyTimer {
    operation: &'static str,
    start: Instant,
}

impl LatencyTimer {
    /// Start a new latency timer
    pub fn new(operation: &'static str) -> Self {
        Self {
            operation,
            start: Instant::now(),
        }
    }
}

impl Drop for LatencyTimer {
    fn drop(&mut self) {
        record_latency(self.operation, self.start.elapsed());
    }
}

/// Convenience macro for timing operations
#[macro_export]
macro_rules! time_operation {
    ($op:expr) => {
        $crate::metrics::LatencyTimer::new($op)
    };
}
