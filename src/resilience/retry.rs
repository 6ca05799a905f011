// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Retry logic with exponential backoff.
//!
//! Lost commit races are the expected steady-state of an optimistic engine,
//! so the retry loop distinguishes transient errors (retry with backoff)
//! from terminal ones (return immediately).
//!
//! # Example
//!
//! ```
//! use waitlist_engine::RetryConfig;
//! use std::time::Duration;
//!
//! // Conflict preset: bounded, fast backoff
//! let conflict = RetryConfig::conflict();
//! assert_eq!(conflict.max_retries, Some(8));
//! assert_eq!(conflict.initial_delay, Duration::from_millis(10));
//! ```

use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, warn};

/// Configuration for operation retry behavior.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub factor: f64,
    /// Total attempts before giving up. `None` retries forever.
    pub max_retries: Option<usize>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self::conflict()
    }
}

impl RetryConfig {
    /// Retry preset for lost commit races.
    /// Conflicts resolve in one or two re-reads under normal contention, so
    /// the backoff starts short and the budget is bounded.
    #[must_use]
    pub fn conflict() -> Self {
        Self {
            max_retries: Some(8),
            initial_delay: Duration::from_millis(10),
            max_delay: Duration::from_millis(500),
            factor: 2.0,
        }
    }

    /// Fast retry for tests (minimal delays)
    #[cfg(test)]
    pub fn test() -> Self {
        Self {
            max_retries: Some(3),
            initial_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(10),
            factor: 2.0,
        }
    }
}

/// Run `operation`, retrying with backoff while `is_transient` holds.
///
/// Terminal errors return immediately. Transient errors retry until the
/// configured budget is exhausted, then the last error is returned.
pub async fn retry_transient<F, Fut, T, E>(
    operation_name: &str,
    config: &RetryConfig,
    is_transient: impl Fn(&E) -> bool,
    mut operation: F,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let mut delay = config.initial_delay;
    let mut attempts = 0;

    loop {
        match operation().await {
            Ok(val) => {
                if attempts > 0 {
                    info!(
                        "Operation '{}' succeeded after {} retries",
                        operation_name, attempts
                    );
                }
                return Ok(val);
            }
            Err(err) if is_transient(&err) => {
                attempts += 1;
                crate::metrics::record_retry(operation_name);

                if let Some(max) = config.max_retries {
                    if attempts >= max {
                        warn!(
                            "Operation '{}' exhausted {} attempts: {}",
                            operation_name, max, err
                        );
                        return Err(err);
                    }
                }

                debug!(
                    "Operation '{}' lost a race (attempt {}): {}. Retrying in {:?}...",
                    operation_name, attempts, err, delay
                );
                sleep(delay).await;
                delay = (delay.mul_f64(config.factor)).min(config.max_delay);
            }
            Err(err) => return Err(err),
        }
    }
}
