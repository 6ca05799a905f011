// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Waitlist engine coordinator.
//!
//! The [`WaitlistEngine`] ties the ranking components together over a single
//! [`RankStore`]:
//! - position allocation for new joins
//! - referral code generation
//! - out-of-order promotion (position mover)
//! - removal and rebalancing back to a dense `1..N` ranking
//! - read-only stats
//!
//! Every mutating operation is one read-compute-commit cycle against the
//! store, retried with backoff when the commit loses a race to a concurrent
//! writer. The store's version check is the only serialization point, so any
//! number of handler processes can share one store safely.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use waitlist_engine::{MemoryRankStore, WaitlistConfig, WaitlistEngine};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let store = Arc::new(MemoryRankStore::new());
//! let engine = WaitlistEngine::new(store, WaitlistConfig::default());
//!
//! let receipt = engine.join("ada@example.com").await.unwrap();
//! assert_eq!(receipt.position, 1);
//! # }
//! ```

mod allocator;
mod codes;
mod mover;
mod rebalance;
mod referral;
mod stats;
mod types;

pub use types::{
    JoinReceipt, ReferralJoinReceipt, ReferralOutcome, ReferralStats, StatsSummary,
};

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use crate::config::WaitlistConfig;
use crate::resilience::retry::RetryConfig;
use crate::storage::traits::{RankStore, StoreError};

#[derive(Error, Debug)]
pub enum EngineError {
    /// Referenced email or referral code does not resolve to an active entry.
    #[error("not found: {0}")]
    NotFound(String),
    /// Out-of-range target position, duplicate join, or similar bad input.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// Commits kept losing races until the retry budget ran out. Retryable
    /// by re-issuing the same logical operation.
    #[error("write conflict: {0}")]
    Conflict(String),
    /// The rank store could not be reached or refused service.
    #[error("rank store unavailable: {0}")]
    Unavailable(String),
}

impl EngineError {
    /// Whether re-executing the operation from fresh reads can succeed.
    #[must_use]
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict(_))
    }
}

impl From<StoreError> for EngineError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict { read_version } => Self::Conflict(format!(
                "store has moved past version {read_version}"
            )),
            // A taken email is a caller mistake; a taken referral code is a
            // lost race against another generator, re-entered on retry.
            StoreError::Duplicate {
                field: "email",
                value,
            } => Self::InvalidArgument(format!("'{value}' is already on the waitlist")),
            StoreError::Duplicate { field, value } => {
                Self::Conflict(format!("duplicate {field} '{value}'"))
            }
            StoreError::Backend(message) => Self::Unavailable(message),
        }
    }
}

/// Lowercased, trimmed form under which an email is stored and compared.
pub(crate) fn normalize_email(raw: &str) -> String {
    raw.trim().to_ascii_lowercase()
}

/// Main waitlist engine.
///
/// Cheap to share: wrap it in an [`Arc`] and call it from any number of
/// concurrent request handlers. The engine keeps no ranking state in memory;
/// every operation reads what it needs from the store.
pub struct WaitlistEngine {
    pub(crate) store: Arc<dyn RankStore>,
    pub(crate) config: WaitlistConfig,
    pub(crate) retry: RetryConfig,
}

impl WaitlistEngine {
    /// Create an engine over the given store.
    #[must_use]
    pub fn new(store: Arc<dyn RankStore>, config: WaitlistConfig) -> Self {
        let retry = RetryConfig {
            max_retries: Some(config.conflict_max_retries),
            initial_delay: Duration::from_millis(config.conflict_initial_delay_ms),
            max_delay: Duration::from_millis(config.conflict_max_delay_ms),
            factor: 2.0,
        };
        Self {
            store,
            config,
            retry,
        }
    }

    #[must_use]
    pub fn config(&self) -> &WaitlistConfig {
        &self.config
    }
}

/// Record an operation counter with a coarse status label.
pub(crate) fn record_outcome<T>(operation: &str, result: &Result<T, EngineError>) {
    let status = match result {
        Ok(_) => "success",
        Err(EngineError::NotFound(_) | EngineError::InvalidArgument(_)) => "rejected",
        Err(EngineError::Conflict(_)) => "conflict",
        Err(EngineError::Unavailable(_)) => "error",
    };
    crate::metrics::record_operation(operation, status);
}
