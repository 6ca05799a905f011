//! # Waitlist Engine
//!
//! A strictly-ordered waitlist ranking and referral engine.
//!
//! ## Architecture
//!
//! The engine maintains a dense, gapless `1..N` ranking over an unbounded set
//! of entrants and keeps it consistent under concurrent writers:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      WaitlistEngine                         │
//! │  • join / join_with_referral                               │
//! │  • move_to_position (range shift by exactly one slot)      │
//! │  • process_referral (bounded promotion + audit event)      │
//! │  • remove + rebalance (dense 1..N restored atomically)     │
//! │  • stats / referral_stats (pure reads)                     │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!              (read version → read rows → compute →
//!               commit WriteBatch, retry on conflict)
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    RankStore (trait)                        │
//! │  • atomic all-or-nothing batch commits                     │
//! │  • optimistic version check = sole serialization point     │
//! │  • email / referral-code uniqueness                        │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! No ranking state is cached in process memory: every operation is one
//! read-compute-commit cycle, so independent handler processes sharing one
//! store stay consistent without in-process locks.
//!
//! ## Quick Start
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
//! // Join the line
//! let grace = engine.join("grace@example.com").await.unwrap();
//! assert_eq!(grace.position, 1);
//!
//! // A referred join credits the referrer with a position boost
//! let ada = engine
//!     .join_with_referral("ada@example.com", &grace.referral_code)
//!     .await
//!     .unwrap();
//! assert!(ada.referral.credited);
//!
//! let stats = engine.stats().await.unwrap();
//! assert_eq!(stats.total, 2);
//! # }
//! ```
//!
//! ## Guarantees
//!
//! - **Dense ranking**: after any committed operation, active positions are a
//!   permutation of `1..N` with no gaps or duplicates
//! - **Atomic mutations**: every operation commits as one all-or-nothing
//!   batch; a failed referral never leaves a half-linked entrant
//! - **Conflict retry**: lost commit races re-execute from fresh reads with
//!   exponential backoff
//! - **Unique codes forever**: referral codes are never reused, even by
//!   removed entries
//!
//! ## Modules
//!
//! - [`engine`]: the [`WaitlistEngine`] orchestrating all components
//! - [`storage`]: the [`RankStore`] boundary and the in-memory reference store
//! - [`resilience`]: conflict retry with exponential backoff
//! - [`config`]: engine configuration
//! - [`metrics`]: backend-agnostic metrics instrumentation

pub mod config;
pub mod engine;
pub mod entry;
pub mod metrics;
pub mod resilience;
pub mod storage;

pub use config::WaitlistConfig;
pub use engine::{
    EngineError, JoinReceipt, ReferralJoinReceipt, ReferralOutcome, ReferralStats, StatsSummary,
    WaitlistEngine,
};
pub use entry::{EntryStatus, ReferralEvent, ReferralEventKind, WaitlistEntry};
pub use metrics::LatencyTimer;
pub use resilience::retry::RetryConfig;
pub use storage::memory::MemoryRankStore;
pub use storage::traits::{RankStore, StoreError, WriteBatch};
