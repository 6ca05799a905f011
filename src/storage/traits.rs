use async_trait::async_trait;
use thiserror::Error;

use crate::entry::{ReferralEvent, WaitlistEntry};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("commit lost a race: store has moved past version {read_version}")]
    Conflict { read_version: u64 },
    #[error("duplicate {field}: '{value}'")]
    Duplicate {
        field: &'static str,
        value: String,
    },
    #[error("rank store backend error: {0}")]
    Backend(String),
}

/// The all-or-nothing unit of mutation.
///
/// A batch carries everything one logical operation writes: new entries,
/// replaced entries, and audit events. [`RankStore::apply`] commits the whole
/// batch or none of it, and rejects the batch with [`StoreError::Conflict`]
/// when any commit has landed since `read_version` was observed.
#[derive(Debug, Clone, Default)]
pub struct WriteBatch {
    /// Store version every read feeding this batch was taken at.
    pub read_version: u64,
    /// Brand-new entries. Fail the batch if the email or referral code is taken.
    pub inserts: Vec<WaitlistEntry>,
    /// Full replacements of existing entries, keyed by email.
    pub updates: Vec<WaitlistEntry>,
    /// Referral events to append.
    pub events: Vec<ReferralEvent>,
}

impl WriteBatch {
    /// An empty batch validated against `read_version`.
    #[must_use]
    pub fn at(read_version: u64) -> Self {
        Self {
            read_version,
            ..Default::default()
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inserts.is_empty() && self.updates.is_empty() && self.events.is_empty()
    }
}

/// Persistence boundary for waitlist entries and referral events.
///
/// The store is the engine's sole serialization point: handlers in separate
/// processes coordinate exclusively through [`RankStore::apply`]'s version
/// check (optimistic compare-and-swap). Implementations must guarantee:
///
/// - `apply` is atomic: either every insert, update, and event in the batch
///   is committed, or none is.
/// - `apply` fails with [`StoreError::Conflict`] if any other batch committed
///   after `batch.read_version` was observed.
/// - email is unique across all entries; `referral_code` is unique across all
///   entries, active or removed, forever ([`StoreError::Duplicate`]).
/// - each committed batch bumps [`RankStore::version`] by exactly one.
#[async_trait]
pub trait RankStore: Send + Sync {
    /// Monotone commit counter. Read this before any reads that feed a batch.
    async fn version(&self) -> Result<u64, StoreError>;

    async fn get_entry(&self, email: &str) -> Result<Option<WaitlistEntry>, StoreError>;

    async fn get_by_referral_code(
        &self,
        code: &str,
    ) -> Result<Option<WaitlistEntry>, StoreError>;

    /// All active entries ordered by position ascending.
    async fn list_active(&self) -> Result<Vec<WaitlistEntry>, StoreError>;

    /// Count of active entries.
    /// Default implementation reads the full active list.
    async fn count_active(&self) -> Result<u64, StoreError> {
        Ok(self.list_active().await?.len() as u64)
    }

    /// Whether a referral code is already taken (by any entry, any status).
    /// Default implementation resolves the code to an entry.
    async fn code_exists(&self, code: &str) -> Result<bool, StoreError> {
        Ok(self.get_by_referral_code(code).await?.is_some())
    }

    /// Entries (any status) whose `referred_by` is `email`.
    async fn list_referred_by(&self, email: &str) -> Result<Vec<WaitlistEntry>, StoreError>;

    /// Referral events crediting `email`, oldest first.
    async fn events_for(&self, email: &str) -> Result<Vec<ReferralEvent>, StoreError>;

    /// Commit a batch atomically, or fail it whole.
    async fn apply(&self, batch: WriteBatch) -> Result<(), StoreError>;
}
