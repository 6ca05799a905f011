use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;

use super::traits::{RankStore, StoreError, WriteBatch};
use crate::entry::{ReferralEvent, WaitlistEntry};

/// In-process [`RankStore`] with full transactional semantics.
///
/// Commits are validated against the version the caller read, so concurrent
/// writers race exactly as they would against a serializable database: one
/// wins, the rest see [`StoreError::Conflict`] and retry from fresh reads.
/// Used by embedding services that run single-node and by the test suite.
pub struct MemoryRankStore {
    inner: RwLock<Inner>,
}

#[derive(Default)]
struct Inner {
    version: u64,
    entries: HashMap<String, WaitlistEntry>,
    events: Vec<ReferralEvent>,
}

impl MemoryRankStore {
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner::default()),
        }
    }

    /// Total entry count, active and removed.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.read().entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.read().entries.is_empty()
    }

    /// Drop all entries and events, keeping the version counter.
    pub fn clear(&self) {
        let mut inner = self.inner.write();
        inner.entries.clear();
        inner.events.clear();
    }
}

impl Default for MemoryRankStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RankStore for MemoryRankStore {
    async fn version(&self) -> Result<u64, StoreError> {
        Ok(self.inner.read().version)
    }

    async fn get_entry(&self, email: &str) -> Result<Option<WaitlistEntry>, StoreError> {
        Ok(self.inner.read().entries.get(email).cloned())
    }

    async fn get_by_referral_code(
        &self,
        code: &str,
    ) -> Result<Option<WaitlistEntry>, StoreError> {
        Ok(self
            .inner
            .read()
            .entries
            .values()
            .find(|e| e.referral_code == code)
            .cloned())
    }

    async fn list_active(&self) -> Result<Vec<WaitlistEntry>, StoreError> {
        let mut active: Vec<WaitlistEntry> = self
            .inner
            .read()
            .entries
            .values()
            .filter(|e| e.is_active())
            .cloned()
            .collect();
        active.sort_by_key(|e| e.position);
        Ok(active)
    }

    async fn count_active(&self) -> Result<u64, StoreError> {
        Ok(self
            .inner
            .read()
            .entries
            .values()
            .filter(|e| e.is_active())
            .count() as u64)
    }

    async fn list_referred_by(&self, email: &str) -> Result<Vec<WaitlistEntry>, StoreError> {
        let mut referred: Vec<WaitlistEntry> = self
            .inner
            .read()
            .entries
            .values()
            .filter(|e| e.referred_by.as_deref() == Some(email))
            .cloned()
            .collect();
        referred.sort_by(|a, b| a.joined_at.cmp(&b.joined_at).then(a.email.cmp(&b.email)));
        Ok(referred)
    }

    async fn events_for(&self, email: &str) -> Result<Vec<ReferralEvent>, StoreError> {
        Ok(self
            .inner
            .read()
            .events
            .iter()
            .filter(|ev| ev.email == email)
            .cloned()
            .collect())
    }

    async fn apply(&self, batch: WriteBatch) -> Result<(), StoreError> {
        let mut inner = self.inner.write();

        if batch.read_version != inner.version {
            return Err(StoreError::Conflict {
                read_version: batch.read_version,
            });
        }

        // Validate everything before touching state so a rejected batch
        // leaves the store exactly as it was.
        for insert in &batch.inserts {
            if inner.entries.contains_key(&insert.email) {
                return Err(StoreError::Duplicate {
                    field: "email",
                    value: insert.email.clone(),
                });
            }
            if inner
                .entries
                .values()
                .any(|e| e.referral_code == insert.referral_code)
            {
                return Err(StoreError::Duplicate {
                    field: "referral_code",
                    value: insert.referral_code.clone(),
                });
            }
        }
        for update in &batch.updates {
            if !inner.entries.contains_key(&update.email) {
                return Err(StoreError::Backend(format!(
                    "update targets unknown entry '{}'",
                    update.email
                )));
            }
        }

        for insert in batch.inserts {
            inner.entries.insert(insert.email.clone(), insert);
        }
        for update in batch.updates {
            inner.entries.insert(update.email.clone(), update);
        }
        inner.events.extend(batch.events);
        inner.version += 1;
        Ok(())
    }
}
