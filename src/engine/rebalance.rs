//! Removal and rebalancing back to a dense `1..N` ranking.

use tracing::info;

use super::{normalize_email, record_outcome, EngineError, WaitlistEngine};
use crate::entry::{EntryStatus, WaitlistEntry};
use crate::metrics::LatencyTimer;
use crate::resilience::retry::retry_transient;
use crate::storage::traits::WriteBatch;

/// Rewrite the (position-sorted) entries whose rank disagrees with a dense
/// `1..N` assignment. Empty when the ranking is already dense.
pub(crate) fn plan_rebalance(active_sorted: &[WaitlistEntry]) -> Vec<WaitlistEntry> {
    active_sorted
        .iter()
        .enumerate()
        .filter_map(|(index, entry)| {
            let want = index as u64 + 1;
            if entry.position == want {
                return None;
            }
            let mut rewritten = entry.clone();
            rewritten.position = want;
            Some(rewritten)
        })
        .collect()
}

impl WaitlistEngine {
    /// Take an entry off the waitlist and close the gap it leaves.
    ///
    /// The status flip and the survivors' rebalance commit as one batch, so
    /// no reader ever observes a gapped ranking. The entry keeps its referral
    /// history and its code stays burned forever.
    pub async fn remove(&self, email: &str) -> Result<(), EngineError> {
        let email = normalize_email(email);

        let _timer = LatencyTimer::new("remove");
        let result = retry_transient("remove", &self.retry, EngineError::is_conflict, || {
            self.try_remove(&email)
        })
        .await;
        record_outcome("remove", &result);

        if result.is_ok() {
            info!(email = %email, "removed waitlist entry");
        }
        result
    }

    async fn try_remove(&self, email: &str) -> Result<(), EngineError> {
        let version = self.store.version().await?;
        let active = self.store.list_active().await?;

        let Some(entry) = active.iter().find(|e| e.email == email) else {
            return Err(EngineError::NotFound(format!(
                "no active waitlist entry for '{email}'"
            )));
        };

        let mut removed = entry.clone();
        removed.status = EntryStatus::Removed;

        let survivors: Vec<WaitlistEntry> = active
            .iter()
            .filter(|e| e.email != email)
            .cloned()
            .collect();
        let mut updates = plan_rebalance(&survivors);
        updates.push(removed);

        self.store
            .apply(WriteBatch {
                read_version: version,
                updates,
                ..Default::default()
            })
            .await?;

        crate::metrics::set_active_entries(survivors.len() as u64);
        Ok(())
    }

    /// Restore a dense `1..N` ranking over the current active order.
    ///
    /// The engine's own mutations never leave gaps, but bulk edits performed
    /// outside it can; call this afterwards. Idempotent: a dense ranking
    /// commits nothing.
    pub async fn rebalance(&self) -> Result<(), EngineError> {
        let _timer = LatencyTimer::new("rebalance");
        let result = retry_transient("rebalance", &self.retry, EngineError::is_conflict, || {
            self.try_rebalance()
        })
        .await;
        record_outcome("rebalance", &result);
        result
    }

    async fn try_rebalance(&self) -> Result<(), EngineError> {
        let version = self.store.version().await?;
        let active = self.store.list_active().await?;

        let updates = plan_rebalance(&active);
        if updates.is_empty() {
            return Ok(());
        }
        info!(rewritten = updates.len(), "rebalancing waitlist positions");

        self.store
            .apply(WriteBatch {
                read_version: version,
                updates,
                ..Default::default()
            })
            .await?;
        Ok(())
    }
}
