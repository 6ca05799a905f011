//! Read-only stats over entries and the referral event log.

use super::types::{ReferralStats, StatsSummary};
use super::{normalize_email, EngineError, WaitlistEngine};
use crate::entry::{now_millis, WaitlistEntry};

const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// Summarize an active snapshot at a given instant.
pub(crate) fn compute_stats(active: &[WaitlistEntry], now_ms: i64) -> StatsSummary {
    let total = active.len() as u64;
    if total == 0 {
        return StatsSummary::empty();
    }

    let waited_ms: f64 = active
        .iter()
        .map(|e| (now_ms - e.joined_at).max(0) as f64)
        .sum();

    StatsSummary {
        total,
        average_wait_days: waited_ms / total as f64 / MILLIS_PER_DAY,
        // With a dense 1..N ranking the midpoint position IS the median.
        median_position: total.div_ceil(2),
    }
}

impl WaitlistEngine {
    /// Summary metrics over the active entry set. Pure read.
    pub async fn stats(&self) -> Result<StatsSummary, EngineError> {
        let active = self.store.list_active().await?;
        let summary = compute_stats(&active, now_millis());
        crate::metrics::set_active_entries(summary.total);
        Ok(summary)
    }

    /// Referral performance of one entry: referred entrants plus the credited
    /// event history. Pure read; `NotFound` when the email has no entry.
    pub async fn referral_stats(&self, email: &str) -> Result<ReferralStats, EngineError> {
        let email = normalize_email(email);

        if self.store.get_entry(&email).await?.is_none() {
            return Err(EngineError::NotFound(format!(
                "no waitlist entry for '{email}'"
            )));
        }

        let referred = self.store.list_referred_by(&email).await?;
        let history = self.store.events_for(&email).await?;
        let positions_gained = history.iter().map(|e| e.position_change()).sum();

        Ok(ReferralStats {
            total_referrals: referred.len() as u64,
            active_referrals: referred.iter().filter(|e| e.is_active()).count() as u64,
            positions_gained,
            history,
        })
    }

    /// Current rank of an active entry. Pure read.
    pub async fn position_of(&self, email: &str) -> Result<u64, EngineError> {
        let email = normalize_email(email);
        match self.store.get_entry(&email).await? {
            Some(entry) if entry.is_active() => Ok(entry.position),
            _ => Err(EngineError::NotFound(format!(
                "no active waitlist entry for '{email}'"
            ))),
        }
    }
}
