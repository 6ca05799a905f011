//! Position mover: relocate one entry and shift the range it crosses.

use tracing::info;

use super::{normalize_email, record_outcome, EngineError, WaitlistEngine};
use crate::entry::WaitlistEntry;
use crate::metrics::LatencyTimer;
use crate::resilience::retry::retry_transient;
use crate::storage::traits::WriteBatch;

/// Compute the minimal set of rewritten entries that places `email` at
/// `new_position`.
///
/// Entries strictly between the old and new position shift by exactly one
/// slot toward the vacated side; everything outside the crossed range is
/// untouched. Assumes `active` holds a dense ranking (the engine rebalances
/// on every removal) and that `new_position` is within `[1, N]`.
/// Returns an empty plan when the entry already sits at the target.
pub(crate) fn plan_move(
    active: &[WaitlistEntry],
    email: &str,
    new_position: u64,
) -> Vec<WaitlistEntry> {
    let Some(target) = active.iter().find(|e| e.email == email) else {
        return Vec::new();
    };
    let current = target.position;
    if new_position == current {
        return Vec::new();
    }

    let mut changed = Vec::new();
    for entry in active {
        if entry.email == email {
            continue;
        }
        let p = entry.position;
        let shifted = if new_position > current && p > current && p <= new_position {
            p - 1
        } else if new_position < current && p >= new_position && p < current {
            p + 1
        } else {
            continue;
        };
        let mut moved = entry.clone();
        moved.position = shifted;
        changed.push(moved);
    }

    let mut moved = target.clone();
    moved.position = new_position;
    changed.push(moved);
    changed
}

impl WaitlistEngine {
    /// Move an active entry to an arbitrary position in `[1, N]`.
    ///
    /// Every entry between the old and new position shifts by one slot; the
    /// whole permutation commits as a single batch, so no reader ever
    /// observes a duplicate or missing position.
    pub async fn move_to_position(
        &self,
        email: &str,
        new_position: u64,
    ) -> Result<(), EngineError> {
        let email = normalize_email(email);

        let _timer = LatencyTimer::new("move");
        let result = retry_transient("move", &self.retry, EngineError::is_conflict, || {
            self.try_move(&email, new_position)
        })
        .await;
        record_outcome("move", &result);

        if result.is_ok() {
            info!(email = %email, position = new_position, "moved waitlist entry");
        }
        result
    }

    async fn try_move(&self, email: &str, new_position: u64) -> Result<(), EngineError> {
        let version = self.store.version().await?;
        let active = self.store.list_active().await?;
        let count = active.len() as u64;

        if !active.iter().any(|e| e.email == email) {
            return Err(EngineError::NotFound(format!(
                "no active waitlist entry for '{email}'"
            )));
        }
        if new_position < 1 || new_position > count {
            return Err(EngineError::InvalidArgument(format!(
                "target position {new_position} outside [1, {count}]"
            )));
        }

        let updates = plan_move(&active, email, new_position);
        if updates.is_empty() {
            return Ok(());
        }

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
