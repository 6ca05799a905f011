//! Position allocation: joining the waitlist.

use tracing::info;

use super::types::{JoinReceipt, ReferralJoinReceipt};
use super::{normalize_email, record_outcome, EngineError, WaitlistEngine};
use crate::entry::WaitlistEntry;
use crate::metrics::LatencyTimer;
use crate::resilience::retry::retry_transient;
use crate::storage::traits::WriteBatch;

impl WaitlistEngine {
    /// Add an email to the tail of the waitlist.
    ///
    /// The tail position read is advisory; the commit's version check
    /// guarantees two concurrent joins never land on the same slot. An email
    /// that already has an entry, active or removed, is rejected.
    pub async fn join(&self, email: &str) -> Result<JoinReceipt, EngineError> {
        let email = normalize_email(email);
        if email.is_empty() || !email.contains('@') {
            return Err(EngineError::InvalidArgument(format!(
                "'{email}' is not an email address"
            )));
        }

        let _timer = LatencyTimer::new("join");
        let result = retry_transient("join", &self.retry, EngineError::is_conflict, || {
            self.try_join(&email)
        })
        .await;
        record_outcome("join", &result);

        if let Ok(receipt) = &result {
            info!(email = %email, position = receipt.position, "joined waitlist");
        }
        result
    }

    async fn try_join(&self, email: &str) -> Result<JoinReceipt, EngineError> {
        let version = self.store.version().await?;

        if self.store.get_entry(email).await?.is_some() {
            return Err(EngineError::InvalidArgument(format!(
                "'{email}' is already on the waitlist"
            )));
        }

        let referral_code = self.generate_code().await?;
        let position = self.store.count_active().await? + 1;
        let entry = WaitlistEntry::new(email, position, referral_code.clone());

        self.store
            .apply(WriteBatch {
                read_version: version,
                inserts: vec![entry],
                ..Default::default()
            })
            .await?;

        crate::metrics::set_active_entries(position);
        Ok(JoinReceipt {
            position,
            referral_code,
        })
    }

    /// Join and claim a referral code in one call.
    ///
    /// The join and the referral credit are two separate atomic units: a bad
    /// code still leaves the entrant on the list, reported through
    /// [`ReferralJoinReceipt::referral`].
    pub async fn join_with_referral(
        &self,
        email: &str,
        referral_code: &str,
    ) -> Result<ReferralJoinReceipt, EngineError> {
        let receipt = self.join(email).await?;
        let referral = self.process_referral(email, referral_code).await?;
        Ok(ReferralJoinReceipt {
            position: receipt.position,
            referral_code: receipt.referral_code,
            referral,
        })
    }
}
