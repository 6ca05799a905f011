// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Referral processing: credit a referrer with a bounded promotion.

use tracing::{debug, info};

use super::mover::plan_move;
use super::types::ReferralOutcome;
use super::{normalize_email, record_outcome, EngineError, WaitlistEngine};
use crate::entry::ReferralEvent;
use crate::metrics::LatencyTimer;
use crate::resilience::retry::retry_transient;
use crate::storage::traits::WriteBatch;

impl WaitlistEngine {
    /// Credit the owner of `referral_code` for referring `new_entrant_email`.
    ///
    /// Negative outcomes (unknown code, self-referral, entrant already
    /// referred, referrer no longer active) are reported as
    /// `ReferralOutcome { credited: false, .. }`, not errors: a stale code is
    /// expected input. On success the entrant link, the referrer's promotion
    /// with every induced shift, and the audit event commit as one batch, so
    /// a failed promotion can never leave a half-linked entrant.
    ///
    /// Each entrant credits each referrer at most once: the entrant's
    /// `referred_by` is set in the same batch and a set link blocks any
    /// further credit.
    pub async fn process_referral(
        &self,
        new_entrant_email: &str,
        referral_code: &str,
    ) -> Result<ReferralOutcome, EngineError> {
        let email = normalize_email(new_entrant_email);
        let code = referral_code.trim().to_ascii_uppercase();

        let _timer = LatencyTimer::new("referral");
        let result = retry_transient("referral", &self.retry, EngineError::is_conflict, || {
            self.try_process_referral(&email, &code)
        })
        .await;
        record_outcome("referral", &result);

        if let Ok(outcome) = &result {
            if outcome.credited {
                crate::metrics::record_referral_credited();
                info!(
                    entrant = %email,
                    referrer = outcome.referrer_email.as_deref().unwrap_or_default(),
                    "referral credited"
                );
            }
        }
        result
    }

    async fn try_process_referral(
        &self,
        email: &str,
        code: &str,
    ) -> Result<ReferralOutcome, EngineError> {
        let version = self.store.version().await?;

        let Some(referrer) = self.store.get_by_referral_code(code).await? else {
            debug!(code = %code, "referral code does not resolve");
            return Ok(ReferralOutcome::not_credited());
        };
        if !referrer.is_active() {
            debug!(referrer = %referrer.email, "referrer left the waitlist");
            return Ok(ReferralOutcome::not_credited());
        }
        if referrer.email == email {
            debug!(entrant = %email, "self-referral rejected");
            return Ok(ReferralOutcome::not_credited());
        }

        let Some(entrant) = self.store.get_entry(email).await? else {
            debug!(entrant = %email, "referred entrant has no waitlist entry");
            return Ok(ReferralOutcome::not_credited());
        };
        if !entrant.is_active() || entrant.referred_by.is_some() {
            debug!(entrant = %email, "entrant already referred or inactive");
            return Ok(ReferralOutcome::not_credited());
        }

        let boost = self.config.referral_boost;
        let target = referrer.position.saturating_sub(boost).max(1);

        let active = self.store.list_active().await?;
        let mut updates = plan_move(&active, &referrer.email, target);

        // The entrant may itself sit inside the shifted range; link the
        // shifted copy instead of clobbering it with a stale position.
        match updates.iter_mut().find(|e| e.email == email) {
            Some(shifted) => shifted.referred_by = Some(referrer.email.clone()),
            None => {
                let mut linked = entrant;
                linked.referred_by = Some(referrer.email.clone());
                updates.push(linked);
            }
        }

        // The event logs the nominal boost distance even when the move was
        // clamped at position 1: the audit trail records what was granted.
        let event = ReferralEvent::referral_bonus(&referrer.email, email, boost);

        self.store
            .apply(WriteBatch {
                read_version: version,
                updates,
                events: vec![event],
                ..Default::default()
            })
            .await?;

        Ok(ReferralOutcome::credited(referrer.email))
    }
}
