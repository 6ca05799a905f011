//! Public result types for the waitlist engine.

use crate::entry::ReferralEvent;

/// What a new entrant gets back from a successful join.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinReceipt {
    /// Tail position assigned at join time.
    pub position: u64,
    /// The entrant's own referral code, to hand out to others.
    pub referral_code: String,
}

/// Join receipt plus the outcome of the accompanying referral claim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferralJoinReceipt {
    pub position: u64,
    pub referral_code: String,
    /// Whether (and whom) the presented code credited.
    pub referral: ReferralOutcome,
}

/// Outcome of processing a referral code.
///
/// An unknown, expired, or self-owned code is a normal negative outcome,
/// not an error: the entrant still joined, nobody got credited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferralOutcome {
    /// Whether the referrer's position boost was applied.
    pub credited: bool,
    /// The referrer that was credited, when `credited` is true.
    pub referrer_email: Option<String>,
}

impl ReferralOutcome {
    #[must_use]
    pub fn credited(referrer_email: impl Into<String>) -> Self {
        Self {
            credited: true,
            referrer_email: Some(referrer_email.into()),
        }
    }

    #[must_use]
    pub fn not_credited() -> Self {
        Self {
            credited: false,
            referrer_email: None,
        }
    }
}

impl std::fmt::Display for ReferralOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.referrer_email {
            Some(email) if self.credited => write!(f, "credited({})", email),
            _ => write!(f, "not-credited"),
        }
    }
}

/// Summary metrics over the active entry set.
#[derive(Debug, Clone, PartialEq)]
pub struct StatsSummary {
    /// Count of active entries.
    pub total: u64,
    /// Mean wait since join across active entries, in days.
    pub average_wait_days: f64,
    /// Midpoint of the dense `1..N` ranking: `ceil(total / 2)`.
    pub median_position: u64,
}

impl StatsSummary {
    /// The all-zero summary for an empty waitlist.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            total: 0,
            average_wait_days: 0.0,
            median_position: 0,
        }
    }
}

/// Referral performance of one entry, derived from entries plus event log.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferralStats {
    /// Entrants this entry referred, any status.
    pub total_referrals: u64,
    /// Referred entrants still active on the waitlist.
    pub active_referrals: u64,
    /// Sum of the nominal boosts credited to this entry.
    pub positions_gained: u64,
    /// The credited referral events, oldest first.
    pub history: Vec<ReferralEvent>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_referral_outcome_constructors() {
        let credited = ReferralOutcome::credited("grace@example.com");
        assert!(credited.credited);
        assert_eq!(credited.referrer_email.as_deref(), Some("grace@example.com"));

        let skipped = ReferralOutcome::not_credited();
        assert!(!skipped.credited);
        assert!(skipped.referrer_email.is_none());
    }

    #[test]
    fn test_referral_outcome_display() {
        assert_eq!(
            format!("{}", ReferralOutcome::credited("grace@example.com")),
            "credited(grace@example.com)"
        );
        assert_eq!(format!("{}", ReferralOutcome::not_credited()), "not-credited");
    }

    #[test]
    fn test_empty_stats() {
        let stats = StatsSummary::empty();
        assert_eq!(stats.total, 0);
        assert_eq!(stats.average_wait_days, 0.0);
        assert_eq!(stats.median_position, 0);
    }
}
