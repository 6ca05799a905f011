//! Waitlist entry and referral event data structures.
//!
//! The [`WaitlistEntry`] is the core record the engine ranks. Each entry has a
//! case-normalized email (primary key), a 1-based position that is dense over
//! the active set, and a referral code that stays unique for the lifetime of
//! the store. [`ReferralEvent`] is the append-only audit record written when a
//! referral is credited.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Current wall-clock time as epoch milliseconds.
pub(crate) fn now_millis() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as i64
}

/// Whether an entry participates in the ranking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryStatus {
    /// Holds a position in the dense `1..N` ranking.
    Active,
    /// Left the waitlist; keeps its history but no ranking slot.
    Removed,
}

/// A single waitlist record.
///
/// # Example
///
/// ```
/// use waitlist_engine::{WaitlistEntry, EntryStatus};
///
/// let entry = WaitlistEntry::new("ada@example.com", 1, "QX7M2KPW");
/// assert_eq!(entry.position, 1);
/// assert_eq!(entry.status, EntryStatus::Active);
/// assert!(entry.referred_by.is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaitlistEntry {
    /// Primary key. Trimmed and ASCII-lowercased at the engine boundary,
    /// immutable afterwards.
    pub email: String,
    /// 1-based rank. Unique among active entries; 1 is the front of the line.
    pub position: u64,
    /// Unique forever, across active and removed entries alike.
    pub referral_code: String,
    /// Email of the entry that referred this one. Set at most once.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub referred_by: Option<String>,
    /// Active entries hold positions; removed entries only hold history.
    pub status: EntryStatus,
    /// Creation timestamp (epoch millis), immutable.
    pub joined_at: i64,
}

impl WaitlistEntry {
    /// Create a fresh active entry at the given position.
    pub fn new(email: impl Into<String>, position: u64, referral_code: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            position,
            referral_code: referral_code.into(),
            referred_by: None,
            status: EntryStatus::Active,
            joined_at: now_millis(),
        }
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status == EntryStatus::Active
    }
}

/// What a referral event records, keyed by its `type` tag.
///
/// The payload is a closed variant rather than an open string map so the
/// event log stays type-safe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "metadata", rename_all = "snake_case")]
pub enum ReferralEventKind {
    /// A referrer was credited for bringing in `referred_email`.
    ///
    /// `position_change` records the nominal boost distance the referrer was
    /// credited with, even when the actual move was clamped at position 1.
    /// Audit policy: the log answers "what was granted", not "how far did the
    /// row travel".
    ReferralBonus {
        referred_email: String,
        position_change: u64,
    },
}

/// Append-only audit record for a credited referral.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferralEvent {
    /// Unique event id (UUID v4).
    pub id: String,
    /// The referrer credited.
    pub email: String,
    #[serde(flatten)]
    pub kind: ReferralEventKind,
    /// Creation timestamp (epoch millis).
    pub created_at: i64,
}

impl ReferralEvent {
    /// Build a `referral_bonus` event crediting `referrer_email`.
    pub fn referral_bonus(
        referrer_email: impl Into<String>,
        referred_email: impl Into<String>,
        position_change: u64,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            email: referrer_email.into(),
            kind: ReferralEventKind::ReferralBonus {
                referred_email: referred_email.into(),
                position_change,
            },
            created_at: now_millis(),
        }
    }

    /// The nominal position change this event credited.
    #[must_use]
    pub fn position_change(&self) -> u64 {
        match &self.kind {
            ReferralEventKind::ReferralBonus {
                position_change, ..
            } => *position_change,
        }
    }

    /// The entrant whose join produced this event.
    #[must_use]
    pub fn referred_email(&self) -> &str {
        match &self.kind {
            ReferralEventKind::ReferralBonus { referred_email, .. } => referred_email,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_entry_defaults() {
        let entry = WaitlistEntry::new("ada@example.com", 3, "QX7M2KPW");

        assert_eq!(entry.email, "ada@example.com");
        assert_eq!(entry.position, 3);
        assert_eq!(entry.referral_code, "QX7M2KPW");
        assert!(entry.referred_by.is_none());
        assert!(entry.is_active());
        assert!(entry.joined_at > 0);
    }

    #[test]
    fn test_entry_serialize_skips_none_referred_by() {
        let entry = WaitlistEntry::new("ada@example.com", 1, "QX7M2KPW");
        let json = serde_json::to_string(&entry).unwrap();

        assert!(!json.contains("referred_by"));
        assert!(json.contains("\"status\":\"active\""));
    }

    #[test]
    fn test_entry_roundtrip() {
        let mut entry = WaitlistEntry::new("ada@example.com", 2, "QX7M2KPW");
        entry.referred_by = Some("grace@example.com".to_string());
        entry.status = EntryStatus::Removed;

        let json = serde_json::to_string(&entry).unwrap();
        let back: WaitlistEntry = serde_json::from_str(&json).unwrap();

        assert_eq!(back, entry);
    }

    #[test]
    fn test_referral_event_shape() {
        let event = ReferralEvent::referral_bonus("grace@example.com", "ada@example.com", 5);

        assert_eq!(event.email, "grace@example.com");
        assert_eq!(event.position_change(), 5);
        assert_eq!(event.referred_email(), "ada@example.com");
        assert!(event.created_at > 0);
        assert!(!event.id.is_empty());

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "referral_bonus");
        assert_eq!(json["metadata"]["referred_email"], "ada@example.com");
        assert_eq!(json["metadata"]["position_change"], 5);
    }

    #[test]
    fn test_referral_event_ids_are_unique() {
        let a = ReferralEvent::referral_bonus("g@example.com", "a@example.com", 5);
        let b = ReferralEvent::referral_bonus("g@example.com", "b@example.com", 5);
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_event_roundtrip() {
        let event = ReferralEvent::referral_bonus("grace@example.com", "ada@example.com", 5);
        let json = serde_json::to_string(&event).unwrap();
        let back: ReferralEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);
    }
}
