//! Configuration for the waitlist engine.
//!
//! # Example
//!
//! ```
//! use waitlist_engine::WaitlistConfig;
//!
//! // Minimal config (uses defaults)
//! let config = WaitlistConfig::default();
//! assert_eq!(config.referral_boost, 5);
//! assert_eq!(config.code_length, 8);
//!
//! // Full config
//! let config = WaitlistConfig {
//!     referral_boost: 10,
//!     conflict_max_retries: 32,
//!     ..Default::default()
//! };
//! ```

use serde::Deserialize;

/// Configuration for the waitlist engine.
///
/// All fields have sensible defaults; the zero-config engine behaves as the
/// product ships it (5-position referral boost, 8-character codes).
#[derive(Debug, Clone, Deserialize)]
pub struct WaitlistConfig {
    /// Positions a referrer is promoted per credited referral (default: 5)
    #[serde(default = "default_referral_boost")]
    pub referral_boost: u64,

    /// Referral code length in characters (default: 8)
    #[serde(default = "default_code_length")]
    pub code_length: usize,

    /// Attempts to mint an unused referral code before giving up (default: 16)
    #[serde(default = "default_code_max_attempts")]
    pub code_max_attempts: usize,

    /// Attempts per logical operation when commits keep losing races
    /// (default: 8)
    #[serde(default = "default_conflict_max_retries")]
    pub conflict_max_retries: usize,

    /// First backoff delay after a lost race, in milliseconds (default: 10)
    #[serde(default = "default_conflict_initial_delay_ms")]
    pub conflict_initial_delay_ms: u64,

    /// Backoff delay ceiling, in milliseconds (default: 500)
    #[serde(default = "default_conflict_max_delay_ms")]
    pub conflict_max_delay_ms: u64,
}

fn default_referral_boost() -> u64 {
    5
}
fn default_code_length() -> usize {
    8
}
fn default_code_max_attempts() -> usize {
    16
}
fn default_conflict_max_retries() -> usize {
    8
}
fn default_conflict_initial_delay_ms() -> u64 {
    10
}
fn default_conflict_max_delay_ms() -> u64 {
    500
}

impl Default for WaitlistConfig {
    fn default() -> Self {
        Self {
            referral_boost: default_referral_boost(),
            code_length: default_code_length(),
            code_max_attempts: default_code_max_attempts(),
            conflict_max_retries: default_conflict_max_retries(),
            conflict_initial_delay_ms: default_conflict_initial_delay_ms(),
            conflict_max_delay_ms: default_conflict_max_delay_ms(),
        }
    }
}
