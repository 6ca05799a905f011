//! Referral code generation.
//!
//! Codes are fixed-length draws from a 32-character alphabet chosen to avoid
//! lookalike glyphs (no `I`, `O`, `0`, `1`). At the default length of 8 the
//! code space holds ~1.1e12 values, so collisions are vanishingly rare; the
//! generator still verifies every candidate against the store and regenerates
//! on a hit, up to a bounded number of attempts.

use rand::Rng;
use tracing::debug;

use super::{EngineError, WaitlistEngine};

/// Uppercase letters and digits minus the lookalikes.
pub(crate) const CODE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

/// Draw a random candidate code of the given length.
pub(crate) fn random_code(length: usize) -> String {
    let mut rng = rand::rng();
    (0..length)
        .map(|_| CODE_ALPHABET[rng.random_range(0..CODE_ALPHABET.len())] as char)
        .collect()
}

impl WaitlistEngine {
    /// Mint a referral code that no entry, active or removed, has ever used.
    ///
    /// Each candidate is checked against the store; the surrounding commit's
    /// version check closes the race left between check and use. Exhausting
    /// the attempt budget means the code space is effectively saturated and
    /// surfaces as an availability error rather than looping forever.
    pub(crate) async fn generate_code(&self) -> Result<String, EngineError> {
        for _ in 0..self.config.code_max_attempts {
            let candidate = random_code(self.config.code_length);
            if !self.store.code_exists(&candidate).await? {
                return Ok(candidate);
            }
            crate::metrics::record_code_collision();
            debug!(code = %candidate, "referral code collision, regenerating");
        }
        Err(EngineError::Unavailable(format!(
            "could not mint an unused referral code in {} attempts",
            self.config.code_max_attempts
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WaitlistConfig;
    use crate::entry::WaitlistEntry;
    use crate::storage::memory::MemoryRankStore;
    use crate::storage::traits::{RankStore, WriteBatch};
    use std::sync::Arc;

    #[test]
    fn test_random_code_length_and_alphabet() {
        for length in [1, 8, 16] {
            let code = random_code(length);
            assert_eq!(code.len(), length);
            assert!(code.bytes().all(|b| CODE_ALPHABET.contains(&b)));
        }
    }

    #[test]
    fn test_random_codes_vary() {
        // 32^8 values; two equal draws in a row means the RNG is broken.
        assert_ne!(random_code(8), random_code(8));
    }

    #[tokio::test]
    async fn test_generate_code_uses_configured_length() {
        let store = Arc::new(MemoryRankStore::new());
        let engine = WaitlistEngine::new(store, WaitlistConfig::default());

        let code = engine.generate_code().await.unwrap();
        assert_eq!(code.len(), 8);
        assert!(code.bytes().all(|b| CODE_ALPHABET.contains(&b)));
    }

    #[tokio::test]
    async fn test_generate_code_exhaustion_is_unavailable() {
        // Length-1 codes and every alphabet character taken: generation can
        // never succeed and must give up instead of spinning.
        let store = Arc::new(MemoryRankStore::new());
        let taken: Vec<WaitlistEntry> = CODE_ALPHABET
            .iter()
            .enumerate()
            .map(|(i, b)| {
                WaitlistEntry::new(
                    format!("user{}@example.com", i),
                    i as u64 + 1,
                    (*b as char).to_string(),
                )
            })
            .collect();
        store
            .apply(WriteBatch {
                read_version: 0,
                inserts: taken,
                ..Default::default()
            })
            .await
            .unwrap();

        let config = WaitlistConfig {
            code_length: 1,
            code_max_attempts: 10,
            ..Default::default()
        };
        let engine = WaitlistEngine::new(store, config);

        let err = engine.generate_code().await.unwrap_err();
        assert!(matches!(err, EngineError::Unavailable(_)));
    }
}
