//! Property-based tests for the waitlist ranking invariants.
//!
//! Uses proptest to generate random operation sequences and verify the
//! engine never produces a gapped or duplicated ranking, only clean errors.
//!
//! Run with: `cargo test --test proptest_fuzz`

use std::future::Future;
use std::sync::Arc;

use proptest::prelude::*;

use waitlist_engine::{
    MemoryRankStore, RankStore, ReferralEvent, WaitlistConfig, WaitlistEngine, WaitlistEntry,
};

// =============================================================================
// Helpers
// =============================================================================

fn run<F: Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .expect("runtime builds")
        .block_on(future)
}

fn engine() -> (Arc<WaitlistEngine>, Arc<MemoryRankStore>) {
    let store = Arc::new(MemoryRankStore::new());
    let engine = WaitlistEngine::new(store.clone(), WaitlistConfig::default());
    (Arc::new(engine), store)
}

async fn active_positions(store: &MemoryRankStore) -> Vec<u64> {
    store
        .list_active()
        .await
        .unwrap()
        .iter()
        .map(|e| e.position)
        .collect()
}

/// `sorted(active positions) == [1..N]`
async fn assert_dense(store: &MemoryRankStore, context: &str) {
    let mut positions = active_positions(store).await;
    let n = positions.len() as u64;
    positions.sort_unstable();
    assert_eq!(
        positions,
        (1..=n).collect::<Vec<u64>>(),
        "ranking must stay dense after {context}"
    );
}

/// One step of a random operation script.
#[derive(Debug, Clone)]
enum Op {
    Join,
    Move { pick: usize, target: usize },
    Remove { pick: usize },
    ReferredJoin { pick: usize },
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => Just(Op::Join),
        2 => (any::<usize>(), any::<usize>()).prop_map(|(pick, target)| Op::Move { pick, target }),
        1 => any::<usize>().prop_map(|pick| Op::Remove { pick }),
        2 => any::<usize>().prop_map(|pick| Op::ReferredJoin { pick }),
    ]
}

// =============================================================================
// Permutation Invariant Under Random Operation Sequences
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Any sequence of join / move / remove / referred-join calls leaves the
    /// active positions a dense permutation of 1..N.
    #[test]
    fn prop_ranking_stays_dense_under_random_ops(ops in prop::collection::vec(op_strategy(), 1..20)) {
        run(async {
            let (engine, store) = engine();
            let mut next_id = 0u64;

            for op in &ops {
                let active = store.list_active().await.unwrap();
                match op {
                    Op::Join => {
                        next_id += 1;
                        engine
                            .join(&format!("user{}@example.com", next_id))
                            .await
                            .unwrap();
                    }
                    Op::Move { pick, target } if !active.is_empty() => {
                        let email = active[pick % active.len()].email.clone();
                        let target = (target % active.len()) as u64 + 1;
                        engine.move_to_position(&email, target).await.unwrap();
                    }
                    Op::Remove { pick } if !active.is_empty() => {
                        let email = active[pick % active.len()].email.clone();
                        engine.remove(&email).await.unwrap();
                    }
                    Op::ReferredJoin { pick } if !active.is_empty() => {
                        next_id += 1;
                        let code = active[pick % active.len()].referral_code.clone();
                        engine
                            .join_with_referral(&format!("user{}@example.com", next_id), &code)
                            .await
                            .unwrap();
                    }
                    // Nothing on the list yet: the op degenerates to a no-op
                    _ => {}
                }
                assert_dense(&store, &format!("{:?}", op)).await;
            }
        });
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// The mover lands exactly on its target and preserves the relative
    /// order of everyone else.
    #[test]
    fn prop_move_lands_exactly_and_keeps_relative_order(
        n in 1usize..12,
        from in any::<usize>(),
        to in any::<usize>(),
    ) {
        run(async {
            let (engine, store) = engine();
            for i in 1..=n {
                engine.join(&format!("user{}@example.com", i)).await.unwrap();
            }
            let from = from % n + 1;
            let to = (to % n) as u64 + 1;
            let mover = format!("user{}@example.com", from);

            let before: Vec<String> = store
                .list_active()
                .await
                .unwrap()
                .into_iter()
                .map(|e| e.email)
                .filter(|e| *e != mover)
                .collect();

            engine.move_to_position(&mover, to).await.unwrap();

            assert_eq!(engine.position_of(&mover).await.unwrap(), to);
            assert_dense(&store, "move").await;

            let after: Vec<String> = store
                .list_active()
                .await
                .unwrap()
                .into_iter()
                .map(|e| e.email)
                .filter(|e| *e != mover)
                .collect();
            assert_eq!(before, after, "bystanders must keep their relative order");
        });
    }

    /// Every credited referral logs the nominal boost; totals add up.
    #[test]
    fn prop_positions_gained_counts_nominal_boosts(referrals in 1usize..6) {
        run(async {
            let (engine, store) = engine();
            let receipt = engine.join("referrer@example.com").await.unwrap();
            // Push the referrer off the front so some boosts clamp and some don't
            for i in 1..=8 {
                engine.join(&format!("filler{}@example.com", i)).await.unwrap();
            }
            engine.move_to_position("referrer@example.com", 9).await.unwrap();

            for i in 0..referrals {
                let outcome = engine
                    .join_with_referral(
                        &format!("referred{}@example.com", i),
                        &receipt.referral_code,
                    )
                    .await
                    .unwrap();
                assert!(outcome.referral.credited);
            }

            let stats = engine.referral_stats("referrer@example.com").await.unwrap();
            assert_eq!(stats.total_referrals, referrals as u64);
            assert_eq!(stats.positions_gained, 5 * referrals as u64);
            assert_eq!(stats.history.len(), referrals);
            assert_dense(&store, "referral chain").await;
        });
    }

    /// Stats reflect the dense ranking: total and midpoint median.
    #[test]
    fn prop_stats_median_is_midpoint(n in 0usize..25) {
        run(async {
            let (engine, _store) = engine();
            for i in 1..=n {
                engine.join(&format!("user{}@example.com", i)).await.unwrap();
            }

            let stats = engine.stats().await.unwrap();
            assert_eq!(stats.total, n as u64);
            assert_eq!(stats.median_position, (n as u64).div_ceil(2));
            if n == 0 {
                assert_eq!(stats.average_wait_days, 0.0);
            } else {
                assert!(stats.average_wait_days >= 0.0);
            }
        });
    }
}

// =============================================================================
// Serialization Fuzz
// =============================================================================

proptest! {
    /// Entry deserialization never panics on arbitrary bytes.
    #[test]
    fn fuzz_entry_from_random_bytes(bytes in prop::collection::vec(any::<u8>(), 0..2000)) {
        let result: Result<WaitlistEntry, _> = serde_json::from_slice(&bytes);
        // We don't care if it fails, just that it doesn't panic
        let _ = result;
    }

    /// Event deserialization never panics on arbitrary bytes.
    #[test]
    fn fuzz_event_from_random_bytes(bytes in prop::collection::vec(any::<u8>(), 0..2000)) {
        let result: Result<ReferralEvent, _> = serde_json::from_slice(&bytes);
        let _ = result;
    }

    /// Entry serialization roundtrip preserves every field.
    #[test]
    fn prop_entry_roundtrip(
        email in "[a-z]{1,12}@[a-z]{1,8}\\.com",
        position in 1u64..100_000,
        code in "[A-HJ-NP-Z2-9]{8}",
        referred in proptest::option::of("[a-z]{1,12}@[a-z]{1,8}\\.com"),
    ) {
        let mut entry = WaitlistEntry::new(email, position, code);
        entry.referred_by = referred;

        let json = serde_json::to_vec(&entry).unwrap();
        let back: WaitlistEntry = serde_json::from_slice(&json).unwrap();
        prop_assert_eq!(back, entry);
    }
}
