// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Basic waitlist-engine usage example.
//!
//! Demonstrates:
//! 1. Creating an engine over the in-memory rank store
//! 2. Joining a handful of users
//! 3. A referred join crediting the referrer with a position boost
//! 4. Moving and removing entries (dense ranking maintained)
//! 5. Reading stats and referral stats
//! 6. Displaying metrics (OTEL-compatible)
//!
//! # Run
//!
//! ```bash
//! cargo run --example basic_usage
//! ```

use std::sync::Arc;

use metrics_util::debugging::{DebugValue, DebuggingRecorder, Snapshotter};
use waitlist_engine::{MemoryRankStore, RankStore, WaitlistConfig, WaitlistEngine};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Install metrics recorder (captures all metrics for OTEL export)
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();
    recorder.install().expect("failed to install metrics recorder");

    // Simple logging (no filter for simplicity)
    tracing_subscriber::fmt()
        .with_target(false)
        .compact()
        .init();

    println!("\n╔═══════════════════════════════════════════════════════════════╗");
    println!("║          waitlist-engine: Basic Usage Example                 ║");
    println!("╚═══════════════════════════════════════════════════════════════╝\n");

    // ─────────────────────────────────────────────────────────────────────────
    // 1. Create the engine
    // ─────────────────────────────────────────────────────────────────────────
    println!("📦 Creating engine over the in-memory rank store...");
    let store = Arc::new(MemoryRankStore::new());
    let engine = WaitlistEngine::new(store.clone(), WaitlistConfig::default());
    println!("   ✅ referral boost: {} positions", engine.config().referral_boost);

    // ─────────────────────────────────────────────────────────────────────────
    // 2. Join five users
    // ─────────────────────────────────────────────────────────────────────────
    println!("\n📝 Joining 5 users...");
    let users = ["alice", "bob", "carol", "dave", "erin"];
    let mut codes = Vec::new();
    for name in &users {
        let receipt = engine.join(&format!("{name}@example.com")).await?;
        println!(
            "   └─ {name} → position {} (code {})",
            receipt.position, receipt.referral_code
        );
        codes.push(receipt.referral_code);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // 3. A referred join boosts the referrer
    // ─────────────────────────────────────────────────────────────────────────
    println!("\n🎟  frank joins with erin's referral code...");
    let receipt = engine
        .join_with_referral("frank@example.com", &codes[4])
        .await?;
    println!("   └─ frank lands at position {}", receipt.position);
    println!("   └─ referral: {}", receipt.referral);
    println!(
        "   └─ erin is now at position {} (was 5, boosted by 5, clamped at 1)",
        engine.position_of("erin@example.com").await?
    );

    // ─────────────────────────────────────────────────────────────────────────
    // 4. Move and remove (ranking stays dense)
    // ─────────────────────────────────────────────────────────────────────────
    println!("\n🔀 Moving dave to position 2, removing bob...");
    engine.move_to_position("dave@example.com", 2).await?;
    engine.remove("bob@example.com").await?;

    println!("   Current line:");
    for entry in store.list_active().await? {
        println!("   └─ {}. {}", entry.position, entry.email);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // 5. Stats
    // ─────────────────────────────────────────────────────────────────────────
    println!("\n📊 Stats:");
    let stats = engine.stats().await?;
    println!("   ├─ total active:    {}", stats.total);
    println!("   ├─ median position: {}", stats.median_position);
    println!("   └─ avg wait (days): {:.6}", stats.average_wait_days);

    let referral = engine.referral_stats("erin@example.com").await?;
    println!("\n🏅 erin's referral stats:");
    println!("   ├─ total referrals:  {}", referral.total_referrals);
    println!("   ├─ active referrals: {}", referral.active_referrals);
    println!("   └─ positions gained: {}", referral.positions_gained);

    // ─────────────────────────────────────────────────────────────────────────
    // 6. Dump raw metrics (OTEL-compatible)
    // ─────────────────────────────────────────────────────────────────────────
    println!("\n📈 Raw Metrics (OTEL export format):");
    dump_metrics(&snapshotter);

    println!("\n╔═══════════════════════════════════════════════════════════════╗");
    println!("║                    Example complete!                          ║");
    println!("╚═══════════════════════════════════════════════════════════════╝\n");

    Ok(())
}

/// Dump all captured metrics in OTEL-compatible format
fn dump_metrics(snapshotter: &Snapshotter) {
    let snapshot = snapshotter.snapshot();

    let mut counters: Vec<_> = vec![];
    let mut gauges: Vec<_> = vec![];
    let mut histograms: Vec<_> = vec![];

    for (composite_key, _, _, value) in snapshot.into_vec() {
        let (_kind, key) = composite_key.into_parts();
        let name = key.name();
        let labels: Vec<_> = key
            .labels()
            .map(|l| format!("{}={}", l.key(), l.value()))
            .collect();
        let label_str = if labels.is_empty() {
            String::new()
        } else {
            format!("{{{}}}", labels.join(","))
        };

        match value {
            DebugValue::Counter(v) => counters.push((name.to_string(), label_str, v)),
            DebugValue::Gauge(v) => gauges.push((name.to_string(), label_str, v.into_inner())),
            DebugValue::Histogram(samples) => {
                let count = samples.len();
                let sum: f64 = samples.iter().map(|v| v.into_inner()).sum();
                histograms.push((name.to_string(), label_str, count, sum));
            }
        }
    }

    counters.sort_by(|a, b| a.0.cmp(&b.0));
    gauges.sort_by(|a, b| a.0.cmp(&b.0));
    histograms.sort_by(|a, b| a.0.cmp(&b.0));

    if !counters.is_empty() {
        println!("   ┌─ Counters (cumulative)");
        for (name, labels, value) in &counters {
            println!("   │  └─ {}{} = {}", name, labels, value);
        }
    }

    if !gauges.is_empty() {
        println!("   ├─ Gauges (current value)");
        for (name, labels, value) in &gauges {
            println!("   │  └─ {}{} = {:.2}", name, labels, value);
        }
    }

    if !histograms.is_empty() {
        println!("   └─ Histograms (distributions)");
        for (name, labels, count, sum) in &histograms {
            println!("   │  └─ {}{} count={} sum={:.6}s", name, labels, count, sum);
        }
    }

    if counters.is_empty() && gauges.is_empty() && histograms.is_empty() {
        println!("   └─ (no metrics recorded)");
    }
}
