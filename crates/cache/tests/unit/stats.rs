//! Statistics unit tests.
//!
//! Verifies default initialization, per-set aggregation, and the text
//! reports of the policy and cache counters.

use arcsim_core::{CacheStats, PolicyStats};
use pretty_assertions::assert_eq;

use crate::common::harness::PolicyContext;

#[test]
fn default_stats_all_zero() {
    let stats = PolicyStats::default();
    assert_eq!(stats.hits, 0);
    assert_eq!(stats.fills, 0);
    assert_eq!(stats.evictions(), 0);
    assert_eq!(stats.ghost_hits(), 0);
    assert_eq!(CacheStats::default().accesses, 0);
}

#[test]
fn policy_stats_sum_over_sets() {
    let ctx = PolicyContext::new(2, 2);
    let _ = ctx.run(0, &[1, 2, 1]);
    let _ = ctx.run(1, &[1, 2, 3]);

    let set0 = ctx.policy.set_stats(0).unwrap();
    let set1 = ctx.policy.set_stats(1).unwrap();
    assert_eq!(set0.hits, 1);
    assert_eq!(set1.recent_evictions, 1);

    let mut expected = set0;
    expected += set1;
    assert_eq!(ctx.policy.stats(), expected);
    assert_eq!(expected.fills, 5);
    assert_eq!(expected.cold_fills, 5);
}

#[test]
fn policy_report_lists_every_counter() {
    let stats = PolicyStats {
        hits: 7,
        recent_ghost_hits: 2,
        ..PolicyStats::default()
    };
    let report = stats.to_string();
    assert!(report.starts_with("ARC POLICY"));
    assert!(report.contains("arc.hits               7"));
    assert!(report.contains("arc.ghost_hits.b1      2"));
    assert_eq!(report.lines().count(), 10);
}

#[test]
fn cache_report_shows_miss_rate() {
    let stats = CacheStats {
        accesses: 4,
        hits: 1,
        misses: 3,
        writebacks: 2,
    };
    let report = stats.to_string();
    assert!(report.contains("miss_rate: 75.00%"));
    assert!(report.contains("writebacks: 2"));
}
