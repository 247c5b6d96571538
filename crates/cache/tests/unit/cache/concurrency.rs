//! Multi-threaded access to one policy.
//!
//! Sets are guarded independently, so threads working on different sets must
//! produce exactly the state a sequential run would, and threads sharing a
//! set must never observe a half-applied operation.

use std::thread;

use arcsim_core::{ReplacementPolicy, SetSnapshot};
use pretty_assertions::assert_eq;

use crate::common::harness::PolicyContext;

const SETS: usize = 8;
const WAYS: usize = 4;

fn workload(set: usize) -> Vec<u64> {
    (0..2_000u64)
        .map(|i| {
            let span = if i % 2 == 0 { 6 } else { 23 };
            (i * 7 + set as u64) % span
        })
        .collect()
}

#[test]
fn disjoint_sets_match_sequential_run() {
    let shared = PolicyContext::new(SETS, WAYS);
    thread::scope(|s| {
        for set in 0..SETS {
            let ctx = &shared;
            let _ = s.spawn(move || ctx.run(set, &workload(set)));
        }
    });

    let sequential = PolicyContext::new(SETS, WAYS);
    for set in 0..SETS {
        let _ = sequential.run(set, &workload(set));
    }

    shared.assert_consistent();
    for set in 0..SETS {
        assert_eq!(shared.snapshot(set), sequential.snapshot(set));
        assert_eq!(
            shared.policy.set_stats(set).unwrap(),
            sequential.policy.set_stats(set).unwrap()
        );
    }
}

#[test]
fn shared_set_applies_each_operation_whole() {
    const ITERS: u64 = 1_000;
    let ctx = PolicyContext::new(1, WAYS);

    thread::scope(|s| {
        for (t, &line) in ctx.lines.iter().enumerate() {
            let policy = &ctx.policy;
            let _ = s.spawn(move || {
                for i in 0..ITERS {
                    let tag = ((t as u64) << 32) | i;
                    assert_eq!(policy.fill(line, 0, tag).unwrap(), None);
                    policy.touch(line).unwrap();
                    policy.invalidate(line).unwrap();
                }
            });
        }
    });

    ctx.assert_consistent();
    let stats = ctx.policy.set_stats(0).unwrap();
    let total = WAYS as u64 * ITERS;
    assert_eq!(stats.fills, total);
    assert_eq!(stats.hits, total);
    assert_eq!(stats.promotions, total);
    assert_eq!(stats.invalidations, total);
    assert_eq!(stats.evictions(), 0);
    assert_eq!(ctx.snapshot(0), SetSnapshot::default());
}
