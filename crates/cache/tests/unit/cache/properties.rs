//! Property tests: random operation sequences against `ArcPolicy` and
//! `CacheSim`, checking the per-set invariants after every step.

use arcsim_core::{
    ArcPolicy, CacheConfig, CacheSim, LineId, ListKind, PolicyError, ReplacementPolicy,
};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Operation {
    Access { set: usize, tag: u64 },
    Touch(usize),
    Invalidate(usize),
    PickVictim(usize),
}

fn operation_strategy() -> impl Strategy<Value = Operation> {
    prop_oneof![
        4 => (0usize..4, 0u64..12).prop_map(|(set, tag)| Operation::Access { set, tag }),
        1 => (0usize..64).prop_map(Operation::Touch),
        1 => (0usize..64).prop_map(Operation::Invalidate),
        1 => (0usize..4).prop_map(Operation::PickVictim),
    ]
}

fn resident_lines(policy: &ArcPolicy, set: usize) -> Vec<(LineId, u64)> {
    let snap = policy.snapshot(set).unwrap();
    snap.recent.into_iter().chain(snap.frequent).collect()
}

/// Controller-style access over a shared pool of line handles.
fn access(policy: &ArcPolicy, lines: &[LineId], set: usize, tag: u64) -> Result<bool, PolicyError> {
    let resident = resident_lines(policy, set);
    if let Some(&(line, _)) = resident.iter().find(|&&(_, t)| t == tag) {
        policy.touch(line)?;
        return Ok(true);
    }

    let free = lines
        .iter()
        .copied()
        .find(|&l| policy.line_state(l).is_ok_and(|s| s.list == ListKind::Invalid));
    let line = match free {
        Some(line) => line,
        None => {
            let candidates: Vec<LineId> = resident.iter().map(|&(l, _)| l).collect();
            // Every handle is busy elsewhere: steal one, which detaches it.
            policy.pick_victim(set, &candidates)?.unwrap_or(lines[0])
        }
    };
    let _ = policy.fill(line, set, tag)?;
    Ok(false)
}

/// Every broken invariant across all sets and line handles.
fn problems(policy: &ArcPolicy, lines: &[LineId]) -> Vec<String> {
    let mut out = Vec::new();
    let mut resident_total = 0;
    for set in 0..policy.sets() {
        let snap = policy.snapshot(set).unwrap();
        resident_total += snap.resident_len();
        out.extend(
            snap.violations(policy.ways())
                .into_iter()
                .map(|v| format!("set {set}: {v}")),
        );
    }

    let mut bound = 0;
    for &line in lines {
        let state = policy.line_state(line).unwrap();
        let Some(set) = state.set else {
            if state.list != ListKind::Invalid || state.tag.is_some() {
                out.push(format!("line {line} half bound: {state:?}"));
            }
            continue;
        };
        bound += 1;
        let snap = policy.snapshot(set).unwrap();
        let list = match state.list {
            ListKind::Recent => &snap.recent,
            ListKind::Frequent => &snap.frequent,
            ListKind::Invalid => {
                out.push(format!("line {line} bound to set {set} but invalid"));
                continue;
            }
        };
        if state.tag.is_none_or(|tag| !list.contains(&(line, tag))) {
            out.push(format!("line {line} missing from its list: {state:?}"));
        }
    }
    if bound != resident_total {
        out.push(format!("{bound} bound lines but {resident_total} resident"));
    }
    out
}

proptest! {
    /// Arbitrary operation sequences maintain all invariants.
    #[test]
    fn prop_arbitrary_ops_maintain_invariants(
        sets in 1usize..4,
        ways in 1usize..6,
        ops in prop::collection::vec(operation_strategy(), 0..200)
    ) {
        let policy = ArcPolicy::new(sets, ways).unwrap();
        let lines: Vec<LineId> = (0..sets * ways)
            .map(|_| policy.create_metadata().unwrap())
            .collect();

        for op in ops {
            match op {
                Operation::Access { set, tag } => {
                    let set = set % sets;
                    let _ = access(&policy, &lines, set, tag).unwrap();
                    let now = resident_lines(&policy, set);
                    prop_assert!(now.iter().any(|&(_, t)| t == tag));
                }
                Operation::Touch(i) => {
                    let line = lines[i % lines.len()];
                    match policy.touch(line) {
                        Ok(()) => {
                            prop_assert_eq!(policy.line_state(line).unwrap().list, ListKind::Frequent);
                        }
                        Err(err) => {
                            prop_assert_eq!(err, PolicyError::UnboundLine(line));
                        }
                    }
                }
                Operation::Invalidate(i) => {
                    let line = lines[i % lines.len()];
                    policy.invalidate(line).unwrap();
                    prop_assert_eq!(policy.line_state(line).unwrap().list, ListKind::Invalid);
                }
                Operation::PickVictim(set) => {
                    let set = set % sets;
                    let before = policy.snapshot(set).unwrap().resident_len();
                    let victim = policy.pick_victim(set, &lines).unwrap();
                    let after = policy.snapshot(set).unwrap().resident_len();
                    prop_assert_eq!(victim.is_some(), before > 0);
                    prop_assert_eq!(after + usize::from(victim.is_some()), before);
                }
            }
            let found = problems(&policy, &lines);
            prop_assert!(found.is_empty(), "{:?}", found);
        }
    }

    /// A tag is never both resident and remembered as a ghost, and each
    /// ghost ledger stays within the associativity.
    #[test]
    fn prop_single_set_stream_respects_bounds(
        ways in 1usize..9,
        tags in prop::collection::vec(0u64..24, 0..300)
    ) {
        let policy = ArcPolicy::new(1, ways).unwrap();
        let lines: Vec<LineId> = (0..ways)
            .map(|_| policy.create_metadata().unwrap())
            .collect();

        let mut hits = 0u64;
        for tag in tags.iter().copied() {
            if access(&policy, &lines, 0, tag).unwrap() {
                hits += 1;
            }
            let snap = policy.snapshot(0).unwrap();
            prop_assert!(snap.recent_ghost.len() <= ways);
            prop_assert!(snap.frequent_ghost.len() <= ways);
            prop_assert!(snap.target <= snap.resident_len());
            prop_assert!(snap.violations(ways).is_empty());
        }

        let stats = policy.stats();
        prop_assert_eq!(stats.hits, hits);
        prop_assert_eq!(stats.fills + stats.hits, tags.len() as u64);
        prop_assert_eq!(stats.fills, stats.cold_fills + stats.ghost_hits());
    }

    /// The cache model and the policy always agree on what is resident.
    #[test]
    fn prop_cache_sim_agrees_with_policy(
        accesses in prop::collection::vec((0u64..4096, any::<bool>()), 0..300)
    ) {
        let mut cache = CacheSim::new(&CacheConfig {
            enabled: true,
            size_bytes: 512,
            line_bytes: 64,
            ways: 2,
            latency: 1,
        })
        .unwrap();

        for (addr, write) in accesses {
            let (hit, penalty) = cache.access(addr, write, 10).unwrap();
            prop_assert!(cache.contains(addr));
            if hit {
                prop_assert_eq!(penalty, 0);
            }
            let (set, tag) = cache.locate(addr);
            let snap = cache.policy().snapshot(set).unwrap();
            prop_assert!(snap.recent_tags().contains(&tag) || snap.frequent_tags().contains(&tag));
            prop_assert!(snap.violations(2).is_empty());
        }

        let stats = cache.stats();
        prop_assert_eq!(stats.hits + stats.misses, stats.accesses);
    }
}
