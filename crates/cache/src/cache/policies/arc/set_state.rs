//! Complete ARC state of one cache set.
//!
//! Ties the resident partition, both ghost ledgers, and the adaptive target
//! together and applies the per-access transitions. Every public operation of
//! [`super::ArcPolicy`] runs exactly one `SetState` method while holding the
//! set's lock, so each access is applied atomically with respect to the set.

use tracing::{debug, trace};

use super::adaptive::AdaptiveTarget;
use super::eviction::Evicted;
use super::ghost::GhostLedger;
use super::partition::{Resident, ResidentPartition, Slot, Tier};
use crate::cache::policies::LineId;
use crate::common::PolicyError;
use crate::stats::PolicyStats;

/// Result of placing a line into a set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FillOutcome {
    /// Slab slot the new line occupies.
    pub slot: Slot,
    /// List the new line was placed in.
    pub tier: Tier,
    /// Line evicted to make room, if the set was full.
    pub evicted: Option<Evicted>,
}

/// Per-set ARC bookkeeping.
#[derive(Debug, Clone)]
pub struct SetState {
    pub(super) index: usize,
    pub(super) partition: ResidentPartition,
    pub(super) recent_ghost: GhostLedger,
    pub(super) frequent_ghost: GhostLedger,
    pub(super) target: AdaptiveTarget,
    pub(super) stats: PolicyStats,
}

impl SetState {
    /// Creates the empty state for set `index` with `ways` lines.
    pub fn new(index: usize, ways: usize) -> Self {
        Self {
            index,
            partition: ResidentPartition::new(ways),
            recent_ghost: GhostLedger::new(ways),
            frequent_ghost: GhostLedger::new(ways),
            target: AdaptiveTarget::default(),
            stats: PolicyStats::default(),
        }
    }

    /// Resolves `line` to its slot, if it is resident at `slot`.
    pub fn resident_at(&self, slot: Slot, line: LineId) -> Option<Resident> {
        self.partition.get(slot).filter(|r| r.line == line)
    }

    /// Checks that `line` may take `tag` in this set.
    ///
    /// # Errors
    ///
    /// [`PolicyError::TagAlreadyResident`] if another line holds `tag`.
    pub fn accepts(&self, line: LineId, tag: u64) -> Result<(), PolicyError> {
        match self.partition.find_tag(tag) {
            Some(slot) if self.resident_at(slot, line).is_none() => {
                Err(PolicyError::TagAlreadyResident {
                    set: self.index,
                    tag,
                })
            }
            _ => Ok(()),
        }
    }

    /// Applies a hit: T1 lines move to T2, T2 lines move to the T2 head.
    ///
    /// Returns the list the line was in before the hit.
    pub fn touch(&mut self, slot: Slot) -> Option<Tier> {
        let before = self.partition.promote(slot)?;
        self.stats.hits += 1;
        if before == Tier::Recent {
            self.stats.promotions += 1;
        }
        trace!(set = self.index, slot, from = ?before, "hit");
        Some(before)
    }

    /// Places new content `tag` through `line`.
    ///
    /// A tag remembered in a ghost ledger is promoted straight to T2 and
    /// adapts `p`; any other tag starts in T1. A full set evicts one line
    /// before the insert, after `p` has been adapted.
    ///
    /// # Errors
    ///
    /// [`PolicyError::TagAlreadyResident`] if `tag` is resident under another
    /// line. The state is unchanged in that case.
    pub fn fill(&mut self, line: LineId, tag: u64) -> Result<FillOutcome, PolicyError> {
        if self.partition.find_tag(tag).is_some() {
            return Err(PolicyError::TagAlreadyResident {
                set: self.index,
                tag,
            });
        }

        let b1 = self.recent_ghost.len();
        let b2 = self.frequent_ghost.len();
        let resident = self.partition.len();
        let tier = if self.recent_ghost.remove(tag) {
            let delta = self.target.on_ghost_hit(true, b1, b2, resident);
            self.stats.recent_ghost_hits += 1;
            debug!(set = self.index, tag, delta, target = self.target.get(), "ghost hit in B1");
            Tier::Frequent
        } else if self.frequent_ghost.remove(tag) {
            let delta = self.target.on_ghost_hit(false, b1, b2, resident);
            self.stats.frequent_ghost_hits += 1;
            debug!(set = self.index, tag, delta, target = self.target.get(), "ghost hit in B2");
            Tier::Frequent
        } else {
            self.stats.cold_fills += 1;
            Tier::Recent
        };

        let evicted = if self.partition.is_full() {
            self.evict(None)
        } else {
            None
        };

        let slot = self
            .partition
            .insert(line, tag, tier)
            .ok_or(PolicyError::SetFull { set: self.index })?;
        self.stats.fills += 1;
        self.target.clamp(self.partition.len());

        Ok(FillOutcome {
            slot,
            tier,
            evicted,
        })
    }

    /// Evicts a victim among `candidates` (all resident lines when `None`).
    pub fn pick_victim(&mut self, candidates: Option<&[LineId]>) -> Option<Evicted> {
        let evicted = self.evict(candidates);
        self.target.clamp(self.partition.len());
        evicted
    }

    /// Drops `slot` without recording history.
    pub fn invalidate(&mut self, slot: Slot) -> Option<Resident> {
        let resident = self.partition.remove(slot)?;
        self.stats.invalidations += 1;
        self.target.clamp(self.partition.len());
        trace!(set = self.index, slot, tag = resident.tag, "invalidated");
        Some(resident)
    }

    /// Counters accumulated by this set.
    pub const fn stats(&self) -> PolicyStats {
        self.stats
    }

    /// Copies the lists and target into an owned snapshot.
    pub fn snapshot(&self) -> SetSnapshot {
        let list = |tier: Tier| -> Vec<(LineId, u64)> {
            self.partition
                .iter(tier)
                .filter_map(|slot| self.partition.get(slot))
                .map(|r| (r.line, r.tag))
                .collect()
        };
        SetSnapshot {
            recent: list(Tier::Recent),
            frequent: list(Tier::Frequent),
            recent_ghost: self.recent_ghost.iter().collect(),
            frequent_ghost: self.frequent_ghost.iter().collect(),
            target: self.target.get(),
        }
    }

    #[cfg(test)]
    pub fn debug_validate_invariants(&self) {
        self.partition.debug_validate_invariants();
        let violations = self.snapshot().violations(self.recent_ghost.capacity());
        assert!(violations.is_empty(), "{violations:?}");
    }
}

/// Owned copy of one set's ARC state.
///
/// Resident lists are ordered head (most recent) to tail; ghost ledgers are
/// ordered oldest to newest.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SetSnapshot {
    /// T1 as `(line, tag)` pairs.
    pub recent: Vec<(LineId, u64)>,
    /// T2 as `(line, tag)` pairs.
    pub frequent: Vec<(LineId, u64)>,
    /// B1 tags.
    pub recent_ghost: Vec<u64>,
    /// B2 tags.
    pub frequent_ghost: Vec<u64>,
    /// Adaptive target `p`.
    pub target: usize,
}

impl SetSnapshot {
    /// `|T1| + |T2|`.
    pub fn resident_len(&self) -> usize {
        self.recent.len() + self.frequent.len()
    }

    /// T1 tags, head to tail.
    pub fn recent_tags(&self) -> Vec<u64> {
        self.recent.iter().map(|&(_, tag)| tag).collect()
    }

    /// T2 tags, head to tail.
    pub fn frequent_tags(&self) -> Vec<u64> {
        self.frequent.iter().map(|&(_, tag)| tag).collect()
    }

    /// Lists every ARC invariant this snapshot breaks for associativity `ways`.
    ///
    /// An empty result means the set is consistent.
    pub fn violations(&self, ways: usize) -> Vec<String> {
        let mut out = Vec::new();
        let resident = self.resident_len();
        if resident > ways {
            out.push(format!("{resident} resident lines exceed {ways} ways"));
        }
        if self.target > resident {
            out.push(format!("target {} exceeds {resident} resident lines", self.target));
        }
        if self.recent_ghost.len() > ways {
            out.push(format!("B1 holds {} tags, cap {ways}", self.recent_ghost.len()));
        }
        if self.frequent_ghost.len() > ways {
            out.push(format!("B2 holds {} tags, cap {ways}", self.frequent_ghost.len()));
        }

        let mut tags: Vec<u64> = self
            .recent_tags()
            .into_iter()
            .chain(self.frequent_tags())
            .chain(self.recent_ghost.iter().copied())
            .chain(self.frequent_ghost.iter().copied())
            .collect();
        let total = tags.len();
        tags.sort_unstable();
        tags.dedup();
        if tags.len() != total {
            out.push(format!("{} tags appear in more than one list", total - tags.len()));
        }

        let mut lines: Vec<LineId> = self
            .recent
            .iter()
            .chain(&self.frequent)
            .map(|&(line, _)| line)
            .collect();
        let total = lines.len();
        lines.sort_unstable();
        lines.dedup();
        if lines.len() != total {
            out.push("a line is linked into more than one slot".to_owned());
        }
        out
    }
}
