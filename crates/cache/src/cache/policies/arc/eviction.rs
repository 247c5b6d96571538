//! Victim selection for one set.
//!
//! The victim comes from T1 when T1 holds more lines than the target `p` (or
//! T2 is empty), otherwise from T2. Within the chosen list the tail is the
//! least recently positioned line. An evicted tag is remembered in the ghost
//! ledger matching the list it left.
//!
//! When the caller restricts the choice to a candidate subset, both the list
//! lengths and the tail are computed over the candidates only.

use tracing::debug;

use super::partition::{Slot, Tier};
use super::set_state::SetState;
use crate::cache::policies::LineId;

/// A line removed from the resident partition by capacity eviction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Evicted {
    /// Handle of the evicted line; now invalid.
    pub line: LineId,
    /// Tag that moved into the ghost ledger.
    pub tag: u64,
    /// List the line was evicted from.
    pub tier: Tier,
}

impl SetState {
    /// Chooses the victim slot without modifying any state.
    pub(super) fn select_victim(&self, candidates: Option<&[LineId]>) -> Option<Slot> {
        let part = &self.partition;
        let in_scope = |slot: &Slot| {
            candidates.is_none_or(|c| part.get(*slot).is_some_and(|r| c.contains(&r.line)))
        };

        let count = |tier: Tier| match candidates {
            None => part.len_of(tier),
            Some(_) => part.iter(tier).filter(|s| in_scope(s)).count(),
        };
        let t1 = count(Tier::Recent);
        let t2 = count(Tier::Frequent);
        let first = if t1 > self.target.get() || t2 == 0 {
            Tier::Recent
        } else {
            Tier::Frequent
        };

        part.iter_rev(first)
            .find(|s| in_scope(s))
            .or_else(|| part.iter_rev(first.other()).find(|s| in_scope(s)))
    }

    /// Evicts one line and records its tag in the matching ghost ledger.
    ///
    /// Returns `None` when nothing in scope is resident. Does not clamp `p`;
    /// callers do that once their whole operation is applied.
    pub(super) fn evict(&mut self, candidates: Option<&[LineId]>) -> Option<Evicted> {
        let slot = self.select_victim(candidates)?;
        let resident = self.partition.remove(slot)?;

        let (ledger, name) = match resident.tier {
            Tier::Recent => {
                self.stats.recent_evictions += 1;
                (&mut self.recent_ghost, "B1")
            }
            Tier::Frequent => {
                self.stats.frequent_evictions += 1;
                (&mut self.frequent_ghost, "B2")
            }
        };
        let dropped = ledger.record(resident.tag);

        debug!(
            set = self.index,
            tag = resident.tag,
            line = resident.line.index(),
            ghost = name,
            dropped_ghost = ?dropped,
            target = self.target.get(),
            "evicted line"
        );

        Some(Evicted {
            line: resident.line,
            tag: resident.tag,
            tier: resident.tier,
        })
    }
}
