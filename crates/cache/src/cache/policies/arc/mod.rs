//! Adaptive Replacement Cache (ARC) Replacement Policy.
//!
//! ARC balances recency against frequency inside every cache set. Resident
//! lines are split into a recency list (T1, referenced once) and a frequency
//! list (T2, referenced again or re-filled after a ghost hit). Two ghost
//! ledgers (B1, B2) remember the tags recently evicted from each list; a fill
//! that finds its tag in a ghost ledger retunes the target size `p` of T1.
//!
//! ```text
//!   ArcPolicy
//!   ┌──────────────────────────────────────────────────────────────┐
//!   │ directory: [AtomicU64; sets * ways]   LineId -> (set, slot)  │
//!   │ sets:      [Mutex<SetState>; sets]                           │
//!   └──────────────────────────────────────────────────────────────┘
//!
//!   SetState (one per set, own lock)
//!     T1 (MRU ... LRU)   ──evict──►  B1 (oldest ... newest, cap = ways)
//!     T2 (MRU ... LRU)   ──evict──►  B2 (oldest ... newest, cap = ways)
//!     p: target |T1|
//!
//!   hit in T1      → move to T2 head
//!   hit in T2      → move to T2 head
//!   fill, tag ∈ B1 → p grows,  line to T2 head
//!   fill, tag ∈ B2 → p shrinks, line to T2 head
//!   fill, cold     → line to T1 head
//!   victim         → T1 tail if |T1| > p or T2 empty, else T2 tail
//! ```
//!
//! # Performance
//!
//! - **Time Complexity:** every operation is bounded by the associativity `W`
//!   (tag and ghost lookups scan at most `W` entries; list moves are O(1)).
//! - **Space Complexity:** O(S × W) for S sets.
//! - **Concurrency:** one lock per set; accesses to different sets never contend.

mod adaptive;
mod eviction;
mod ghost;
mod partition;
mod set_state;

use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};

use parking_lot::{Mutex, MutexGuard};
use tracing::{debug, trace};

pub use self::set_state::SetSnapshot;

use self::partition::Slot;
use self::set_state::SetState;
use super::{LineId, LineState, ReplacementPolicy};
use crate::common::{ConfigError, PolicyError};
use crate::config::CacheConfig;
use crate::stats::PolicyStats;

/// Directory word of a line that is not resident anywhere.
const UNBOUND: u64 = u64::MAX;

const fn pack(set: usize, slot: Slot) -> u64 {
    ((set as u64) << 32) | (slot as u64)
}

const fn unpack(word: u64) -> Option<(usize, Slot)> {
    if word == UNBOUND {
        None
    } else {
        Some(((word >> 32) as usize, (word & 0xFFFF_FFFF) as usize))
    }
}

/// ARC policy state for every set of one cache.
#[derive(Debug)]
pub struct ArcPolicy {
    sets: Box<[Mutex<SetState>]>,
    /// Residency of each minted line. Written only under the owning set's lock.
    directory: Box<[AtomicU64]>,
    next_line: AtomicU32,
    ways: usize,
}

impl ArcPolicy {
    /// Creates a policy for `sets` sets of `ways` lines each.
    ///
    /// All per-set state is allocated up front and lives as long as the policy.
    ///
    /// # Errors
    ///
    /// [`PolicyError::InvalidGeometry`] if either dimension is zero or the
    /// total line count does not fit a [`LineId`].
    pub fn new(sets: usize, ways: usize) -> Result<Self, PolicyError> {
        let capacity = sets
            .checked_mul(ways)
            .filter(|&c| c > 0 && u32::try_from(c).is_ok())
            .ok_or(PolicyError::InvalidGeometry { sets, ways })?;

        debug!(sets, ways, "creating ARC policy");
        Ok(Self {
            sets: (0..sets).map(|i| Mutex::new(SetState::new(i, ways))).collect(),
            directory: (0..capacity).map(|_| AtomicU64::new(UNBOUND)).collect(),
            next_line: AtomicU32::new(0),
            ways,
        })
    }

    /// Creates a policy sized for the geometry in `config`.
    ///
    /// # Errors
    ///
    /// Any error of [`CacheConfig::validate`], or a rejected geometry.
    pub fn from_config(config: &CacheConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::new(config.num_sets(), config.ways)?)
    }

    /// Associativity; also the cap of each ghost ledger.
    pub const fn ways(&self) -> usize {
        self.ways
    }

    /// Number of sets.
    pub fn sets(&self) -> usize {
        self.sets.len()
    }

    /// Maximum number of line handles (`sets * ways`).
    pub fn capacity(&self) -> usize {
        self.directory.len()
    }

    /// Current metadata of `line`.
    ///
    /// # Errors
    ///
    /// [`PolicyError::UnknownLine`] if `line` was not minted by this policy.
    pub fn line_state(&self, line: LineId) -> Result<LineState, PolicyError> {
        let entry = self.entry(line)?;
        let Some((set, slot)) = unpack(entry.load(Ordering::Acquire)) else {
            return Ok(LineState::INVALID);
        };
        let state = self.lock_set(set)?;
        Ok(state
            .resident_at(slot, line)
            .map_or(LineState::INVALID, |r| LineState {
                set: Some(set),
                tag: Some(r.tag),
                list: r.tier.into(),
            }))
    }

    /// Owned copy of the lists, ledgers, and target of `set`.
    ///
    /// # Errors
    ///
    /// [`PolicyError::SetOutOfRange`] for a bad set index.
    pub fn snapshot(&self, set: usize) -> Result<SetSnapshot, PolicyError> {
        Ok(self.lock_set(set)?.snapshot())
    }

    /// Counters of a single set.
    ///
    /// # Errors
    ///
    /// [`PolicyError::SetOutOfRange`] for a bad set index.
    pub fn set_stats(&self, set: usize) -> Result<PolicyStats, PolicyError> {
        Ok(self.lock_set(set)?.stats())
    }

    /// Counters summed over all sets.
    ///
    /// Sets are locked one at a time, so the sum is not a single atomic cut
    /// across sets.
    pub fn stats(&self) -> PolicyStats {
        let mut total = PolicyStats::default();
        for set in &self.sets {
            total += set.lock().stats();
        }
        total
    }

    fn set_lock(&self, set: usize) -> Result<&Mutex<SetState>, PolicyError> {
        self.sets.get(set).ok_or(PolicyError::SetOutOfRange {
            set,
            sets: self.sets.len(),
        })
    }

    fn lock_set(&self, set: usize) -> Result<MutexGuard<'_, SetState>, PolicyError> {
        Ok(self.set_lock(set)?.lock())
    }

    fn entry(&self, line: LineId) -> Result<&AtomicU64, PolicyError> {
        if line.0 >= self.next_line.load(Ordering::Acquire) {
            return Err(PolicyError::UnknownLine(line));
        }
        self.directory
            .get(line.index())
            .ok_or(PolicyError::UnknownLine(line))
    }

    fn unbind(&self, line: LineId) {
        if let Some(entry) = self.directory.get(line.index()) {
            entry.store(UNBOUND, Ordering::Release);
        }
    }
}

impl ReplacementPolicy for ArcPolicy {
    fn create_metadata(&self) -> Result<LineId, PolicyError> {
        let capacity = self.capacity();
        self.next_line
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| {
                ((n as usize) < capacity).then_some(n + 1)
            })
            .map(LineId)
            .map_err(|_| PolicyError::MetadataExhausted { capacity })
    }

    fn invalidate(&self, line: LineId) -> Result<(), PolicyError> {
        let entry = self.entry(line)?;
        let Some((set, slot)) = unpack(entry.load(Ordering::Acquire)) else {
            return Ok(());
        };
        let mut state = self.lock_set(set)?;
        if state.resident_at(slot, line).is_some() {
            let _ = state.invalidate(slot);
            entry.store(UNBOUND, Ordering::Release);
        }
        Ok(())
    }

    fn touch(&self, line: LineId) -> Result<(), PolicyError> {
        let entry = self.entry(line)?;
        let (set, slot) =
            unpack(entry.load(Ordering::Acquire)).ok_or(PolicyError::UnboundLine(line))?;
        let mut state = self.lock_set(set)?;
        if state.resident_at(slot, line).is_none() {
            return Err(PolicyError::UnboundLine(line));
        }
        let _ = state.touch(slot);
        Ok(())
    }

    fn fill(&self, line: LineId, set: usize, tag: u64) -> Result<Option<LineId>, PolicyError> {
        let entry = self.entry(line)?;
        let lock = self.set_lock(set)?;

        // A slot refilled without an invalidate first drops its old content,
        // once the new tag is known to be accepted.
        let previous = unpack(entry.load(Ordering::Acquire));
        if let Some((old_set, old_slot)) = previous.filter(|&(s, _)| s != set) {
            lock.lock().accepts(line, tag)?;
            let mut old = self.lock_set(old_set)?;
            if old.resident_at(old_slot, line).is_some() {
                let _ = old.invalidate(old_slot);
                trace!(line = line.index(), old_set, set, "line moved between sets");
            }
        }

        let mut state = lock.lock();
        state.accepts(line, tag)?;
        let stale = previous
            .filter(|&(s, _)| s == set)
            .filter(|&(_, slot)| state.resident_at(slot, line).is_some());
        if let Some((_, old_slot)) = stale {
            let _ = state.invalidate(old_slot);
        }
        entry.store(UNBOUND, Ordering::Release);

        let outcome = state.fill(line, tag)?;
        if let Some(evicted) = outcome.evicted {
            self.unbind(evicted.line);
        }
        entry.store(pack(set, outcome.slot), Ordering::Release);
        trace!(line = line.index(), set, tag, tier = ?outcome.tier, "filled line");

        Ok(outcome.evicted.map(|e| e.line))
    }

    fn pick_victim(&self, set: usize, candidates: &[LineId]) -> Result<Option<LineId>, PolicyError> {
        let mut state = self.lock_set(set)?;
        if candidates.is_empty() {
            return Ok(None);
        }
        let evicted = state.pick_victim(Some(candidates));
        if let Some(evicted) = evicted {
            self.unbind(evicted.line);
        }
        Ok(evicted.map(|e| e.line))
    }
}
