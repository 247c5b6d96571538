//! Replacement policy and cache statistics.
//!
//! This module tracks how the ARC policy and the reference cache behave. It provides:
//! 1. **Policy counters:** Hits, promotions, fills, ghost hits, evictions, and
//!    invalidations, kept per set and summed on demand.
//! 2. **Cache counters:** Accesses, hits, misses, and write-backs seen by `CacheSim`.
//! 3. **Reporting:** A fixed-width text report via `Display`.

use std::fmt;
use std::ops::AddAssign;

/// Counters maintained by the ARC policy.
///
/// Each set owns one instance under its lock; [`crate::cache::policies::ArcPolicy::stats`]
/// returns the sum over all sets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PolicyStats {
    /// Hits on resident lines.
    pub hits: u64,
    /// Hits that moved a line from T1 to T2.
    pub promotions: u64,
    /// Lines placed by a fill.
    pub fills: u64,
    /// Fills whose tag was in neither ghost ledger.
    pub cold_fills: u64,
    /// Fills whose tag was found in B1.
    pub recent_ghost_hits: u64,
    /// Fills whose tag was found in B2.
    pub frequent_ghost_hits: u64,
    /// Capacity evictions from T1.
    pub recent_evictions: u64,
    /// Capacity evictions from T2.
    pub frequent_evictions: u64,
    /// Lines dropped by external invalidation.
    pub invalidations: u64,
}

impl PolicyStats {
    /// Total capacity evictions from either list.
    pub const fn evictions(&self) -> u64 {
        self.recent_evictions + self.frequent_evictions
    }

    /// Total ghost hits in either ledger.
    pub const fn ghost_hits(&self) -> u64 {
        self.recent_ghost_hits + self.frequent_ghost_hits
    }
}

impl AddAssign for PolicyStats {
    fn add_assign(&mut self, rhs: Self) {
        self.hits += rhs.hits;
        self.promotions += rhs.promotions;
        self.fills += rhs.fills;
        self.cold_fills += rhs.cold_fills;
        self.recent_ghost_hits += rhs.recent_ghost_hits;
        self.frequent_ghost_hits += rhs.frequent_ghost_hits;
        self.recent_evictions += rhs.recent_evictions;
        self.frequent_evictions += rhs.frequent_evictions;
        self.invalidations += rhs.invalidations;
    }
}

impl fmt::Display for PolicyStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "ARC POLICY")?;
        writeln!(f, "  arc.hits               {}", self.hits)?;
        writeln!(f, "  arc.promotions         {}", self.promotions)?;
        writeln!(f, "  arc.fills              {}", self.fills)?;
        writeln!(f, "  arc.fills.cold         {}", self.cold_fills)?;
        writeln!(f, "  arc.ghost_hits.b1      {}", self.recent_ghost_hits)?;
        writeln!(f, "  arc.ghost_hits.b2      {}", self.frequent_ghost_hits)?;
        writeln!(f, "  arc.evictions.t1       {}", self.recent_evictions)?;
        writeln!(f, "  arc.evictions.t2       {}", self.frequent_evictions)?;
        write!(f, "  arc.invalidations      {}", self.invalidations)
    }
}

/// Counters maintained by the reference cache controller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Accesses while the cache was enabled.
    pub accesses: u64,
    /// Accesses that found the line resident.
    pub hits: u64,
    /// Accesses that had to fill a line.
    pub misses: u64,
    /// Dirty victims written back to the next level.
    pub writebacks: u64,
}

impl CacheStats {
    /// Fraction of accesses that hit, or 0.0 before any access.
    pub fn hit_rate(&self) -> f64 {
        if self.accesses == 0 {
            0.0
        } else {
            self.hits as f64 / self.accesses as f64
        }
    }
}

impl fmt::Display for CacheStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "  {:<6} accesses: {:<10} | hits: {:<10} | miss_rate: {:.2}% | writebacks: {}",
            "cache",
            self.accesses,
            self.hits,
            100.0 - self.hit_rate() * 100.0,
            self.writebacks
        )
    }
}
