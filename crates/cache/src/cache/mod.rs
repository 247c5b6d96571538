//! Set-Associative Cache Model.
//!
//! This module implements a tag-only set-associative cache that drives a
//! replacement policy. It models hits, misses, and write-back penalties but
//! stores no data; its purpose is to exercise the policy the way a cache
//! controller would. Set and tag are derived from the address:
//!
//! ```text
//!   set = (addr / line_bytes) % num_sets
//!   tag =  addr / (line_bytes * num_sets)
//! ```
//!
//! On a miss an invalid way is used if one exists; otherwise the policy picks
//! the victim among the set's ways before the new line is filled.

/// Replacement policy interface and the ARC implementation.
pub mod policies;

use tracing::warn;

use self::policies::{ArcPolicy, LineId, ReplacementPolicy};
use crate::common::{ConfigError, PolicyError};
use crate::config::CacheConfig;
use crate::stats::{CacheStats, PolicyStats};

/// Cache line entry containing tag, validity, and dirty bits.
#[derive(Debug, Clone, Copy)]
struct CacheLine {
    id: LineId,
    tag: u64,
    valid: bool,
    dirty: bool,
}

/// Cache model driving an [`ArcPolicy`].
#[derive(Debug)]
pub struct CacheSim {
    /// Access latency in cycles (added on hit; miss adds next-level latency).
    pub latency: u64,
    /// When false, accesses bypass this cache and use next-level latency only.
    pub enabled: bool,
    lines: Vec<CacheLine>,
    num_sets: usize,
    ways: usize,
    line_bytes: usize,
    policy: ArcPolicy,
    stats: CacheStats,
}

impl CacheSim {
    /// Creates a cache model with the geometry in `config`.
    ///
    /// One policy line handle is allocated per way.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the geometry is invalid.
    pub fn new(config: &CacheConfig) -> Result<Self, ConfigError> {
        let policy = ArcPolicy::from_config(config)?;
        let lines = (0..policy.capacity())
            .map(|_| {
                policy.create_metadata().map(|id| CacheLine {
                    id,
                    tag: 0,
                    valid: false,
                    dirty: false,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            latency: config.latency,
            enabled: config.enabled,
            num_sets: policy.sets(),
            ways: policy.ways(),
            line_bytes: config.line_bytes,
            lines,
            policy,
            stats: CacheStats::default(),
        })
    }

    /// The replacement policy driven by this cache.
    pub const fn policy(&self) -> &ArcPolicy {
        &self.policy
    }

    /// Access counters of this cache.
    pub const fn stats(&self) -> CacheStats {
        self.stats
    }

    /// Counters of the replacement policy, summed over all sets.
    pub fn policy_stats(&self) -> PolicyStats {
        self.policy.stats()
    }

    /// Number of sets.
    pub const fn num_sets(&self) -> usize {
        self.num_sets
    }

    /// Set index and tag of `addr`.
    pub const fn locate(&self, addr: u64) -> (usize, u64) {
        let set = ((addr as usize) / self.line_bytes) % self.num_sets;
        let tag = addr / (self.line_bytes * self.num_sets) as u64;
        (set, tag)
    }

    fn find(&self, set: usize, tag: u64) -> Option<usize> {
        let base = set * self.ways;
        (base..base + self.ways).find(|&idx| self.lines[idx].valid && self.lines[idx].tag == tag)
    }

    /// Checks if the cache contains the specified address.
    pub fn contains(&self, addr: u64) -> bool {
        if !self.enabled {
            return false;
        }
        let (set, tag) = self.locate(addr);
        self.find(set, tag).is_some()
    }

    /// Installs a cache line for the specified address.
    ///
    /// Returns the penalty for writing back a dirty victim.
    fn install_line(
        &mut self,
        set: usize,
        tag: u64,
        is_write: bool,
        next_level_latency: u64,
    ) -> Result<u64, PolicyError> {
        let base = set * self.ways;
        let ways = base..base + self.ways;

        let idx = match ways.clone().find(|&idx| !self.lines[idx].valid) {
            Some(idx) => idx,
            None => {
                let candidates: Vec<LineId> = ways.clone().map(|idx| self.lines[idx].id).collect();
                let victim = self.policy.pick_victim(set, &candidates)?;
                match victim.and_then(|id| ways.clone().find(|&idx| self.lines[idx].id == id)) {
                    Some(idx) => idx,
                    None => {
                        warn!(set, "policy returned no victim for a full set, using way 0");
                        self.policy.invalidate(self.lines[base].id)?;
                        base
                    }
                }
            }
        };

        let mut penalty = 0;
        if self.lines[idx].valid && self.lines[idx].dirty {
            penalty += next_level_latency;
            self.stats.writebacks += 1;
        }

        let id = self.lines[idx].id;
        let evicted = self.policy.fill(id, set, tag)?;
        if let Some(line) = evicted.and_then(|e| self.lines.iter_mut().find(|l| l.id == e)) {
            line.valid = false;
        }
        self.lines[idx] = CacheLine {
            id,
            tag,
            valid: true,
            dirty: is_write,
        };

        Ok(penalty)
    }

    /// Accesses the cache for the specified address.
    ///
    /// Returns `(hit, penalty)` where `penalty` is the write-back cost of a
    /// dirty victim on a miss and 0 on a hit.
    ///
    /// # Errors
    ///
    /// Propagates policy precondition violations, which indicate a bug in
    /// this model rather than in the access stream.
    pub fn access(
        &mut self,
        addr: u64,
        is_write: bool,
        next_level_latency: u64,
    ) -> Result<(bool, u64), PolicyError> {
        if !self.enabled {
            return Ok((false, 0));
        }
        self.stats.accesses += 1;
        let (set, tag) = self.locate(addr);

        if let Some(idx) = self.find(set, tag) {
            self.policy.touch(self.lines[idx].id)?;
            if is_write {
                self.lines[idx].dirty = true;
            }
            self.stats.hits += 1;
            return Ok((true, 0));
        }

        self.stats.misses += 1;
        let penalty = self.install_line(set, tag, is_write, next_level_latency)?;
        Ok((false, penalty))
    }

    /// Drops the line holding `addr`, if present, without writing it back.
    ///
    /// # Errors
    ///
    /// Propagates policy precondition violations.
    pub fn invalidate(&mut self, addr: u64) -> Result<bool, PolicyError> {
        if !self.enabled {
            return Ok(false);
        }
        let (set, tag) = self.locate(addr);
        let Some(idx) = self.find(set, tag) else {
            return Ok(false);
        };
        self.policy.invalidate(self.lines[idx].id)?;
        self.lines[idx].valid = false;
        self.lines[idx].dirty = false;
        Ok(true)
    }

    /// Writes back and invalidates all dirty lines.
    ///
    /// Returns the number of lines written back.
    ///
    /// # Errors
    ///
    /// Propagates policy precondition violations.
    pub fn flush(&mut self) -> Result<u64, PolicyError> {
        if !self.enabled {
            return Ok(0);
        }
        let mut written = 0;
        for line in &mut self.lines {
            if line.valid && line.dirty {
                self.policy.invalidate(line.id)?;
                line.dirty = false;
                line.valid = false;
                written += 1;
            }
        }
        self.stats.writebacks += written;
        Ok(written)
    }
}
