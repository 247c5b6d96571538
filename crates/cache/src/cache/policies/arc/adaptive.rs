//! Adaptive target size for the recency list.
//!
//! `p` is the number of resident lines the set would like to keep in T1. A
//! ghost hit in B1 means a recency-only line was evicted too early, so `p`
//! grows; a ghost hit in B2 means a frequent line was evicted too early, so
//! `p` shrinks. The step is scaled by the ratio of the two ghost ledgers so
//! that the smaller history has proportionally more influence.

/// Per-set adaptation parameter `p`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AdaptiveTarget {
    p: usize,
}

impl AdaptiveTarget {
    /// Current target length of the recency list.
    pub const fn get(self) -> usize {
        self.p
    }

    /// Adjusts `p` after a ghost hit and returns the applied step.
    ///
    /// `b1` and `b2` are the ghost ledger sizes *including* the entry that was
    /// hit. `resident` is `|T1| + |T2|` and bounds `p` from above.
    pub fn on_ghost_hit(&mut self, from_recent: bool, b1: usize, b2: usize, resident: usize) -> usize {
        if from_recent {
            let delta = if b1 >= b2 { 1 } else { b2.div_ceil(b1.max(1)) };
            self.p = (self.p + delta).min(resident);
            delta
        } else {
            let delta = if b2 >= b1 { 1 } else { b1.div_ceil(b2.max(1)) };
            self.p = self.p.saturating_sub(delta);
            delta
        }
    }

    /// Re-establishes `p <= resident` after the set shrank.
    pub fn clamp(&mut self, resident: usize) {
        self.p = self.p.min(resident);
    }
}
