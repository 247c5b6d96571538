//! Bounded history of evicted tags.
//!
//! A ghost ledger remembers the tags of lines recently evicted from one
//! resident list, without any data. ARC keeps two of them per set (B1 for
//! tags evicted from the recency list, B2 for the frequency list) and uses a
//! hit in either to retune the partition.
//!
//! ```text
//!   oldest                         newest
//!   front ─► [t0] [t1] [t2] ... [tn] ◄─ back
//!            dropped first        recorded last
//! ```
//!
//! The ledger never holds more than `capacity` tags; recording into a full
//! ledger drops the oldest entry. All operations are bounded by `capacity`,
//! which is the set associativity.

use std::collections::VecDeque;

/// FIFO-capped ledger of bare tags.
#[derive(Debug, Clone)]
pub struct GhostLedger {
    tags: VecDeque<u64>,
    capacity: usize,
}

impl GhostLedger {
    /// Creates an empty ledger holding at most `capacity` tags.
    pub fn new(capacity: usize) -> Self {
        Self {
            tags: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Returns the number of tags currently remembered.
    pub fn len(&self) -> usize {
        self.tags.len()
    }

    #[cfg(test)]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns `true` if `tag` is remembered.
    #[cfg(test)]
    pub fn contains(&self, tag: u64) -> bool {
        self.tags.contains(&tag)
    }

    /// Records `tag` as the newest entry.
    ///
    /// A tag already present is moved to the newest position rather than
    /// duplicated. Returns the tag dropped to stay within capacity, if any.
    pub fn record(&mut self, tag: u64) -> Option<u64> {
        if self.capacity == 0 {
            return None;
        }
        if let Some(pos) = self.tags.iter().position(|&t| t == tag) {
            let _ = self.tags.remove(pos);
        }
        self.tags.push_back(tag);
        if self.tags.len() > self.capacity {
            self.tags.pop_front()
        } else {
            None
        }
    }

    /// Forgets `tag`; returns `true` if it was present.
    pub fn remove(&mut self, tag: u64) -> bool {
        match self.tags.iter().position(|&t| t == tag) {
            Some(pos) => self.tags.remove(pos).is_some(),
            None => false,
        }
    }

    /// Iterates tags from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = u64> + '_ {
        self.tags.iter().copied()
    }
}
