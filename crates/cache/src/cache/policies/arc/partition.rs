//! Resident partition of one cache set.
//!
//! Holds the lines currently cached in a set, split into the recency list (T1)
//! and the frequency list (T2). Both lists live in a single fixed-size slab of
//! `ways` nodes and are linked through slot indices, so move-to-head, unlink,
//! and tail lookup are O(1) without any pointer aliasing.
//!
//! ```text
//!   nodes: [Option<Node>; ways]          free: [slot, ...]
//!
//!   T1 head ─► [s2] ◄──► [s0] ◄── tail     (MRU ... LRU)
//!   T2 head ─► [s1] ◄──► [s3] ◄── tail
//! ```
//!
//! Position in a list is the only recency marker; no timestamps are kept.

use std::iter;

use crate::cache::policies::{LineId, ListKind};

/// Index of a node in the partition slab.
pub type Slot = usize;

/// One of the two resident lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    /// Recency list (T1).
    Recent,
    /// Frequency list (T2).
    Frequent,
}

impl Tier {
    /// The other resident list.
    pub const fn other(self) -> Self {
        match self {
            Self::Recent => Self::Frequent,
            Self::Frequent => Self::Recent,
        }
    }
}

impl From<Tier> for ListKind {
    fn from(tier: Tier) -> Self {
        match tier {
            Tier::Recent => Self::Recent,
            Tier::Frequent => Self::Frequent,
        }
    }
}

/// Payload of an occupied slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resident {
    /// Handle of the physical line holding the content.
    pub line: LineId,
    /// Address tag of the content.
    pub tag: u64,
    /// List the line is linked into.
    pub tier: Tier,
}

#[derive(Debug, Clone, Copy)]
struct Node {
    resident: Resident,
    prev: Option<Slot>,
    next: Option<Slot>,
}

#[derive(Debug, Clone, Copy, Default)]
struct Ends {
    head: Option<Slot>,
    tail: Option<Slot>,
    len: usize,
}

/// The T1/T2 lists of one set over a shared slab.
#[derive(Debug, Clone)]
pub struct ResidentPartition {
    nodes: Vec<Option<Node>>,
    free: Vec<Slot>,
    recent: Ends,
    frequent: Ends,
}

impl ResidentPartition {
    /// Creates an empty partition with room for `ways` lines.
    pub fn new(ways: usize) -> Self {
        Self {
            nodes: vec![None; ways],
            free: (0..ways).rev().collect(),
            recent: Ends::default(),
            frequent: Ends::default(),
        }
    }

    /// Number of resident lines across both lists.
    pub const fn len(&self) -> usize {
        self.recent.len + self.frequent.len
    }

    /// Returns `true` when every slot is occupied.
    pub fn is_full(&self) -> bool {
        self.free.is_empty()
    }

    /// Number of lines in `tier`.
    pub const fn len_of(&self, tier: Tier) -> usize {
        self.ends(tier).len
    }

    /// Returns the resident stored at `slot`, if occupied.
    pub fn get(&self, slot: Slot) -> Option<Resident> {
        self.node(slot).map(|n| n.resident)
    }

    /// Finds the slot holding `tag`.
    pub fn find_tag(&self, tag: u64) -> Option<Slot> {
        self.nodes
            .iter()
            .position(|n| n.is_some_and(|n| n.resident.tag == tag))
    }

    /// Inserts a line at the head of `tier`.
    ///
    /// Returns the slot used, or `None` if the partition is full.
    pub fn insert(&mut self, line: LineId, tag: u64, tier: Tier) -> Option<Slot> {
        let slot = self.free.pop()?;
        let entry = self.nodes.get_mut(slot)?;
        *entry = Some(Node {
            resident: Resident { line, tag, tier },
            prev: None,
            next: None,
        });
        self.link_front(slot, tier);
        Some(slot)
    }

    /// Unlinks and frees `slot`, returning what it held.
    pub fn remove(&mut self, slot: Slot) -> Option<Resident> {
        let resident = self.get(slot)?;
        self.unlink(slot);
        if let Some(entry) = self.nodes.get_mut(slot) {
            *entry = None;
        }
        self.free.push(slot);
        Some(resident)
    }

    /// Moves `slot` to the head of the frequency list.
    ///
    /// Returns the list the line was in before the move.
    pub fn promote(&mut self, slot: Slot) -> Option<Tier> {
        let before = self.get(slot)?.tier;
        self.unlink(slot);
        self.link_front(slot, Tier::Frequent);
        Some(before)
    }

    /// Slots of `tier` from head (most recent) to tail.
    pub fn iter(&self, tier: Tier) -> impl Iterator<Item = Slot> + '_ {
        iter::successors(self.ends(tier).head, move |&s| {
            self.node(s).and_then(|n| n.next)
        })
    }

    /// Slots of `tier` from tail (least recent) to head.
    pub fn iter_rev(&self, tier: Tier) -> impl Iterator<Item = Slot> + '_ {
        iter::successors(self.ends(tier).tail, move |&s| {
            self.node(s).and_then(|n| n.prev)
        })
    }

    fn node(&self, slot: Slot) -> Option<&Node> {
        self.nodes.get(slot).and_then(Option::as_ref)
    }

    fn node_mut(&mut self, slot: Slot) -> Option<&mut Node> {
        self.nodes.get_mut(slot).and_then(Option::as_mut)
    }

    const fn ends(&self, tier: Tier) -> &Ends {
        match tier {
            Tier::Recent => &self.recent,
            Tier::Frequent => &self.frequent,
        }
    }

    const fn ends_mut(&mut self, tier: Tier) -> &mut Ends {
        match tier {
            Tier::Recent => &mut self.recent,
            Tier::Frequent => &mut self.frequent,
        }
    }

    fn link_front(&mut self, slot: Slot, tier: Tier) {
        let old_head = self.ends(tier).head;
        let Some(node) = self.node_mut(slot) else {
            return;
        };
        node.resident.tier = tier;
        node.prev = None;
        node.next = old_head;
        if let Some(head) = old_head.and_then(|h| self.node_mut(h)) {
            head.prev = Some(slot);
        }
        let ends = self.ends_mut(tier);
        ends.head = Some(slot);
        if ends.tail.is_none() {
            ends.tail = Some(slot);
        }
        ends.len += 1;
    }

    fn unlink(&mut self, slot: Slot) {
        let Some(Node {
            resident,
            prev,
            next,
        }) = self.node(slot).copied()
        else {
            return;
        };
        match prev.and_then(|p| self.node_mut(p)) {
            Some(p) => p.next = next,
            None => self.ends_mut(resident.tier).head = next,
        }
        match next.and_then(|n| self.node_mut(n)) {
            Some(n) => n.prev = prev,
            None => self.ends_mut(resident.tier).tail = prev,
        }
        let ends = self.ends_mut(resident.tier);
        ends.len = ends.len.saturating_sub(1);
        if let Some(node) = self.node_mut(slot) {
            node.prev = None;
            node.next = None;
        }
    }

    #[cfg(test)]
    pub fn debug_validate_invariants(&self) {
        let occupied = self.nodes.iter().filter(|n| n.is_some()).count();
        assert_eq!(occupied + self.free.len(), self.nodes.len());
        assert_eq!(occupied, self.len());
        for tier in [Tier::Recent, Tier::Frequent] {
            let forward: Vec<_> = self.iter(tier).collect();
            let mut backward: Vec<_> = self.iter_rev(tier).collect();
            backward.reverse();
            assert_eq!(forward, backward);
            assert_eq!(forward.len(), self.len_of(tier));
            for slot in forward {
                assert_eq!(self.get(slot).map(|r| r.tier), Some(tier));
            }
        }
    }
}
