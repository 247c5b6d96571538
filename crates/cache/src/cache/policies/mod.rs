//! Cache Replacement Policies.
//!
//! Defines the interface between a set-associative cache controller and the
//! replacement policy that tracks its lines, plus the Adaptive Replacement
//! Cache (ARC) implementation of that interface.
//!
//! # Line handles
//!
//! The controller asks the policy for one [`LineId`] per physical line slot at
//! construction time and keeps it for the lifetime of the slot. Every
//! subsequent call names the slot by that handle; the policy keeps the set,
//! tag, and list membership of the line internally.

use std::fmt;

use crate::common::PolicyError;

/// Adaptive Replacement Cache policy.
pub mod arc;

pub use arc::{ArcPolicy, SetSnapshot};

/// Opaque handle naming one physical cache line slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LineId(pub(crate) u32);

impl LineId {
    /// Dense index of this handle, in allocation order starting at 0.
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for LineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Resident list a line currently belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ListKind {
    /// Recency list (T1): lines referenced once since they were filled.
    Recent,
    /// Frequency list (T2): lines re-referenced, or filled after a ghost hit.
    Frequent,
    /// The slot holds no tracked content.
    #[default]
    Invalid,
}

/// Point-in-time view of a single line's policy metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineState {
    /// Set the line is resident in, if any.
    pub set: Option<usize>,
    /// Tag of the resident content, if any.
    pub tag: Option<u64>,
    /// Current list membership.
    pub list: ListKind,
}

impl LineState {
    /// State of a slot that holds nothing.
    pub const INVALID: Self = Self {
        set: None,
        tag: None,
        list: ListKind::Invalid,
    };
}

/// Trait for cache replacement policies.
///
/// All methods take `&self`: implementations guard their per-set state
/// internally so that accesses to different sets may proceed in parallel.
pub trait ReplacementPolicy: Send + Sync {
    /// Allocates metadata for a new line slot. The line starts out invalid.
    ///
    /// # Errors
    ///
    /// Fails once every slot the policy was sized for has been handed out.
    fn create_metadata(&self) -> Result<LineId, PolicyError>;

    /// Drops a line from its resident list without recording history.
    ///
    /// Invalidating an already-invalid line is a no-op.
    ///
    /// # Errors
    ///
    /// Fails if `line` was not minted by this policy.
    fn invalidate(&self, line: LineId) -> Result<(), PolicyError>;

    /// Updates recency and frequency state when a resident line is hit.
    ///
    /// # Errors
    ///
    /// Fails if `line` is unknown or not currently resident.
    fn touch(&self, line: LineId) -> Result<(), PolicyError>;

    /// Places new content with `tag` into `set` through `line`.
    ///
    /// If the set is full, one line is evicted first and its handle returned
    /// so the caller can reclaim the physical slot.
    ///
    /// # Errors
    ///
    /// Fails for an out-of-range set, an unknown line, or a tag that is
    /// already resident in the set under another line.
    fn fill(&self, line: LineId, set: usize, tag: u64) -> Result<Option<LineId>, PolicyError>;

    /// Selects and evicts a victim among `candidates` in `set`.
    ///
    /// Returns `None` when no candidate is resident.
    ///
    /// # Errors
    ///
    /// Fails for an out-of-range set.
    fn pick_victim(&self, set: usize, candidates: &[LineId]) -> Result<Option<LineId>, PolicyError>;
}
