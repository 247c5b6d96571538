//! Policy and configuration error definitions.
//!
//! This module defines the failure modes surfaced by the replacement policy and
//! the configuration loader. It provides:
//! 1. **Precondition violations:** Caller bugs such as unbound line handles or
//!    out-of-range set indices, reported as [`PolicyError`].
//! 2. **Configuration failures:** Parse, I/O, and geometry errors, reported as
//!    [`ConfigError`].
//!
//! "No victim available" is not an error; victim selection returns `Option`.

use thiserror::Error;

use crate::cache::policies::LineId;

/// Errors raised by replacement policy operations.
///
/// Every variant is a precondition violation on the caller's side. The policy
/// state is left untouched when one of these is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolicyError {
    /// The set index is outside the configured range.
    #[error("set index {set} out of range (cache has {sets} sets)")]
    SetOutOfRange {
        /// Offending set index.
        set: usize,
        /// Number of sets the policy was built with.
        sets: usize,
    },

    /// The line handle was not minted by this policy.
    #[error("unknown line handle {0}")]
    UnknownLine(LineId),

    /// A per-line operation was called on a line with no set/tag assigned.
    #[error("line {0} is not bound to a set and tag")]
    UnboundLine(LineId),

    /// Every metadata slot has already been handed out.
    #[error("line metadata exhausted ({capacity} handles already allocated)")]
    MetadataExhausted {
        /// Total number of handles this policy can mint (`sets * ways`).
        capacity: usize,
    },

    /// The tag is already resident in the set under another line.
    #[error("tag {tag:#x} already resident in set {set}")]
    TagAlreadyResident {
        /// Set index of the fill.
        set: usize,
        /// Duplicated tag.
        tag: u64,
    },

    /// No slot could be freed in a full set.
    #[error("set {set} is full and has no evictable line")]
    SetFull {
        /// Set index of the fill.
        set: usize,
    },

    /// The policy geometry has zero sets or zero ways.
    #[error("invalid cache geometry: {sets} sets x {ways} ways")]
    InvalidGeometry {
        /// Requested number of sets.
        sets: usize,
        /// Requested associativity.
        ways: usize,
    },
}

/// Errors raised while loading or validating a cache configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The JSON document could not be parsed.
    #[error("failed to parse cache config: {0}")]
    Parse(#[from] serde_json::Error),

    /// The configuration file could not be read.
    #[error("failed to read cache config: {0}")]
    Io(#[from] std::io::Error),

    /// A field that must be non-zero was zero.
    #[error("cache config field `{0}` must be non-zero")]
    ZeroField(&'static str),

    /// The size does not split into a whole number of sets.
    #[error("{size_bytes} bytes cannot be split into {ways}-way sets of {line_bytes}-byte lines")]
    Indivisible {
        /// Total capacity in bytes.
        size_bytes: usize,
        /// Line size in bytes.
        line_bytes: usize,
        /// Associativity.
        ways: usize,
    },

    /// One set's worth of bytes does not fit in `usize`.
    #[error("{ways} ways of {line_bytes}-byte lines overflow the address space")]
    GeometryOverflow {
        /// Line size in bytes.
        line_bytes: usize,
        /// Associativity.
        ways: usize,
    },

    /// The derived geometry was rejected by the policy.
    #[error(transparent)]
    Policy(#[from] PolicyError),
}
