//! Adaptive Replacement Cache policy for set-associative caches.
//!
//! This crate implements the ARC replacement policy at the granularity of a
//! hardware-style cache set, with the following:
//! 1. **Policy:** Per-set recency/frequency lists, ghost ledgers, and the
//!    adaptive target, behind the [`ReplacementPolicy`] trait.
//! 2. **Cache model:** A tag-only set-associative cache ([`CacheSim`]) that
//!    drives the policy the way a controller would.
//! 3. **Configuration:** JSON-deserializable cache geometry.
//! 4. **Statistics:** Policy and cache counters with a text report.
//!
//! ```
//! use arcsim_core::{ArcPolicy, ListKind, ReplacementPolicy};
//!
//! let policy = ArcPolicy::new(1, 2)?;
//! let a = policy.create_metadata()?;
//! let b = policy.create_metadata()?;
//!
//! policy.fill(a, 0, 0x10)?;
//! policy.fill(b, 0, 0x20)?;
//! policy.touch(a)?;
//! assert_eq!(policy.line_state(a)?.list, ListKind::Frequent);
//!
//! // The set is full: the T1 tail (b) is evicted and its tag goes to B1.
//! assert_eq!(policy.pick_victim(0, &[a, b])?, Some(b));
//! assert_eq!(policy.snapshot(0)?.recent_ghost, vec![0x20]);
//! # Ok::<(), arcsim_core::PolicyError>(())
//! ```

/// Set-associative cache model and replacement policies.
pub mod cache;
/// Error types for policy operations and configuration.
pub mod common;
/// Cache geometry configuration.
pub mod config;
/// Policy and cache statistics.
pub mod stats;

/// Reference cache controller driving an [`ArcPolicy`].
pub use crate::cache::CacheSim;
/// Policy interface, ARC implementation, and line metadata types.
pub use crate::cache::policies::{
    ArcPolicy, LineId, LineState, ListKind, ReplacementPolicy, SetSnapshot,
};
/// Errors returned by this crate.
pub use crate::common::{ConfigError, PolicyError};
/// Cache geometry; use `CacheConfig::default()` or deserialize from JSON.
pub use crate::config::CacheConfig;
/// Counters exposed by the policy and the cache model.
pub use crate::stats::{CacheStats, PolicyStats};
