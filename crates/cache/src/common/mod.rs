//! Common types shared across the crate.
//!
//! Currently this is the error vocabulary used by the policy, the reference
//! cache controller, and the configuration loader.

/// Policy and configuration errors.
pub mod error;

pub use error::{ConfigError, PolicyError};
