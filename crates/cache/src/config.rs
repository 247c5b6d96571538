//! Cache configuration.
//!
//! This module defines the configuration consumed by the ARC policy and the
//! reference cache controller. It provides:
//! 1. **Defaults:** Baseline cache geometry and latency constants.
//! 2. **Structures:** [`CacheConfig`], deserializable from JSON with every field optional.
//! 3. **Loading:** Helpers to parse a JSON string or file and validate the geometry.
//!
//! The policy itself only needs the set count and the associativity; the
//! remaining fields describe the tag-only cache model that drives it.

use std::path::Path;

use serde::Deserialize;

use crate::common::ConfigError;

/// Default configuration constants.
///
/// These values define the baseline cache when a field is not explicitly
/// present in the JSON configuration.
mod defaults {
    /// Default total cache size in bytes (32 KiB).
    pub const CACHE_SIZE: usize = 32 * 1024;

    /// Default cache line size in bytes.
    pub const CACHE_LINE: usize = 64;

    /// Default associativity (8-way).
    pub const CACHE_WAYS: usize = 8;

    /// Default hit latency in cycles.
    pub const CACHE_LATENCY: u64 = 1;
}

/// Cache geometry and timing configuration.
///
/// # Examples
///
/// ```
/// use arcsim_core::config::CacheConfig;
///
/// let json = r#"{ "enabled": true, "size_bytes": 4096, "line_bytes": 64, "ways": 4 }"#;
/// let config = CacheConfig::from_json(json).unwrap();
/// assert_eq!(config.num_sets(), 16);
/// assert_eq!(config.latency, 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CacheConfig {
    /// Enable this cache; a disabled cache bypasses every access.
    #[serde(default)]
    pub enabled: bool,

    /// Total cache size in bytes
    #[serde(default = "CacheConfig::default_size")]
    pub size_bytes: usize,

    /// Cache line size in bytes
    #[serde(default = "CacheConfig::default_line")]
    pub line_bytes: usize,

    /// Associativity (number of ways); also the ghost ledger cap.
    #[serde(default = "CacheConfig::default_ways")]
    pub ways: usize,

    /// Access latency in cycles
    #[serde(default = "CacheConfig::default_latency")]
    pub latency: u64,
}

impl CacheConfig {
    /// Returns the default cache size in bytes.
    fn default_size() -> usize {
        defaults::CACHE_SIZE
    }

    /// Returns the default cache line size in bytes.
    fn default_line() -> usize {
        defaults::CACHE_LINE
    }

    /// Returns the default cache associativity (number of ways).
    fn default_ways() -> usize {
        defaults::CACHE_WAYS
    }

    /// Returns the default cache access latency in cycles.
    fn default_latency() -> u64 {
        defaults::CACHE_LATENCY
    }

    /// Parses and validates a configuration from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed JSON and the errors of
    /// [`CacheConfig::validate`] for unusable geometry.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses, and validates a configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, otherwise the
    /// errors of [`CacheConfig::from_json`].
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Checks that the geometry describes at least one whole set.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ZeroField`] for a zero size, line, or way count,
    /// [`ConfigError::GeometryOverflow`] when one set's bytes overflow `usize`,
    /// and [`ConfigError::Indivisible`] when the size is not a whole number of
    /// sets.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.size_bytes == 0 {
            return Err(ConfigError::ZeroField("size_bytes"));
        }
        if self.line_bytes == 0 {
            return Err(ConfigError::ZeroField("line_bytes"));
        }
        if self.ways == 0 {
            return Err(ConfigError::ZeroField("ways"));
        }
        let set_bytes = self
            .line_bytes
            .checked_mul(self.ways)
            .ok_or(ConfigError::GeometryOverflow {
                line_bytes: self.line_bytes,
                ways: self.ways,
            })?;
        if self.size_bytes % set_bytes != 0 {
            return Err(ConfigError::Indivisible {
                size_bytes: self.size_bytes,
                line_bytes: self.line_bytes,
                ways: self.ways,
            });
        }
        Ok(())
    }

    /// Number of sets implied by the geometry.
    ///
    /// Returns 0 for a geometry that [`CacheConfig::validate`] would reject.
    pub const fn num_sets(&self) -> usize {
        if self.line_bytes == 0 || self.ways == 0 {
            return 0;
        }
        self.size_bytes / self.line_bytes / self.ways
    }
}

impl Default for CacheConfig {
    /// Creates a default cache configuration.
    ///
    /// The cache is disabled by default and uses the `defaults` geometry.
    fn default() -> Self {
        Self {
            enabled: false,
            size_bytes: defaults::CACHE_SIZE,
            line_bytes: defaults::CACHE_LINE,
            ways: defaults::CACHE_WAYS,
            latency: defaults::CACHE_LATENCY,
        }
    }
}
