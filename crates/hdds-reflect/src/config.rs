// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Wire constants and serializer configuration.
//!
//! # Architecture
//!
//! - **Level 1 (Static)**: wire-format constants shared by the encoder and
//!   the decoder. Changing any of them breaks previously written buffers.
//! - **Level 2 (Dynamic)**: [`SerializerConfig`], tuned per serializer
//!   instance (buffer sizing, scratch pool retention, decode limits).
//!
//! With the `config-loaders` feature the dynamic level can be read from YAML:
//!
//! ```yaml
//! initial_capacity: 4096
//! pool_retained: 32
//! max_depth: 64
//! ```

#[cfg(feature = "config-loaders")]
use crate::error::ConfigError;
#[cfg(feature = "config-loaders")]
use std::path::Path;

// =======================================================================
// Wire format
// =======================================================================

/// Member metadata key marking a pointer as owning its pointee.
///
/// Only pointers carrying this flag are traversed by the serializer.
pub const OWNED_KEY: &str = "owned";

/// Size of every length / count prefix on the wire (`u64`, native order).
pub const LENGTH_PREFIX_SIZE: usize = std::mem::size_of::<u64>();

/// Size of the presence flag written in front of an owned pointer.
pub const PRESENCE_FLAG_SIZE: usize = 1;

/// Terminator of entry names, enum names and runtime class names.
pub const NAME_TERMINATOR: u8 = 0;

// =======================================================================
// Defaults
// =======================================================================

/// Initial capacity of the session output buffer.
pub const DEFAULT_INITIAL_CAPACITY: usize = 256;

/// Initial capacity of a freshly allocated scratch buffer.
pub const DEFAULT_SCRATCH_CAPACITY: usize = 64;

/// Number of scratch buffers kept alive between entries.
pub const DEFAULT_POOL_RETAINED: usize = 16;

/// Maximum nesting of classes / collections / pointees accepted in one value.
pub const DEFAULT_MAX_DEPTH: usize = 128;

/// Largest length or element count accepted while decoding (4 GiB).
pub const DEFAULT_MAX_LENGTH: u64 = 1 << 32;

/// Largest allocation accepted for a sequence whose elements occupy no input
/// bytes (16 MiB).
pub const DEFAULT_MAX_UNBACKED_BYTES: u64 = 1 << 24;

/// Per-instance serializer tuning.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "config-loaders",
    derive(serde::Deserialize, serde::Serialize),
    serde(default)
)]
pub struct SerializerConfig {
    /// Initial capacity of the output buffer of a write session.
    pub initial_capacity: usize,
    /// Initial capacity of scratch buffers used for entry payloads.
    pub scratch_capacity: usize,
    /// Scratch buffers retained by the pool once released.
    pub pool_retained: usize,
    /// Maximum recursion depth before a value is rejected.
    pub max_depth: usize,
    /// Maximum length prefix accepted on read.
    pub max_length: u64,
    /// Maximum bytes allocated for a sequence of elements that encode to
    /// nothing (unowned pointers, empty arrays).
    pub max_unbacked_bytes: u64,
}

impl Default for SerializerConfig {
    fn default() -> Self {
        Self {
            initial_capacity: DEFAULT_INITIAL_CAPACITY,
            scratch_capacity: DEFAULT_SCRATCH_CAPACITY,
            pool_retained: DEFAULT_POOL_RETAINED,
            max_depth: DEFAULT_MAX_DEPTH,
            max_length: DEFAULT_MAX_LENGTH,
            max_unbacked_bytes: DEFAULT_MAX_UNBACKED_BYTES,
        }
    }
}

impl SerializerConfig {
    /// Set the maximum nesting depth.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Set the largest length prefix accepted on read.
    #[must_use]
    pub fn with_max_length(mut self, max_length: u64) -> Self {
        self.max_length = max_length;
        self
    }

    /// Set the allocation cap for sequences of zero-width elements.
    #[must_use]
    pub fn with_max_unbacked_bytes(mut self, max_unbacked_bytes: u64) -> Self {
        self.max_unbacked_bytes = max_unbacked_bytes;
        self
    }

    /// Set how many scratch buffers the pool keeps.
    #[must_use]
    pub fn with_pool_retained(mut self, pool_retained: usize) -> Self {
        self.pool_retained = pool_retained;
        self
    }
}

#[cfg(feature = "config-loaders")]
impl SerializerConfig {
    /// Parse a configuration document. Missing keys keep their defaults.
    pub fn from_yaml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Load a configuration document from disk.
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SerializerConfig::default();
        assert_eq!(config.initial_capacity, DEFAULT_INITIAL_CAPACITY);
        assert_eq!(config.max_depth, DEFAULT_MAX_DEPTH);
        assert_eq!(config.max_length, DEFAULT_MAX_LENGTH);
        assert_eq!(config.max_unbacked_bytes, DEFAULT_MAX_UNBACKED_BYTES);
    }

    #[test]
    fn test_builder_overrides() {
        let config = SerializerConfig::default()
            .with_max_depth(4)
            .with_max_length(1024)
            .with_max_unbacked_bytes(64)
            .with_pool_retained(0);
        assert_eq!(config.max_depth, 4);
        assert_eq!(config.max_unbacked_bytes, 64);
        assert_eq!(config.max_length, 1024);
        assert_eq!(config.pool_retained, 0);
    }

    #[cfg(feature = "config-loaders")]
    #[test]
    fn test_yaml_partial_document() {
        let config = SerializerConfig::from_yaml_str("max_depth: 8\npool_retained: 2\n")
            .expect("valid yaml");
        assert_eq!(config.max_depth, 8);
        assert_eq!(config.pool_retained, 2);
        assert_eq!(config.initial_capacity, DEFAULT_INITIAL_CAPACITY);
    }

    #[cfg(feature = "config-loaders")]
    #[test]
    fn test_yaml_invalid_document() {
        assert!(SerializerConfig::from_yaml_str("max_depth: [oops").is_err());
    }
}
