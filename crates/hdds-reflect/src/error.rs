// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Recoverable error types.
//!
//! Only *data* errors live here: truncated or malformed input, names that do
//! not resolve against the registry, I/O failures. Mistakes in type
//! declarations (duplicate members, name collisions, missing factories,
//! serializer misuse) are precondition violations and panic instead.

use thiserror::Error;

/// Data errors raised while encoding or decoding a value.
#[derive(Debug, Error)]
pub enum SerializeError {
    /// The input ended before a complete value could be read.
    #[error("truncated input at offset {offset}: need {needed} bytes, {remaining} remaining")]
    Truncated {
        /// Read offset where the underrun was detected.
        offset: usize,
        /// Bytes the decoder asked for.
        needed: usize,
        /// Bytes left in the current window.
        remaining: usize,
    },

    /// A length or element count exceeds the configured limit.
    #[error("declared length {length} exceeds limit {limit}")]
    LengthOverflow {
        /// Length found on the wire.
        length: u64,
        /// Configured maximum.
        limit: u64,
    },

    /// Value nesting exceeds the configured depth.
    #[error("nesting depth exceeds limit {limit}")]
    DepthExceeded {
        /// Configured maximum.
        limit: usize,
    },

    /// An enum name on the wire is not declared by the target enum.
    #[error("enum `{enum_name}` has no value named `{value}`")]
    UnknownEnumValue {
        /// Target enum type.
        enum_name: String,
        /// Name read from the input.
        value: String,
    },

    /// The in-memory integer of an enum has no declared name.
    #[error("enum `{enum_name}` has no name for value {value}")]
    UnmappedEnumValue {
        /// Source enum type.
        enum_name: String,
        /// Integer found in memory.
        value: i64,
    },

    /// A runtime class name does not resolve to a registered class.
    #[error("unknown class `{name}`")]
    UnknownClass {
        /// Name read from the input.
        name: String,
    },

    /// The pointee class is not the declared base class or one of its children.
    #[error("class `{class}` does not derive from `{base}`")]
    NotDerived {
        /// Runtime class.
        class: String,
        /// Declared pointee class.
        base: String,
    },

    /// The owning pointer cannot hold an instance of the resolved class.
    #[error("pointer `{pointer}` cannot own an instance of `{class}`")]
    PointeeMismatch {
        /// Pointer type.
        pointer: String,
        /// Resolved pointee type.
        class: String,
    },

    /// A string or name is not valid UTF-8.
    #[error("invalid UTF-8 at offset {offset}")]
    InvalidUtf8 {
        /// Offset of the offending bytes.
        offset: usize,
    },

    /// A boolean byte (value or presence flag) is neither 0 nor 1.
    #[error("invalid bool byte {0:#04x}")]
    InvalidBool(u8),

    /// A `char` payload is not a Unicode scalar value.
    #[error("invalid char scalar {0:#x}")]
    InvalidChar(u32),

    /// File helper I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias used across the codec.
pub type SerializeResult<T> = Result<T, SerializeError>;

/// Recoverable registry failures.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Types still waiting for a parent (or subtype) that was never registered.
    #[error("unresolved types after finalize: {}", types.join(", "))]
    Unresolved {
        /// Names of the pending descriptors.
        types: Vec<String>,
    },
}

/// Configuration loading failures.
#[cfg(feature = "config-loaders")]
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),
    /// The document is not valid YAML for [`crate::SerializerConfig`].
    #[error("failed to parse configuration: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_variants() {
        let err = SerializeError::Truncated {
            offset: 12,
            needed: 8,
            remaining: 3,
        };
        assert_eq!(
            err.to_string(),
            "truncated input at offset 12: need 8 bytes, 3 remaining"
        );

        let err = SerializeError::UnknownEnumValue {
            enum_name: "Color".into(),
            value: "Purple".into(),
        };
        assert_eq!(err.to_string(), "enum `Color` has no value named `Purple`");

        let err = SerializeError::InvalidBool(7);
        assert_eq!(err.to_string(), "invalid bool byte 0x07");
    }

    #[test]
    fn test_unresolved_lists_types() {
        let err = RegistryError::Unresolved {
            types: vec!["Dog".into(), "Cat".into()],
        };
        assert_eq!(err.to_string(), "unresolved types after finalize: Dog, Cat");
    }
}
