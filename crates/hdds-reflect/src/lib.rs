// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # HDDS Reflect - runtime type catalog and binary codec
//!
//! Rust types describe themselves once through [`TypeInfo`]; the
//! [`TypeRegistry`] keeps the descriptors, resolves cross references and
//! class hierarchies, and the [`GenericSerializer`] walks any registered
//! value by its descriptor to encode or decode it.
//!
//! ## Quick Start
//!
//! ```rust
//! use hdds_reflect::{reflect_member, ClassBuilder, TypeDescriptor, TypeInfo, TypeRegistry};
//!
//! #[derive(Debug, Default, PartialEq)]
//! struct Point {
//!     x: i32,
//!     y: i32,
//! }
//!
//! impl TypeInfo for Point {
//!     fn type_descriptor() -> TypeDescriptor {
//!         ClassBuilder::<Point>::new("Point")
//!             .member(reflect_member!(Point, x))
//!             .member(reflect_member!(Point, y))
//!             .build()
//!     }
//! }
//!
//! let mut registry = TypeRegistry::new();
//! registry.register::<Point>();
//!
//! let bytes = hdds_reflect::encode(&registry, &Point { x: 3, y: 4 })?;
//! let mut decoded = Point::default();
//! hdds_reflect::decode(&registry, &bytes, &mut decoded)?;
//! assert_eq!(decoded, Point { x: 3, y: 4 });
//! # Ok::<(), hdds_reflect::SerializeError>(())
//! ```
//!
//! ## Architecture
//!
//! ```text
//! +---------------------------------------------------------------------+
//! |  TypeInfo impls / ClassBuilder / reflect_member! / reflect_enum!    |
//! +---------------------------------------------------------------------+
//! |  TypeRegistry: refcounts, name index, lazy init, parent/child links |
//! +---------------------------------------------------------------------+
//! |  GenericSerializer: Writer / Reader over descriptors                |
//! +---------------------------------------------------------------------+
//! |  WriteBuffer | ReadBuffer windows | BufferPool scratch buffers      |
//! +---------------------------------------------------------------------+
//! ```
//!
//! ## Key Types
//!
//! | Type | Description |
//! |------|-------------|
//! | [`TypeRegistry`] | Owns descriptors, resolves names and hierarchies |
//! | [`TypeDescriptor`] | Shape of one type: kind, name, size, factory |
//! | [`ClassBuilder`] | Declares members and parents of a struct |
//! | [`Poly`] | Owning pointer to a class or any of its registered children |
//! | [`GenericSerializer`] | Session-based encoder / decoder |
//! | [`SharedTypeRegistry`] | `Arc<RwLock<_>>` handle for multi-threaded use |
//!
//! ## Features
//!
//! - `config-loaders`: read [`SerializerConfig`] from YAML.

pub mod buffer;
pub mod config;
pub mod error;
pub mod file;
pub mod reflect;
pub mod registry;
pub mod serializer;
pub mod types;

pub use config::SerializerConfig;
#[cfg(feature = "config-loaders")]
pub use error::ConfigError;
pub use error::{RegistryError, SerializeError, SerializeResult};
pub use file::{load_from_file, save_to_file};
pub use reflect::{Poly, Reflect};
pub use registry::{RegistryBuilder, SharedTypeRegistry, TypeRegistry};
pub use serializer::{decode, encode, GenericSerializer, SessionState};
pub use types::{
    ClassBuilder, ClassDescriptor, EnumBuilder, MetaDataSet, PrimitiveKind, TypeDescriptor,
    TypeInfo, TypeKey, TypeKind,
};
