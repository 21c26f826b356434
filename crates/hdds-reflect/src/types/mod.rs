// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Runtime type descriptors.
//!
//! A [`TypeDescriptor`] records the shape of one Rust type: its kind, its
//! unique name, its size and (for aggregates) where its parts live in
//! memory. Descriptors reference each other by [`TypeKey`] only; the
//! [`TypeRegistry`](crate::TypeRegistry) resolves those keys lazily, so a
//! type may be registered before the types it refers to.
//!
//! # Kinds
//!
//! | Kind | Rust types |
//! |------|------------|
//! | `Primitive` | `bool`, `char`, `i8`..`i64`, `u8`..`u64`, `f32`, `f64`, `()` |
//! | `String` | `String` |
//! | `Sequence` | `Vec<T>` |
//! | `FixedArray` | `[T; N]` |
//! | `Enum` | field-less enums, see [`reflect_enum!`](crate::reflect_enum) |
//! | `Class` | structs, see [`ClassBuilder`] |
//! | `Pointer` | `Option<Box<T>>`, [`Poly<B>`](crate::Poly), `*const T`, `*mut T`, `Option<NonNull<T>>` |
//! | `Function` | `fn(A, B) -> R` with up to three parameters |

mod builtin;
mod class;
mod collection;
mod enums;
mod function;
mod metadata;
mod pointer;

pub use class::{
    ClassBuilder, ClassDescriptor, FieldSpec, MemberDescriptor, MemberRef, ParentLink, ParentSpec,
};
pub use collection::{FixedArrayDescriptor, SequenceDescriptor, SequenceOps};
pub use enums::{EnumBuilder, EnumDescriptor, EnumValue};
pub use function::FunctionDescriptor;
pub use metadata::{MetaData, MetaDataSet};
pub use pointer::{OwnershipOps, PointerDescriptor, PointerFlavor};

pub(crate) use builtin::immortal_descriptors;

use crate::reflect::Reflect;
use crate::registry::TypeRegistry;
use std::any::TypeId;
use std::fmt;

/// Process-stable identity of a type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeKey(TypeId);

impl TypeKey {
    /// Key of `T`.
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self(TypeId::of::<T>())
    }

    pub(crate) fn from_type_id(id: TypeId) -> Self {
        Self(id)
    }
}

/// Primitive type kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    Bool,
    Char,
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    F32,
    F64,
    /// `()`, zero bytes on the wire.
    Unit,
}

impl PrimitiveKind {
    /// Canonical type name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Char => "char",
            Self::I8 => "i8",
            Self::I16 => "i16",
            Self::I32 => "i32",
            Self::I64 => "i64",
            Self::U8 => "u8",
            Self::U16 => "u16",
            Self::U32 => "u32",
            Self::U64 => "u64",
            Self::F32 => "f32",
            Self::F64 => "f64",
            Self::Unit => "()",
        }
    }

    /// Size in bytes, identical in memory and on the wire.
    pub fn size(self) -> usize {
        match self {
            Self::Unit => 0,
            Self::Bool | Self::I8 | Self::U8 => 1,
            Self::I16 | Self::U16 => 2,
            Self::Char | Self::I32 | Self::U32 | Self::F32 => 4,
            Self::I64 | Self::U64 | Self::F64 => 8,
        }
    }
}

/// Type kind enumeration.
#[derive(Debug)]
pub enum TypeKind {
    Primitive(PrimitiveKind),
    String,
    Sequence(SequenceDescriptor),
    FixedArray(FixedArrayDescriptor),
    Enum(EnumDescriptor),
    Class(ClassDescriptor),
    Pointer(PointerDescriptor),
    Function(FunctionDescriptor),
}

impl TypeKind {
    /// Short label used in logs.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Primitive(_) => "primitive",
            Self::String => "string",
            Self::Sequence(_) => "sequence",
            Self::FixedArray(_) => "array",
            Self::Enum(_) => "enum",
            Self::Class(_) => "class",
            Self::Pointer(_) => "pointer",
            Self::Function(_) => "function",
        }
    }
}

/// Allocates a default instance of a type.
pub type Factory = fn() -> Box<dyn Reflect>;

/// Registers a type another descriptor refers to.
pub type Registrar = fn(&mut TypeRegistry);

/// Default-construct `T` behind the [`Reflect`] object trait.
pub fn default_factory<T: Reflect + Default>() -> Box<dyn Reflect> {
    Box::new(T::default())
}

/// Registrar inserting `T` if the registry does not know it yet.
pub(crate) fn ensure_dependency<T: TypeInfo>(registry: &mut TypeRegistry) {
    registry.ensure::<T>();
}

/// Static access to the descriptor of a type.
///
/// Implemented for the supported std types in this crate; user classes and
/// enums implement it with [`ClassBuilder`] or
/// [`reflect_enum!`](crate::reflect_enum).
pub trait TypeInfo: 'static {
    /// Build a fresh descriptor. Called once per registry.
    fn type_descriptor() -> TypeDescriptor;
}

/// Runtime metadata describing one type's shape and identity.
pub struct TypeDescriptor {
    name: String,
    key: TypeKey,
    size: usize,
    kind: TypeKind,
    factory: Option<Factory>,
    dependencies: Vec<Registrar>,
}

impl TypeDescriptor {
    /// Descriptor for `T`. Size and key come from `T` itself.
    ///
    /// Callers guarantee `kind` matches the memory layout of `T`.
    pub(crate) fn for_type<T: 'static>(name: impl Into<String>, kind: TypeKind) -> Self {
        Self {
            name: name.into(),
            key: TypeKey::of::<T>(),
            size: std::mem::size_of::<T>(),
            kind,
            factory: None,
            dependencies: Vec::new(),
        }
    }

    pub(crate) fn with_factory(mut self, factory: Factory) -> Self {
        self.factory = Some(factory);
        self
    }

    pub(crate) fn with_dependency(mut self, registrar: Registrar) -> Self {
        self.dependencies.push(registrar);
        self
    }

    pub(crate) fn set_name(&mut self, name: String) {
        self.name = name;
    }

    /// Unique name. Empty for pointer, array, sequence and function types
    /// until the registry derives it.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn key(&self) -> TypeKey {
        self.key
    }

    /// `size_of` the described type.
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn kind(&self) -> &TypeKind {
        &self.kind
    }

    pub fn factory(&self) -> Option<Factory> {
        self.factory
    }

    pub fn dependencies(&self) -> &[Registrar] {
        &self.dependencies
    }

    pub fn as_class(&self) -> Option<&ClassDescriptor> {
        match &self.kind {
            TypeKind::Class(class) => Some(class),
            _ => None,
        }
    }

    pub(crate) fn as_class_mut(&mut self) -> Option<&mut ClassDescriptor> {
        match &mut self.kind {
            TypeKind::Class(class) => Some(class),
            _ => None,
        }
    }

    pub fn as_enum(&self) -> Option<&EnumDescriptor> {
        match &self.kind {
            TypeKind::Enum(desc) => Some(desc),
            _ => None,
        }
    }

    pub fn is_class(&self) -> bool {
        matches!(self.kind, TypeKind::Class(_))
    }
}

impl fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeDescriptor")
            .field("name", &self.name)
            .field("size", &self.size)
            .field("kind", &self.kind)
            .field("factory", &self.factory.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primitive_sizes_match_rust() {
        assert_eq!(PrimitiveKind::Bool.size(), std::mem::size_of::<bool>());
        assert_eq!(PrimitiveKind::Char.size(), std::mem::size_of::<char>());
        assert_eq!(PrimitiveKind::I16.size(), std::mem::size_of::<i16>());
        assert_eq!(PrimitiveKind::F64.size(), std::mem::size_of::<f64>());
        assert_eq!(PrimitiveKind::Unit.size(), std::mem::size_of::<()>());
    }

    #[test]
    fn test_type_key_identity() {
        assert_eq!(TypeKey::of::<i32>(), TypeKey::of::<i32>());
        assert_ne!(TypeKey::of::<i32>(), TypeKey::of::<u32>());
        assert_ne!(TypeKey::of::<Vec<i32>>(), TypeKey::of::<[i32; 3]>());
    }

    #[test]
    fn test_builtin_descriptor_shapes() {
        let desc = <u16 as TypeInfo>::type_descriptor();
        assert_eq!(desc.name(), "u16");
        assert_eq!(desc.size(), 2);
        assert!(matches!(desc.kind(), TypeKind::Primitive(PrimitiveKind::U16)));
        assert!(desc.factory().is_some());

        let desc = <Vec<String> as TypeInfo>::type_descriptor();
        assert_eq!(desc.name(), "");
        assert_eq!(desc.kind().label(), "sequence");
        assert_eq!(desc.dependencies().len(), 1);
    }
}
