// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! [`TypeInfo`] for std types.
//!
//! Pointer, array, sequence and function descriptors are created unnamed;
//! the registry derives their names from their subtypes once those are
//! registered, which keeps recursive types (a class holding a `Vec` of
//! itself) from recursing here.

use super::{
    default_factory, ensure_dependency, FixedArrayDescriptor, FunctionDescriptor, OwnershipOps,
    PointerDescriptor, PointerFlavor, PrimitiveKind, SequenceDescriptor, SequenceOps,
    TypeDescriptor, TypeInfo, TypeKey, TypeKind,
};
use crate::reflect::Poly;
use std::ptr::NonNull;

macro_rules! impl_primitive {
    ($($ty:ty => $kind:ident),* $(,)?) => {
        $(
            impl TypeInfo for $ty {
                fn type_descriptor() -> TypeDescriptor {
                    TypeDescriptor::for_type::<$ty>(
                        PrimitiveKind::$kind.name(),
                        TypeKind::Primitive(PrimitiveKind::$kind),
                    )
                    .with_factory(default_factory::<$ty>)
                }
            }
        )*

        /// Descriptors every registry starts with.
        pub(crate) fn immortal_descriptors() -> Vec<TypeDescriptor> {
            vec![$(<$ty as TypeInfo>::type_descriptor(),)* String::type_descriptor()]
        }
    };
}

impl_primitive!(
    bool => Bool,
    char => Char,
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    f32 => F32,
    f64 => F64,
    () => Unit,
);

impl TypeInfo for String {
    fn type_descriptor() -> TypeDescriptor {
        TypeDescriptor::for_type::<String>("String", TypeKind::String)
            .with_factory(default_factory::<String>)
    }
}

/// Resizing fills new slots with `T::default()`.
impl<T: TypeInfo + Default> TypeInfo for Vec<T> {
    fn type_descriptor() -> TypeDescriptor {
        let seq = SequenceDescriptor::new(TypeKey::of::<T>(), SequenceOps::vec::<T>());
        TypeDescriptor::for_type::<Self>("", TypeKind::Sequence(seq))
            .with_factory(default_factory::<Self>)
            .with_dependency(ensure_dependency::<T>)
    }
}

impl<T: TypeInfo, const N: usize> TypeInfo for [T; N] {
    fn type_descriptor() -> TypeDescriptor {
        let array = FixedArrayDescriptor::new(TypeKey::of::<T>(), N);
        TypeDescriptor::for_type::<Self>("", TypeKind::FixedArray(array))
            .with_dependency(ensure_dependency::<T>)
    }
}

impl<T: TypeInfo> TypeInfo for Option<Box<T>> {
    fn type_descriptor() -> TypeDescriptor {
        let pointer = PointerDescriptor::new(
            TypeKey::of::<T>(),
            PointerFlavor::Boxed,
            Some(OwnershipOps::boxed::<T>()),
        );
        TypeDescriptor::for_type::<Self>("", TypeKind::Pointer(pointer))
            .with_factory(default_factory::<Self>)
            .with_dependency(ensure_dependency::<T>)
    }
}

impl<B: TypeInfo> TypeInfo for Poly<B> {
    fn type_descriptor() -> TypeDescriptor {
        let pointer = PointerDescriptor::new(
            TypeKey::of::<B>(),
            PointerFlavor::Poly,
            Some(OwnershipOps::poly::<B>()),
        );
        TypeDescriptor::for_type::<Self>("", TypeKind::Pointer(pointer))
            .with_factory(default_factory::<Self>)
            .with_dependency(ensure_dependency::<B>)
    }
}

macro_rules! impl_raw_pointer {
    ($($ptr:ty => $flavor:ident),* $(,)?) => {
        $(
            impl<T: TypeInfo> TypeInfo for $ptr {
                fn type_descriptor() -> TypeDescriptor {
                    let pointer =
                        PointerDescriptor::new(TypeKey::of::<T>(), PointerFlavor::$flavor, None);
                    TypeDescriptor::for_type::<Self>("", TypeKind::Pointer(pointer))
                        .with_dependency(ensure_dependency::<T>)
                }
            }
        )*
    };
}

impl_raw_pointer!(
    *const T => Const,
    *mut T => Mut,
    Option<NonNull<T>> => NonNull,
);

macro_rules! impl_function {
    ($($param:ident),*) => {
        impl<R: TypeInfo, $($param: TypeInfo),*> TypeInfo for fn($($param),*) -> R {
            fn type_descriptor() -> TypeDescriptor {
                let function =
                    FunctionDescriptor::new(vec![$(TypeKey::of::<$param>()),*], TypeKey::of::<R>());
                TypeDescriptor::for_type::<Self>("", TypeKind::Function(function))
                    .with_dependency(ensure_dependency::<R>)
                    $(.with_dependency(ensure_dependency::<$param>))*
            }
        }
    };
}

impl_function!();
impl_function!(A);
impl_function!(A, B);
impl_function!(A, B, C);
