// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Runtime identity of values.
//!
//! [`Reflect`] is the object trait behind every dynamically typed value:
//! the pointee of a [`Poly`], the output of a factory, the argument of
//! [`TypeRegistry::describe`](crate::TypeRegistry::describe). It is
//! implemented for every `'static` type.

use crate::types::TypeKey;
use std::any::Any;
use std::fmt;
use std::marker::PhantomData;

/// Object-safe access to a value's concrete type.
pub trait Reflect: Any {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
    fn into_any(self: Box<Self>) -> Box<dyn Any>;
}

impl<T: Any> Reflect for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }
}

impl dyn Reflect {
    /// Key of the concrete (most-derived) type.
    pub fn type_key(&self) -> TypeKey {
        TypeKey::from_type_id(self.as_any().type_id())
    }

    pub fn is<T: Reflect>(&self) -> bool {
        self.as_any().is::<T>()
    }

    /// Exact-type downcast.
    pub fn downcast_ref<T: Reflect>(&self) -> Option<&T> {
        self.as_any().downcast_ref()
    }

    pub fn downcast_mut<T: Reflect>(&mut self) -> Option<&mut T> {
        self.as_any_mut().downcast_mut()
    }

    /// Exact-type downcast of a box; hands the box back on mismatch.
    pub fn downcast<T: Reflect>(self: Box<Self>) -> Result<Box<T>, Box<dyn Reflect>> {
        if self.is::<T>() {
            match self.into_any().downcast::<T>() {
                Ok(value) => Ok(value),
                Err(_) => unreachable!("type checked above"),
            }
        } else {
            Err(self)
        }
    }
}

impl fmt::Debug for dyn Reflect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "dyn Reflect({:?})", self.type_key())
    }
}

/// Owning pointer to an instance of `B` or of any class deriving from it.
///
/// The serializer writes the runtime class name in front of the pointee
/// and recreates the same class on read. Derivation is checked against
/// the registry when the pointer is serialized.
pub struct Poly<B> {
    value: Option<Box<dyn Reflect>>,
    _base: PhantomData<fn() -> B>,
}

impl<B> Default for Poly<B> {
    fn default() -> Self {
        Self::null()
    }
}

impl<B> Poly<B> {
    pub fn null() -> Self {
        Self {
            value: None,
            _base: PhantomData,
        }
    }

    pub fn new<T: Reflect>(value: T) -> Self {
        Self::from_box(Box::new(value))
    }

    pub fn from_box(value: Box<dyn Reflect>) -> Self {
        Self {
            value: Some(value),
            _base: PhantomData,
        }
    }

    pub fn is_some(&self) -> bool {
        self.value.is_some()
    }

    pub fn is_none(&self) -> bool {
        self.value.is_none()
    }

    /// Pointee downcast to its exact runtime type.
    pub fn get<T: Reflect>(&self) -> Option<&T> {
        self.as_reflect()?.downcast_ref()
    }

    pub fn get_mut<T: Reflect>(&mut self) -> Option<&mut T> {
        self.value.as_deref_mut()?.downcast_mut()
    }

    pub fn as_reflect(&self) -> Option<&(dyn Reflect + 'static)> {
        self.value.as_deref()
    }

    pub fn take(&mut self) -> Option<Box<dyn Reflect>> {
        self.value.take()
    }

    pub fn clear(&mut self) {
        self.value = None;
    }

    pub(crate) fn replace(&mut self, value: Box<dyn Reflect>) -> &mut (dyn Reflect + 'static) {
        &mut **self.value.insert(value)
    }
}

impl<B> fmt::Debug for Poly<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            Some(value) => f.debug_tuple("Poly").field(value).finish(),
            None => f.write_str("Poly(null)"),
        }
    }
}
