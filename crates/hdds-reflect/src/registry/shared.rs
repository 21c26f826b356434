// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Thread-shareable registry handle.
//!
//! Load units add and remove their types under the write lock; lookups and
//! serialization take read guards. Registration is expected to settle
//! before concurrent lookups start.

use super::TypeRegistry;
use crate::error::SerializeResult;
use crate::reflect::Reflect;
use crate::serializer;
use crate::types::{TypeInfo, TypeKey};
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::sync::Arc;

/// Cloneable handle to one registry.
#[derive(Clone, Default, Debug)]
pub struct SharedTypeRegistry {
    inner: Arc<RwLock<TypeRegistry>>,
}

impl SharedTypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn read(&self) -> RwLockReadGuard<'_, TypeRegistry> {
        self.inner.read()
    }

    pub fn write(&self) -> RwLockWriteGuard<'_, TypeRegistry> {
        self.inner.write()
    }

    pub fn register<T: TypeInfo>(&self) -> TypeKey {
        self.inner.write().register::<T>()
    }

    pub fn unregister<T: TypeInfo>(&self) -> bool {
        self.inner.write().unregister::<T>()
    }

    /// Encode `value` under a read guard.
    pub fn encode<T: Reflect>(&self, value: &T) -> SerializeResult<Vec<u8>> {
        serializer::encode(&self.inner.read(), value)
    }

    /// Decode into `value` under a read guard.
    pub fn decode<T: Reflect>(&self, bytes: &[u8], value: &mut T) -> SerializeResult<()> {
        serializer::decode(&self.inner.read(), bytes, value)
    }
}

impl From<TypeRegistry> for SharedTypeRegistry {
    fn from(registry: TypeRegistry) -> Self {
        Self {
            inner: Arc::new(RwLock::new(registry)),
        }
    }
}
