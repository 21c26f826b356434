// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Collect-then-finalize registry construction.
//!
//! Types are collected in any order; [`RegistryBuilder::finalize`]
//! registers all of them, resolves every parent link and derived name in
//! one pass, and fails if anything is left unresolved.

use super::TypeRegistry;
use crate::error::RegistryError;
use crate::types::{Registrar, TypeDescriptor, TypeInfo};

/// Builder for a fully initialized [`TypeRegistry`].
#[derive(Default)]
pub struct RegistryBuilder {
    registrars: Vec<Registrar>,
    descriptors: Vec<TypeDescriptor>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `T` and, on first sight, the types it depends on.
    #[must_use]
    pub fn register<T: TypeInfo>(mut self) -> Self {
        self.registrars.push(register_type::<T>);
        self
    }

    /// Register a raw descriptor. Its dependencies are not pulled in.
    #[must_use]
    pub fn descriptor(mut self, descriptor: TypeDescriptor) -> Self {
        self.descriptors.push(descriptor);
        self
    }

    /// Register everything collected and resolve cross-references.
    ///
    /// # Errors
    ///
    /// [`RegistryError::Unresolved`] lists the types whose parents or
    /// subtypes were never provided.
    ///
    /// # Panics
    ///
    /// Panics on a name collision between two collected types.
    pub fn finalize(self) -> Result<TypeRegistry, RegistryError> {
        let mut registry = TypeRegistry::new();
        for descriptor in self.descriptors {
            registry.add_type(descriptor);
        }
        for registrar in self.registrars {
            registrar(&mut registry);
        }
        registry.init_new_types();

        let types = registry.unresolved();
        if !types.is_empty() {
            return Err(RegistryError::Unresolved { types });
        }
        log::debug!("[reflect] registry finalized with {} types", registry.len());
        Ok(registry)
    }
}

fn register_type<T: TypeInfo>(registry: &mut TypeRegistry) {
    registry.add_with_dependencies(T::type_descriptor());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ClassBuilder, TypeKey};
    use crate::{reflect_member, reflect_parent};

    #[derive(Default)]
    struct Shape {
        id: u16,
    }

    #[derive(Default)]
    struct Circle {
        shape: Shape,
        radius: f64,
    }

    impl TypeInfo for Shape {
        fn type_descriptor() -> TypeDescriptor {
            ClassBuilder::<Shape>::new("Shape")
                .member(reflect_member!(Shape, id))
                .build()
        }
    }

    impl TypeInfo for Circle {
        fn type_descriptor() -> TypeDescriptor {
            ClassBuilder::<Circle>::new("Circle")
                .parent(reflect_parent!(Circle, shape))
                .member(reflect_member!(Circle, radius))
                .build()
        }
    }

    #[test]
    fn test_finalize_in_any_order() {
        let registry = RegistryBuilder::new()
            .descriptor(Circle::type_descriptor())
            .descriptor(Shape::type_descriptor())
            .register::<Vec<Circle>>()
            .finalize()
            .expect("all types resolved");
        assert!(registry.find_by_name("Circle").is_some());
        assert!(registry.find_by_name("Vec<Circle>").is_some());
        let shape = registry.class(TypeKey::of::<Shape>()).expect("shape");
        assert_eq!(shape.children().count(), 1);
    }

    #[test]
    fn test_finalize_reports_missing_parent() {
        let err = RegistryBuilder::new()
            .descriptor(Circle::type_descriptor())
            .finalize()
            .expect_err("parent never provided");
        match err {
            RegistryError::Unresolved { types } => assert_eq!(types, vec!["Circle".to_owned()]),
        }
    }
}
