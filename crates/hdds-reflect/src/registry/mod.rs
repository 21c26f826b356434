// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Type registry.
//!
//! # Architecture
//!
//! ```text
//! TypeRegistry
//! +-- entries: HashMap<TypeKey, Entry>      (descriptor + refcount)
//! +-- by_name: HashMap<String, TypeKey>     (initialized types only)
//! +-- pending: Vec<TypeKey>                 (waiting for init_new_types)
//! ```
//!
//! # Lifecycle
//!
//! 1. `add_type` inserts a descriptor on first sight, otherwise bumps the
//!    refcount of the existing entry and drops the new descriptor.
//! 2. `init_new_types` links classes to their parents and derives the names
//!    of pointer, array, sequence and function types. A type whose parent
//!    or subtype is missing stays pending and is retried on the next call,
//!    so registration order does not matter.
//! 3. `remove_type` decrements the refcount and tears the entry down at
//!    zero. Built-in primitives and `String` are immortal.
//!
//! [`RegistryBuilder`] wraps the same steps in a collect-then-finalize API
//! and [`SharedTypeRegistry`] shares one registry between threads.

mod builder;
mod shared;

pub use builder::RegistryBuilder;
pub use shared::SharedTypeRegistry;

use crate::reflect::Reflect;
use crate::types::{
    immortal_descriptors, ClassDescriptor, FunctionDescriptor, TypeDescriptor, TypeInfo, TypeKey,
    TypeKind,
};
use std::collections::HashMap;
use std::fmt;

const UNREGISTERED: &str = "<unregistered>";

struct Entry {
    descriptor: TypeDescriptor,
    refcount: usize,
    initialized: bool,
    immortal: bool,
}

/// Catalog of type descriptors keyed by type identity and by name.
pub struct TypeRegistry {
    entries: HashMap<TypeKey, Entry>,
    by_name: HashMap<String, TypeKey>,
    pending: Vec<TypeKey>,
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeRegistry {
    /// Registry holding the built-in primitives and `String`.
    pub fn new() -> Self {
        let mut registry = Self {
            entries: HashMap::new(),
            by_name: HashMap::new(),
            pending: Vec::new(),
        };
        for descriptor in immortal_descriptors() {
            let key = descriptor.key();
            registry.by_name.insert(descriptor.name().to_owned(), key);
            registry.entries.insert(
                key,
                Entry {
                    descriptor,
                    refcount: 1,
                    initialized: true,
                    immortal: true,
                },
            );
        }
        registry
    }

    /// Register `descriptor`, or count one more registration of its key.
    ///
    /// The descriptor stays pending until [`init_new_types`](Self::init_new_types).
    ///
    /// # Panics
    ///
    /// Panics if the name is already bound to a different type.
    pub fn add_type(&mut self, descriptor: TypeDescriptor) -> TypeKey {
        let key = descriptor.key();
        if let Some(entry) = self.entries.get_mut(&key) {
            entry.refcount += 1;
            log::trace!(
                "[reflect] add_type `{}` refcount={}",
                entry.descriptor.name(),
                entry.refcount
            );
            return key;
        }
        self.check_name(key, descriptor.name());
        log::debug!(
            "[reflect] add_type `{}` ({})",
            descriptor.name(),
            descriptor.kind().label()
        );
        self.entries.insert(
            key,
            Entry {
                descriptor,
                refcount: 1,
                initialized: false,
                immortal: false,
            },
        );
        self.pending.push(key);
        key
    }

    fn check_name(&self, key: TypeKey, name: &str) {
        if name.is_empty() {
            return;
        }
        let indexed = self.by_name.get(name).copied();
        let pending = self.pending.iter().copied().find(|other| {
            self.entries
                .get(other)
                .is_some_and(|entry| entry.descriptor.name() == name)
        });
        for other in indexed.into_iter().chain(pending) {
            assert!(
                other == key,
                "type name `{}` is already bound to another type",
                name
            );
        }
    }

    /// Add `descriptor` and, on first sight, every type it depends on.
    pub(crate) fn add_with_dependencies(&mut self, descriptor: TypeDescriptor) -> TypeKey {
        let key = descriptor.key();
        if self.entries.contains_key(&key) {
            return self.add_type(descriptor);
        }
        let dependencies = descriptor.dependencies().to_vec();
        self.add_type(descriptor);
        for registrar in dependencies {
            registrar(self);
        }
        key
    }

    /// Insert `T` once, without counting a registration.
    pub(crate) fn ensure<T: TypeInfo>(&mut self) {
        if !self.contains(TypeKey::of::<T>()) {
            self.add_with_dependencies(T::type_descriptor());
        }
    }

    /// Register `T` and its dependencies, then initialize new types.
    ///
    /// Dependencies pulled in implicitly are inserted once and are not
    /// refcounted by the types that refer to them.
    pub fn register<T: TypeInfo>(&mut self) -> TypeKey {
        let key = TypeKey::of::<T>();
        match self.entries.get_mut(&key) {
            Some(entry) => entry.refcount += 1,
            None => {
                self.add_with_dependencies(T::type_descriptor());
            }
        }
        self.init_new_types();
        key
    }

    /// Drop one registration of `T`.
    pub fn unregister<T: TypeInfo>(&mut self) -> bool {
        self.remove_type(TypeKey::of::<T>())
    }

    /// Drop one registration of `key`. Returns `true` when this was the
    /// last one and the descriptor was torn down.
    ///
    /// Classes still deriving from a removed class stay registered, but their
    /// inherited members are no longer visited until the base is registered
    /// again.
    ///
    /// # Panics
    ///
    /// Panics if `key` is not registered or names a built-in type.
    pub fn remove_type(&mut self, key: TypeKey) -> bool {
        let entry = self
            .entries
            .get_mut(&key)
            .unwrap_or_else(|| panic!("removing unregistered type {:?}", key));
        assert!(
            !entry.immortal,
            "cannot remove built-in type `{}`",
            entry.descriptor.name()
        );
        entry.refcount -= 1;
        if entry.refcount > 0 {
            return false;
        }

        let Some(entry) = self.entries.remove(&key) else {
            return false;
        };
        let name = entry.descriptor.name();
        if self.by_name.get(name) == Some(&key) {
            self.by_name.remove(name);
        }
        self.pending.retain(|pending| *pending != key);

        if let Some(class) = entry.descriptor.as_class() {
            for link in class.parents() {
                if let Some(parent) = self
                    .entries
                    .get_mut(&link.key())
                    .and_then(|parent| parent.descriptor.as_class_mut())
                {
                    parent.remove_child(key);
                }
            }
            for child in class.children() {
                log::warn!(
                    "[reflect] `{}` removed while child `{}` is registered, inherited members are dropped",
                    name,
                    self.name_of(child)
                );
            }
        }
        log::debug!("[reflect] remove_type `{}`", name);
        true
    }

    /// Initialize every pending type whose parents and subtypes are known.
    ///
    /// Returns how many types were initialized. Types still missing a
    /// parent or subtype stay pending for the next call.
    ///
    /// # Panics
    ///
    /// Panics if a derived name collides with a different type, or if a
    /// parent link names a type that is not a class.
    pub fn init_new_types(&mut self) -> usize {
        let mut initialized = 0;
        loop {
            let pending = std::mem::take(&mut self.pending);
            let before = pending.len();
            for key in pending {
                if self.try_init(key) {
                    initialized += 1;
                } else {
                    self.pending.push(key);
                }
            }
            if self.pending.is_empty() || self.pending.len() == before {
                break;
            }
        }
        for key in &self.pending {
            log::debug!("[reflect] `{}` still pending", self.name_of(*key));
        }
        initialized
    }

    fn try_init(&mut self, key: TypeKey) -> bool {
        let Some(entry) = self.entries.get(&key) else {
            return false;
        };
        let derived = match self.derived_name(entry.descriptor.kind()) {
            Ok(derived) => derived,
            Err(missing) => {
                log::trace!(
                    "[reflect] `{}` waits for {:?}",
                    entry.descriptor.name(),
                    missing
                );
                return false;
            }
        };
        if let Some(name) = &derived {
            self.check_name(key, name);
        }

        let parents: Vec<TypeKey> = entry
            .descriptor
            .as_class()
            .map(|class| class.parents().iter().map(|link| link.key()).collect())
            .unwrap_or_default();
        let children: Vec<TypeKey> = if entry.descriptor.is_class() {
            self.registered_children(key)
        } else {
            Vec::new()
        };

        for parent in &parents {
            let parent_entry = self
                .entries
                .get_mut(parent)
                .and_then(|parent| parent.descriptor.as_class_mut());
            let Some(parent_class) = parent_entry else {
                panic!("parent {:?} of {:?} is not a class", parent, key);
            };
            assert!(
                parent_class.add_child(key),
                "class {:?} is already linked as a child of {:?}",
                key,
                parent
            );
        }

        let Some(entry) = self.entries.get_mut(&key) else {
            return false;
        };
        if let Some(name) = derived {
            entry.descriptor.set_name(name);
        }
        if let Some(class) = entry.descriptor.as_class_mut() {
            for child in children {
                class.add_child(child);
            }
        }
        entry.initialized = true;
        let name = entry.descriptor.name().to_owned();
        log::trace!("[reflect] initialized `{}`", name);
        if !name.is_empty() {
            self.by_name.insert(name, key);
        }
        true
    }

    /// Initialized classes that list `key` as a parent, re-linked when a
    /// removed base is registered again.
    fn registered_children(&self, key: TypeKey) -> Vec<TypeKey> {
        self.entries
            .iter()
            .filter(|(_, entry)| entry.initialized)
            .filter(|(_, entry)| {
                entry
                    .descriptor
                    .as_class()
                    .is_some_and(|class| class.parents().iter().any(|link| link.key() == key))
            })
            .map(|(child, _)| *child)
            .collect()
    }

    /// Display name a type receives at init. `Err` carries a missing key.
    fn derived_name(&self, kind: &TypeKind) -> Result<Option<String>, TypeKey> {
        match kind {
            TypeKind::Class(class) => {
                if let Some(link) = class
                    .parents()
                    .iter()
                    .find(|link| !self.entries.contains_key(&link.key()))
                {
                    return Err(link.key());
                }
                Ok(None)
            }
            TypeKind::Pointer(pointer) => {
                let pointee = self.ready_name(pointer.pointee())?;
                Ok(Some(pointer.flavor().display_name(pointee)))
            }
            TypeKind::Sequence(seq) => {
                Ok(Some(format!("Vec<{}>", self.ready_name(seq.element())?)))
            }
            TypeKind::FixedArray(array) => Ok(Some(format!(
                "[{}; {}]",
                self.ready_name(array.element())?,
                array.count()
            ))),
            TypeKind::Function(function) => {
                let params = function
                    .params()
                    .iter()
                    .map(|param| self.ready_name(*param))
                    .collect::<Result<Vec<_>, _>>()?;
                let ret = self.ready_name(function.ret())?;
                Ok(Some(FunctionDescriptor::display_name(&params, ret)))
            }
            TypeKind::Primitive(_) | TypeKind::String | TypeKind::Enum(_) => Ok(None),
        }
    }

    fn ready_name(&self, key: TypeKey) -> Result<&str, TypeKey> {
        match self.entries.get(&key) {
            Some(entry) if entry.initialized => Ok(entry.descriptor.name()),
            _ => Err(key),
        }
    }

    pub fn find_by_id(&self, key: TypeKey) -> Option<&TypeDescriptor> {
        self.entries.get(&key).map(|entry| &entry.descriptor)
    }

    /// Lookup among initialized types.
    pub fn find_by_name(&self, name: &str) -> Option<&TypeDescriptor> {
        self.by_name
            .get(name)
            .and_then(|key| self.find_by_id(*key))
    }

    pub fn class(&self, key: TypeKey) -> Option<&ClassDescriptor> {
        self.find_by_id(key)?.as_class()
    }

    /// Descriptor of the runtime type of `value`.
    pub fn describe(&self, value: &dyn Reflect) -> Option<&TypeDescriptor> {
        self.find_by_id(value.type_key())
    }

    /// Name of `key`, or a placeholder when it is not registered.
    pub fn name_of(&self, key: TypeKey) -> &str {
        self.find_by_id(key)
            .map_or(UNREGISTERED, TypeDescriptor::name)
    }

    pub fn contains(&self, key: TypeKey) -> bool {
        self.entries.contains_key(&key)
    }

    pub fn is_initialized(&self, key: TypeKey) -> bool {
        self.entries.get(&key).is_some_and(|entry| entry.initialized)
    }

    /// Registration count, 0 when absent.
    pub fn refcount(&self, key: TypeKey) -> usize {
        self.entries.get(&key).map_or(0, |entry| entry.refcount)
    }

    /// Every registered descriptor, in no particular order.
    pub fn types(&self) -> impl Iterator<Item = &TypeDescriptor> {
        self.entries.values().map(|entry| &entry.descriptor)
    }

    /// Names of the types still waiting for a parent or subtype.
    pub fn unresolved(&self) -> Vec<String> {
        self.pending
            .iter()
            .map(|key| self.name_of(*key).to_owned())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// View `value` as its base class `B` by following parent offsets.
    pub fn upcast_ref<'v, B: Reflect>(&self, value: &'v dyn Reflect) -> Option<&'v B> {
        if let Some(exact) = value.downcast_ref::<B>() {
            return Some(exact);
        }
        let offset = self
            .class(value.type_key())?
            .ancestor_offset(self, TypeKey::of::<B>())?;
        let base = (value as *const dyn Reflect).cast::<u8>();
        // SAFETY: parent offsets come from offset_of! on the runtime class,
        // so a `B` sub-object lives at `offset` for as long as `value`.
        Some(unsafe { &*base.add(offset).cast::<B>() })
    }

    pub fn upcast_mut<'v, B: Reflect>(&self, value: &'v mut dyn Reflect) -> Option<&'v mut B> {
        let offset = if value.is::<B>() {
            0
        } else {
            self.class(value.type_key())?
                .ancestor_offset(self, TypeKey::of::<B>())?
        };
        let base = (value as *mut dyn Reflect).cast::<u8>();
        // SAFETY: as in `upcast_ref`; the borrow of `value` is unique.
        Some(unsafe { &mut *base.add(offset).cast::<B>() })
    }
}

impl fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeRegistry")
            .field("types", &self.entries.len())
            .field("pending", &self.pending.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ClassBuilder, PointerFlavor};
    use crate::{reflect_member, reflect_parent};

    #[derive(Default)]
    struct Base {
        id: u32,
    }

    #[derive(Default)]
    struct Derived {
        base: Base,
        label: String,
    }

    #[derive(Default)]
    struct Node {
        value: i32,
        children: Vec<Node>,
        next: Option<Box<Node>>,
    }

    impl TypeInfo for Base {
        fn type_descriptor() -> TypeDescriptor {
            ClassBuilder::<Base>::new("Base")
                .member(reflect_member!(Base, id))
                .with_factory()
                .build()
        }
    }

    impl TypeInfo for Derived {
        fn type_descriptor() -> TypeDescriptor {
            ClassBuilder::<Derived>::new("Derived")
                .parent(reflect_parent!(Derived, base))
                .member(reflect_member!(Derived, label))
                .with_factory()
                .build()
        }
    }

    impl TypeInfo for Node {
        fn type_descriptor() -> TypeDescriptor {
            ClassBuilder::<Node>::new("Node")
                .member(reflect_member!(Node, value))
                .member(reflect_member!(Node, children))
                .member(reflect_member!(Node, next, "owned"))
                .with_factory()
                .build()
        }
    }

    #[test]
    fn test_builtins_are_present() {
        let registry = TypeRegistry::new();
        for name in ["bool", "char", "i8", "u64", "f32", "f64", "()", "String"] {
            let desc = registry.find_by_name(name).expect(name);
            assert!(registry.is_initialized(desc.key()));
        }
        assert_eq!(registry.find_by_id(TypeKey::of::<i16>()).map(TypeDescriptor::name), Some("i16"));
        assert!(registry.find_by_name("Base").is_none());
    }

    #[test]
    #[should_panic(expected = "cannot remove built-in type `i32`")]
    fn test_builtins_are_immortal() {
        let mut registry = TypeRegistry::new();
        registry.remove_type(TypeKey::of::<i32>());
    }

    #[test]
    #[should_panic(expected = "removing unregistered type")]
    fn test_remove_unknown_panics() {
        let mut registry = TypeRegistry::new();
        registry.remove_type(TypeKey::of::<Base>());
    }

    #[test]
    fn test_register_pulls_dependencies() {
        let mut registry = TypeRegistry::new();
        registry.register::<Derived>();
        assert!(registry.contains(TypeKey::of::<Base>()));
        assert_eq!(registry.refcount(TypeKey::of::<Derived>()), 1);

        let base = registry.class(TypeKey::of::<Base>()).expect("base");
        let children: Vec<_> = base.children().collect();
        assert_eq!(children, vec![TypeKey::of::<Derived>()]);
        assert!(registry.unresolved().is_empty());
    }

    #[test]
    fn test_recursive_type_and_derived_names() {
        let mut registry = TypeRegistry::new();
        registry.register::<Node>();
        assert!(registry.find_by_name("Vec<Node>").is_some());
        let pointer = registry.find_by_name("Option<Box<Node>>").expect("pointer");
        match pointer.kind() {
            TypeKind::Pointer(desc) => {
                assert_eq!(desc.flavor(), PointerFlavor::Boxed);
                assert_eq!(desc.pointee(), TypeKey::of::<Node>());
                assert!(desc.is_owning());
            }
            other => panic!("unexpected kind {:?}", other),
        }
        assert_eq!(registry.refcount(TypeKey::of::<Node>()), 1);
    }

    #[test]
    fn test_derived_names_for_arrays_and_functions() {
        let mut registry = TypeRegistry::new();
        registry.register::<[u8; 4]>();
        registry.register::<fn(i32, String) -> bool>();
        registry.register::<fn()>();
        registry.register::<*const Base>();
        assert!(registry.find_by_name("[u8; 4]").is_some());
        assert!(registry.find_by_name("fn(i32, String) -> bool").is_some());
        assert!(registry.find_by_name("fn()").is_some());
        assert!(registry.find_by_name("*const Base").is_some());
    }

    #[test]
    fn test_parent_registered_after_child() {
        let mut registry = TypeRegistry::new();
        registry.add_type(Derived::type_descriptor());
        assert_eq!(registry.init_new_types(), 0);
        assert!(registry.find_by_name("Derived").is_none());
        assert_eq!(registry.unresolved(), vec!["Derived".to_owned()]);

        registry.add_type(Base::type_descriptor());
        assert_eq!(registry.init_new_types(), 2);
        assert!(registry.find_by_name("Derived").is_some());
        let derived = registry.class(TypeKey::of::<Derived>()).expect("class");
        assert!(derived.is_child_of(&registry, TypeKey::of::<Base>(), false));

        // A second pass has nothing left to do.
        assert_eq!(registry.init_new_types(), 0);
    }

    #[test]
    fn test_refcount_collapses_duplicates() {
        let mut registry = TypeRegistry::new();
        let key = registry.add_type(Base::type_descriptor());
        registry.add_type(Base::type_descriptor());
        registry.init_new_types();
        assert_eq!(registry.refcount(key), 2);

        assert!(!registry.remove_type(key));
        assert!(registry.find_by_name("Base").is_some());
        assert!(registry.remove_type(key));
        assert!(registry.find_by_name("Base").is_none());
        assert!(registry.find_by_id(key).is_none());
    }

    #[test]
    fn test_removal_unlinks_and_relinks_children() {
        let mut registry = TypeRegistry::new();
        registry.register::<Derived>();
        registry.remove_type(TypeKey::of::<Base>());
        assert!(registry.find_by_name("Base").is_none());

        registry.register::<Base>();
        let base = registry.class(TypeKey::of::<Base>()).expect("base");
        assert_eq!(base.children().count(), 1);
    }

    #[test]
    #[should_panic(expected = "already bound to another type")]
    fn test_name_collision_panics() {
        struct Impostor;
        impl TypeInfo for Impostor {
            fn type_descriptor() -> TypeDescriptor {
                ClassBuilder::<Impostor>::new("Base").build()
            }
        }

        let mut registry = TypeRegistry::new();
        registry.register::<Base>();
        registry.register::<Impostor>();
    }

    #[test]
    fn test_upcast_through_parent_offset() {
        let mut registry = TypeRegistry::new();
        registry.register::<Derived>();

        let mut derived = Derived {
            base: Base { id: 11 },
            label: "x".into(),
        };
        let value: &dyn Reflect = &derived;
        assert_eq!(registry.upcast_ref::<Base>(value).map(|b| b.id), Some(11));
        assert!(registry.upcast_ref::<Node>(value).is_none());
        assert_eq!(registry.describe(value).map(TypeDescriptor::name), Some("Derived"));

        let value: &mut dyn Reflect = &mut derived;
        registry.upcast_mut::<Base>(value).expect("base").id = 12;
        assert_eq!(derived.base.id, 12);
        assert_eq!(derived.label, "x");
    }
}
