// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Class descriptors: members, parents and derived children.
//!
//! A class is a struct whose fields are addressed by byte offset. Bases are
//! modelled as embedded fields: a [`ParentLink`] records the base class and
//! where its sub-object starts inside the child, so inherited members are
//! found at `link.offset + member.offset`.
//!
//! Offsets are only produced by [`reflect_member!`](crate::reflect_member)
//! and [`reflect_parent!`](crate::reflect_parent), which pair
//! `core::mem::offset_of!` with a typed field accessor, or by the `unsafe`
//! raw constructors.

use super::{default_factory, ensure_dependency, Factory, MetaDataSet, Registrar, TypeDescriptor};
use super::{TypeInfo, TypeKey, TypeKind};
use crate::reflect::Reflect;
use crate::registry::TypeRegistry;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::marker::PhantomData;

/// One data member of a class.
#[derive(Debug, Clone)]
pub struct MemberDescriptor {
    name: String,
    offset: usize,
    type_key: TypeKey,
    owner: Option<TypeKey>,
    metadata: MetaDataSet,
}

impl MemberDescriptor {
    /// Build a member from raw parts.
    ///
    /// # Safety
    ///
    /// `offset` must be the offset of a field whose type is `type_key`
    /// inside every class this member is added to.
    pub unsafe fn new_unchecked(
        name: impl Into<String>,
        offset: usize,
        type_key: TypeKey,
        metadata: MetaDataSet,
    ) -> Self {
        Self {
            name: name.into(),
            offset,
            type_key,
            owner: None,
            metadata,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Offset inside the declaring class.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Member type, resolved through the registry.
    pub fn type_key(&self) -> TypeKey {
        self.type_key
    }

    /// Declaring class. Set when the member is added to a class.
    pub fn owner(&self) -> Option<TypeKey> {
        self.owner
    }

    pub fn metadata(&self) -> &MetaDataSet {
        &self.metadata
    }
}

/// A member checked against the layout of class `S`.
///
/// Produced by [`reflect_member!`](crate::reflect_member).
pub struct FieldSpec<S> {
    member: MemberDescriptor,
    registrar: Registrar,
    _class: PhantomData<fn(&S)>,
}

impl<S: 'static> FieldSpec<S> {
    #[doc(hidden)]
    /// # Safety
    ///
    /// `offset` must be the offset of the field `accessor` returns.
    pub unsafe fn from_accessor<F: TypeInfo>(
        name: &str,
        offset: usize,
        _accessor: fn(&S) -> &F,
        metadata: &str,
    ) -> Self {
        Self {
            member: MemberDescriptor::new_unchecked(
                name,
                offset,
                TypeKey::of::<F>(),
                MetaDataSet::parse(metadata),
            ),
            registrar: ensure_dependency::<F>,
            _class: PhantomData,
        }
    }

    pub fn name(&self) -> &str {
        self.member.name()
    }
}

/// Link from a child class to one of its bases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParentLink {
    key: TypeKey,
    offset: usize,
}

impl ParentLink {
    /// # Safety
    ///
    /// An instance of the base class `key` must live at `offset` inside
    /// every class this link is added to.
    pub unsafe fn new_unchecked(key: TypeKey, offset: usize) -> Self {
        Self { key, offset }
    }

    pub fn key(&self) -> TypeKey {
        self.key
    }

    /// Offset of the base sub-object inside the child.
    pub fn offset(&self) -> usize {
        self.offset
    }
}

/// A base class checked against the layout of class `S`.
///
/// Produced by [`reflect_parent!`](crate::reflect_parent).
pub struct ParentSpec<S> {
    link: ParentLink,
    registrar: Registrar,
    _class: PhantomData<fn(&S)>,
}

impl<S: 'static> ParentSpec<S> {
    #[doc(hidden)]
    /// # Safety
    ///
    /// `offset` must be the offset of the field `accessor` returns.
    pub unsafe fn from_accessor<P: TypeInfo>(offset: usize, _accessor: fn(&S) -> &P) -> Self {
        Self {
            link: ParentLink::new_unchecked(TypeKey::of::<P>(), offset),
            registrar: ensure_dependency::<P>,
            _class: PhantomData,
        }
    }
}

/// A member reached from some class, with its offset in that class.
#[derive(Debug, Clone, Copy)]
pub struct MemberRef<'a> {
    pub member: &'a MemberDescriptor,
    /// Offset from the start of the queried instance.
    pub offset: usize,
}

/// Structural description of a class.
#[derive(Debug)]
pub struct ClassDescriptor {
    key: TypeKey,
    members: Vec<MemberDescriptor>,
    members_by_name: HashMap<String, usize>,
    parents: Vec<ParentLink>,
    children: BTreeSet<TypeKey>,
    metadata: MetaDataSet,
}

impl ClassDescriptor {
    pub(crate) fn new(key: TypeKey) -> Self {
        Self {
            key,
            members: Vec::new(),
            members_by_name: HashMap::new(),
            parents: Vec::new(),
            children: BTreeSet::new(),
            metadata: MetaDataSet::new(),
        }
    }

    pub fn key(&self) -> TypeKey {
        self.key
    }

    /// Append a member. Insertion order is serialization order.
    ///
    /// # Panics
    ///
    /// Panics if the class already has a member with this name.
    pub(crate) fn add_member(&mut self, mut member: MemberDescriptor) {
        assert!(
            !self.members_by_name.contains_key(&member.name),
            "duplicate member `{}`",
            member.name
        );
        member.owner = Some(self.key);
        self.members_by_name
            .insert(member.name.clone(), self.members.len());
        self.members.push(member);
    }

    /// # Panics
    ///
    /// Panics if `link` names a base that is already a parent.
    pub(crate) fn add_parent(&mut self, link: ParentLink) {
        assert!(
            self.parents.iter().all(|parent| parent.key != link.key),
            "duplicate parent {:?}",
            link.key
        );
        self.parents.push(link);
    }

    pub(crate) fn add_child(&mut self, child: TypeKey) -> bool {
        self.children.insert(child)
    }

    pub(crate) fn remove_child(&mut self, child: TypeKey) -> bool {
        self.children.remove(&child)
    }

    pub(crate) fn set_metadata(&mut self, metadata: MetaDataSet) {
        self.metadata = metadata;
    }

    /// Members declared by this class, without inherited ones.
    pub fn own_members(&self) -> &[MemberDescriptor] {
        &self.members
    }

    pub fn parents(&self) -> &[ParentLink] {
        &self.parents
    }

    /// Registered classes naming this one as a parent.
    pub fn children(&self) -> impl Iterator<Item = TypeKey> + '_ {
        self.children.iter().copied()
    }

    /// Class-level annotations.
    pub fn metadata(&self) -> &MetaDataSet {
        &self.metadata
    }

    /// Own members first, then every parent's members depth-first in
    /// declaration order. A base reached through several paths is listed
    /// once, through the first path.
    ///
    /// This ordering is the order entries are written in.
    pub fn members<'a>(
        &'a self,
        registry: &'a TypeRegistry,
        include_inherited: bool,
    ) -> Vec<MemberRef<'a>> {
        let mut out = Vec::with_capacity(self.members.len());
        let mut visited = HashSet::from([self.key]);
        self.collect_members(registry, 0, include_inherited, &mut visited, &mut out);
        out
    }

    fn collect_members<'a>(
        &'a self,
        registry: &'a TypeRegistry,
        base: usize,
        include_inherited: bool,
        visited: &mut HashSet<TypeKey>,
        out: &mut Vec<MemberRef<'a>>,
    ) {
        out.extend(self.members.iter().map(|member| MemberRef {
            member,
            offset: base + member.offset,
        }));
        if !include_inherited {
            return;
        }
        for link in &self.parents {
            if !visited.insert(link.key) {
                continue;
            }
            match registry.class(link.key) {
                Some(parent) => {
                    parent.collect_members(registry, base + link.offset, true, visited, out);
                }
                None => log::debug!("[reflect] parent {:?} not registered, skipped", link.key),
            }
        }
    }

    /// Look a member up by name, local members first.
    pub fn find_member_by_name<'a>(
        &'a self,
        registry: &'a TypeRegistry,
        name: &str,
        include_inherited: bool,
    ) -> Option<MemberRef<'a>> {
        if let Some(&index) = self.members_by_name.get(name) {
            let member = &self.members[index];
            return Some(MemberRef {
                member,
                offset: member.offset,
            });
        }
        if !include_inherited {
            return None;
        }
        self.parents.iter().find_map(|link| {
            let found = registry
                .class(link.key)?
                .find_member_by_name(registry, name, true)?;
            Some(MemberRef {
                member: found.member,
                offset: link.offset + found.offset,
            })
        })
    }

    /// `true` if `ancestor` is reachable through the parent links, or is
    /// this class itself and `check_self` is set.
    pub fn is_child_of(&self, registry: &TypeRegistry, ancestor: TypeKey, check_self: bool) -> bool {
        if check_self && self.key == ancestor {
            return true;
        }
        let mut visited = HashSet::new();
        let mut stack: Vec<TypeKey> = self.parents.iter().rev().map(|link| link.key).collect();
        while let Some(key) = stack.pop() {
            if key == ancestor {
                return true;
            }
            if !visited.insert(key) {
                continue;
            }
            if let Some(parent) = registry.class(key) {
                stack.extend(parent.parents.iter().rev().map(|link| link.key));
            }
        }
        false
    }

    /// Offset of the `ancestor` sub-object inside an instance of this class.
    pub fn ancestor_offset(&self, registry: &TypeRegistry, ancestor: TypeKey) -> Option<usize> {
        if self.key == ancestor {
            return Some(0);
        }
        self.parents.iter().find_map(|link| {
            let parent = registry.class(link.key)?;
            Some(link.offset + parent.ancestor_offset(registry, ancestor)?)
        })
    }

    /// Most-derived class of `object`, an instance reached through a
    /// pointer declared as this class.
    ///
    /// # Panics
    ///
    /// Panics if the runtime type is not a registered class deriving from
    /// this one.
    pub fn runtime_class<'a>(
        &self,
        registry: &'a TypeRegistry,
        object: &dyn Reflect,
    ) -> &'a TypeDescriptor {
        let key = object.type_key();
        let declared = registry.name_of(self.key);
        let desc = registry.find_by_id(key).unwrap_or_else(|| {
            panic!("runtime type of a `{declared}` pointee is not registered")
        });
        let class = desc
            .as_class()
            .unwrap_or_else(|| panic!("runtime type `{}` is not a class", desc.name()));
        assert!(
            class.is_child_of(registry, self.key, true),
            "`{}` does not derive from `{}`",
            desc.name(),
            declared
        );
        desc
    }
}

/// Builds the descriptor of class `T`.
///
/// ```
/// use hdds_reflect::{reflect_member, ClassBuilder, TypeDescriptor, TypeInfo};
///
/// #[derive(Default)]
/// struct Point {
///     x: i32,
///     y: i32,
/// }
///
/// impl TypeInfo for Point {
///     fn type_descriptor() -> TypeDescriptor {
///         ClassBuilder::<Point>::new("Point")
///             .member(reflect_member!(Point, x))
///             .member(reflect_member!(Point, y))
///             .with_factory()
///             .build()
///     }
/// }
/// ```
pub struct ClassBuilder<T> {
    name: String,
    class: ClassDescriptor,
    factory: Option<Factory>,
    dependencies: Vec<Registrar>,
    _class: PhantomData<fn() -> T>,
}

impl<T: 'static> ClassBuilder<T> {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            class: ClassDescriptor::new(TypeKey::of::<T>()),
            factory: None,
            dependencies: Vec::new(),
            _class: PhantomData,
        }
    }

    /// # Panics
    ///
    /// Panics on a duplicate member name.
    #[must_use]
    pub fn member(mut self, spec: FieldSpec<T>) -> Self {
        self.class.add_member(spec.member);
        self.dependencies.push(spec.registrar);
        self
    }

    /// # Panics
    ///
    /// Panics if the base is already a parent.
    #[must_use]
    pub fn parent(mut self, spec: ParentSpec<T>) -> Self {
        self.class.add_parent(spec.link);
        self.dependencies.push(spec.registrar);
        self
    }

    /// Add a member built from raw parts. Unlike [`member`](Self::member),
    /// the member type is not registered as a dependency.
    ///
    /// # Safety
    ///
    /// See [`MemberDescriptor::new_unchecked`].
    #[must_use]
    pub unsafe fn raw_member(mut self, member: MemberDescriptor) -> Self {
        self.class.add_member(member);
        self
    }

    /// Add a base registered elsewhere, e.g. by another load unit. The
    /// class stays pending until that base is registered.
    ///
    /// # Safety
    ///
    /// See [`ParentLink::new_unchecked`].
    #[must_use]
    pub unsafe fn raw_parent(mut self, link: ParentLink) -> Self {
        self.class.add_parent(link);
        self
    }

    /// Class-level annotations in `key=value,...` form.
    #[must_use]
    pub fn metadata(mut self, text: &str) -> Self {
        self.class.set_metadata(MetaDataSet::parse(text));
        self
    }

    pub fn build(self) -> TypeDescriptor {
        let mut desc = TypeDescriptor::for_type::<T>(self.name, TypeKind::Class(self.class));
        if let Some(factory) = self.factory {
            desc = desc.with_factory(factory);
        }
        for registrar in self.dependencies {
            desc = desc.with_dependency(registrar);
        }
        desc
    }
}

impl<T: Reflect + Default> ClassBuilder<T> {
    /// Allow the class to be allocated as the pointee of an owned pointer.
    #[must_use]
    pub fn with_factory(mut self) -> Self {
        self.factory = Some(default_factory::<T>);
        self
    }
}

/// Describe a member of a class.
///
/// `reflect_member!(Class, field)` or `reflect_member!(Class, field, "owned")`
/// with member annotations.
#[macro_export]
macro_rules! reflect_member {
    ($class:ty, $field:ident) => {
        $crate::reflect_member!($class, $field, "")
    };
    ($class:ty, $field:ident, $metadata:expr) => {
        // SAFETY: the offset and the accessor name the same field.
        unsafe {
            $crate::types::FieldSpec::<$class>::from_accessor(
                ::core::stringify!($field),
                ::core::mem::offset_of!($class, $field),
                |object: &$class| &object.$field,
                $metadata,
            )
        }
    };
}

/// Describe a base class embedded as field `field`.
#[macro_export]
macro_rules! reflect_parent {
    ($class:ty, $field:ident) => {
        // SAFETY: the offset and the accessor name the same field.
        unsafe {
            $crate::types::ParentSpec::<$class>::from_accessor(
                ::core::mem::offset_of!($class, $field),
                |object: &$class| &object.$field,
            )
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Sample {
        a: u8,
        b: u64,
    }

    impl TypeInfo for Sample {
        fn type_descriptor() -> TypeDescriptor {
            ClassBuilder::<Sample>::new("Sample")
                .member(reflect_member!(Sample, a, "version=2"))
                .member(reflect_member!(Sample, b))
                .metadata("table=samples")
                .with_factory()
                .build()
        }
    }

    #[test]
    fn test_builder_records_layout() {
        let desc = Sample::type_descriptor();
        let class = desc.as_class().expect("class");
        let members = class.own_members();
        assert_eq!(members.len(), 2);
        assert_eq!(members[0].name(), "a");
        assert_eq!(members[0].offset(), std::mem::offset_of!(Sample, a));
        assert_eq!(members[1].offset(), std::mem::offset_of!(Sample, b));
        assert_eq!(members[1].type_key(), TypeKey::of::<u64>());
        assert_eq!(members[0].owner(), Some(TypeKey::of::<Sample>()));
        assert_eq!(
            members[0].metadata().get("version").and_then(|m| m.as_int()),
            Some(2)
        );
        assert_eq!(
            class.metadata().get("table").map(|m| m.as_str()),
            Some("samples")
        );
        assert!(desc.factory().is_some());
        assert_eq!(desc.dependencies().len(), 2);
    }

    #[test]
    #[should_panic(expected = "duplicate member `a`")]
    fn test_duplicate_member_panics() {
        let _ = ClassBuilder::<Sample>::new("Sample")
            .member(reflect_member!(Sample, a))
            .member(reflect_member!(Sample, a));
    }

    #[test]
    #[should_panic(expected = "duplicate parent")]
    fn test_duplicate_parent_panics() {
        let mut class = ClassDescriptor::new(TypeKey::of::<Sample>());
        // SAFETY: never used to access memory.
        let link = unsafe { ParentLink::new_unchecked(TypeKey::of::<u8>(), 0) };
        class.add_parent(link);
        class.add_parent(link);
    }
}
