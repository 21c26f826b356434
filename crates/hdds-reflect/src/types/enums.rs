// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Enum descriptors.
//!
//! Enums travel by symbolic name. The backing integer width comes from the
//! enum's size (1, 2, 4 or 8 bytes); values are compared after truncation
//! to that width so `#[repr(u8)]` discriminants above 127 match the sign
//! extended integer loaded from memory.

use super::{default_factory, Factory, TypeDescriptor, TypeKind};
use crate::reflect::Reflect;
use std::collections::HashMap;
use std::marker::PhantomData;

/// One declared enumerator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumValue {
    name: String,
    value: i64,
}

impl EnumValue {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> i64 {
        self.value
    }
}

/// Ordered enumerators with a name index.
#[derive(Debug, Clone)]
pub struct EnumDescriptor {
    values: Vec<EnumValue>,
    by_name: HashMap<String, usize>,
    width: usize,
}

impl EnumDescriptor {
    fn new(width: usize) -> Self {
        Self {
            values: Vec::new(),
            by_name: HashMap::new(),
            width,
        }
    }

    pub fn values(&self) -> &[EnumValue] {
        &self.values
    }

    /// Backing integer width in bytes.
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn value_of(&self, name: &str) -> Option<i64> {
        self.by_name.get(name).map(|&index| self.values[index].value)
    }

    /// First enumerator whose value matches `value` at the backing width.
    pub fn name_of(&self, value: i64) -> Option<&str> {
        let wanted = self.truncate(value);
        self.values
            .iter()
            .find(|entry| self.truncate(entry.value) == wanted)
            .map(|entry| entry.name.as_str())
    }

    fn truncate(&self, value: i64) -> u64 {
        if self.width >= 8 {
            value as u64
        } else {
            (value as u64) & ((1u64 << (self.width * 8)) - 1)
        }
    }

    /// Load the backing integer, sign-extended.
    ///
    /// # Safety
    ///
    /// `ptr` must point to `width` readable bytes.
    pub(crate) unsafe fn load(&self, ptr: *const u8) -> i64 {
        match self.width {
            1 => i64::from(ptr.cast::<i8>().read_unaligned()),
            2 => i64::from(ptr.cast::<i16>().read_unaligned()),
            4 => i64::from(ptr.cast::<i32>().read_unaligned()),
            _ => ptr.cast::<i64>().read_unaligned(),
        }
    }

    /// Store `value` at the backing width.
    ///
    /// # Safety
    ///
    /// `ptr` must point to `width` writable bytes and `value` must be one of
    /// the declared enumerators.
    pub(crate) unsafe fn store(&self, ptr: *mut u8, value: i64) {
        match self.width {
            1 => ptr.cast::<i8>().write_unaligned(value as i8),
            2 => ptr.cast::<i16>().write_unaligned(value as i16),
            4 => ptr.cast::<i32>().write_unaligned(value as i32),
            _ => ptr.cast::<i64>().write_unaligned(value),
        }
    }
}

/// Builds the descriptor of enum `T`.
///
/// Prefer [`reflect_enum!`](crate::reflect_enum), which checks the width at
/// compile time and reads the values from the variants.
pub struct EnumBuilder<T> {
    name: String,
    desc: EnumDescriptor,
    factory: Option<Factory>,
    _enum: PhantomData<fn() -> T>,
}

impl<T: Reflect> EnumBuilder<T> {
    /// # Safety
    ///
    /// `T` must be a field-less enum whose discriminant fills all of
    /// `size_of::<T>()` bytes, and every value later passed to
    /// [`value`](Self::value) must be a discriminant of `T`.
    ///
    /// # Panics
    ///
    /// Panics if `size_of::<T>()` is not 1, 2, 4 or 8.
    pub unsafe fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let width = std::mem::size_of::<T>();
        assert!(
            matches!(width, 1 | 2 | 4 | 8),
            "enum `{}` has unsupported width {}",
            name,
            width
        );
        Self {
            name,
            desc: EnumDescriptor::new(width),
            factory: None,
            _enum: PhantomData,
        }
    }

    /// # Panics
    ///
    /// Panics on a duplicate enumerator name.
    #[must_use]
    pub fn value(mut self, name: impl Into<String>, value: i64) -> Self {
        let name = name.into();
        assert!(
            !self.desc.by_name.contains_key(&name),
            "duplicate enumerator `{}` in `{}`",
            name,
            self.name
        );
        self.desc
            .by_name
            .insert(name.clone(), self.desc.values.len());
        self.desc.values.push(EnumValue { name, value });
        self
    }

    pub fn build(self) -> TypeDescriptor {
        let desc = TypeDescriptor::for_type::<T>(self.name, TypeKind::Enum(self.desc));
        match self.factory {
            Some(factory) => desc.with_factory(factory),
            None => desc,
        }
    }
}

impl<T: Reflect + Default> EnumBuilder<T> {
    #[must_use]
    pub fn with_factory(mut self) -> Self {
        self.factory = Some(default_factory::<T>);
        self
    }
}

/// Describe a field-less enum by listing its variants.
///
/// ```
/// use hdds_reflect::{reflect_enum, TypeDescriptor, TypeInfo};
///
/// #[repr(i32)]
/// enum Color {
///     Red = 1,
///     Green = 2,
/// }
///
/// impl TypeInfo for Color {
///     fn type_descriptor() -> TypeDescriptor {
///         reflect_enum!(Color as i32 { Red, Green })
///     }
/// }
/// ```
#[macro_export]
macro_rules! reflect_enum {
    ($enum:ident as $repr:ty { $($variant:ident),+ $(,)? }) => {{
        const _: () = ::core::assert!(
            ::core::mem::size_of::<$enum>() == ::core::mem::size_of::<$repr>(),
            "enum size differs from its repr"
        );
        // SAFETY: sizes match and every value is a discriminant of the enum.
        unsafe { $crate::types::EnumBuilder::<$enum>::new(::core::stringify!($enum)) }
            $(.value(::core::stringify!($variant), $enum::$variant as $repr as i64))+
            .build()
    }};
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TypeInfo;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    #[repr(u8)]
    enum Level {
        #[default]
        Low = 1,
        High = 200,
    }

    impl TypeInfo for Level {
        fn type_descriptor() -> TypeDescriptor {
            reflect_enum!(Level as u8 { Low, High })
        }
    }

    #[test]
    fn test_lookup_both_directions() {
        let desc = Level::type_descriptor();
        let enumeration = desc.as_enum().expect("enum");
        assert_eq!(enumeration.width(), 1);
        assert_eq!(enumeration.value_of("High"), Some(200));
        assert_eq!(enumeration.value_of("Medium"), None);
        assert_eq!(enumeration.name_of(1), Some("Low"));
        assert_eq!(enumeration.name_of(3), None);
    }

    #[test]
    fn test_load_store_truncates_to_width() {
        let desc = Level::type_descriptor();
        let enumeration = desc.as_enum().expect("enum");
        let mut level = Level::Low;
        let ptr = std::ptr::addr_of_mut!(level).cast::<u8>();
        // SAFETY: Level is one byte and 200 is a declared discriminant.
        unsafe {
            let loaded = enumeration.load(ptr);
            assert_eq!(enumeration.name_of(loaded), Some("Low"));
            enumeration.store(ptr, 200);
            // Sign-extended load still maps back to the declared value.
            assert_eq!(enumeration.load(ptr), -56);
            assert_eq!(enumeration.name_of(enumeration.load(ptr)), Some("High"));
        }
        assert_eq!(level, Level::High);
    }

    #[test]
    #[should_panic(expected = "duplicate enumerator `Low`")]
    fn test_duplicate_enumerator_panics() {
        // SAFETY: only descriptor construction, no memory access.
        let _ = unsafe { EnumBuilder::<Level>::new("Level") }
            .value("Low", 1)
            .value("Low", 2);
    }

    #[test]
    #[should_panic(expected = "unsupported width")]
    fn test_bad_width_panics() {
        // SAFETY: panics before any descriptor is produced.
        let _ = unsafe { EnumBuilder::<[u8; 3]>::new("Odd") };
    }
}
