// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Pointer descriptors.
//!
//! Owning flavors (`Option<Box<T>>`, [`Poly<B>`](crate::Poly)) carry
//! [`OwnershipOps`]: type-erased functions to inspect, clear and replace the
//! pointee. Raw pointers and `Option<NonNull<T>>` never own what they point
//! to and are never traversed.

use super::TypeKey;
use crate::reflect::{Poly, Reflect};
use std::fmt;

/// Rust shape of a pointer type, used to derive its display name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerFlavor {
    /// `Option<Box<T>>`
    Boxed,
    /// `Poly<B>`
    Poly,
    /// `*const T`
    Const,
    /// `*mut T`
    Mut,
    /// `Option<NonNull<T>>`
    NonNull,
}

impl PointerFlavor {
    pub(crate) fn display_name(self, pointee: &str) -> String {
        match self {
            Self::Boxed => format!("Option<Box<{pointee}>>"),
            Self::Poly => format!("Poly<{pointee}>"),
            Self::Const => format!("*const {pointee}"),
            Self::Mut => format!("*mut {pointee}"),
            Self::NonNull => format!("Option<NonNull<{pointee}>>"),
        }
    }
}

/// Type-erased access to the pointee of an owning pointer.
///
/// Every function takes the address of the pointer itself.
#[derive(Clone, Copy)]
pub struct OwnershipOps {
    pub(crate) pointee: unsafe fn(*const u8) -> Option<*const dyn Reflect>,
    pub(crate) clear: unsafe fn(*mut u8),
    pub(crate) install:
        unsafe fn(*mut u8, Box<dyn Reflect>) -> Result<*mut dyn Reflect, Box<dyn Reflect>>,
}

impl fmt::Debug for OwnershipOps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("OwnershipOps")
    }
}

impl OwnershipOps {
    pub(crate) fn boxed<T: Reflect>() -> Self {
        Self {
            pointee: boxed_pointee::<T>,
            clear: boxed_clear::<T>,
            install: boxed_install::<T>,
        }
    }

    pub(crate) fn poly<B: 'static>() -> Self {
        Self {
            pointee: poly_pointee::<B>,
            clear: poly_clear::<B>,
            install: poly_install::<B>,
        }
    }
}

unsafe fn boxed_pointee<T: Reflect>(ptr: *const u8) -> Option<*const dyn Reflect> {
    let slot = &*ptr.cast::<Option<Box<T>>>();
    slot.as_deref().map(|value| {
        let pointee: *const dyn Reflect = value;
        pointee
    })
}

unsafe fn boxed_clear<T: Reflect>(ptr: *mut u8) {
    *ptr.cast::<Option<Box<T>>>() = None;
}

unsafe fn boxed_install<T: Reflect>(
    ptr: *mut u8,
    value: Box<dyn Reflect>,
) -> Result<*mut dyn Reflect, Box<dyn Reflect>> {
    let value = value.downcast::<T>()?;
    let slot = &mut *ptr.cast::<Option<Box<T>>>();
    let installed: *mut dyn Reflect = &mut **slot.insert(value);
    Ok(installed)
}

unsafe fn poly_pointee<B: 'static>(ptr: *const u8) -> Option<*const dyn Reflect> {
    let slot = &*ptr.cast::<Poly<B>>();
    slot.as_reflect().map(|value| {
        let pointee: *const dyn Reflect = value;
        pointee
    })
}

unsafe fn poly_clear<B: 'static>(ptr: *mut u8) {
    (*ptr.cast::<Poly<B>>()).clear();
}

unsafe fn poly_install<B: 'static>(
    ptr: *mut u8,
    value: Box<dyn Reflect>,
) -> Result<*mut dyn Reflect, Box<dyn Reflect>> {
    let slot = &mut *ptr.cast::<Poly<B>>();
    let installed: *mut dyn Reflect = slot.replace(value);
    Ok(installed)
}

/// A pointer type and the type it points to.
#[derive(Debug, Clone, Copy)]
pub struct PointerDescriptor {
    pointee: TypeKey,
    flavor: PointerFlavor,
    ownership: Option<OwnershipOps>,
}

impl PointerDescriptor {
    pub(crate) fn new(pointee: TypeKey, flavor: PointerFlavor, ownership: Option<OwnershipOps>) -> Self {
        Self {
            pointee,
            flavor,
            ownership,
        }
    }

    /// Declared pointee type.
    pub fn pointee(&self) -> TypeKey {
        self.pointee
    }

    pub fn flavor(&self) -> PointerFlavor {
        self.flavor
    }

    /// `None` for pointers that cannot own their pointee.
    pub fn ownership(&self) -> Option<&OwnershipOps> {
        self.ownership.as_ref()
    }

    pub fn is_owning(&self) -> bool {
        self.ownership.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boxed_ops() {
        let ops = OwnershipOps::boxed::<i32>();
        let mut slot: Option<Box<i32>> = None;
        let ptr = std::ptr::addr_of_mut!(slot).cast::<u8>();
        // SAFETY: ptr addresses a live Option<Box<i32>>.
        unsafe {
            assert!((ops.pointee)(ptr).is_none());
            let installed = (ops.install)(ptr, Box::new(7i32)).expect("same type");
            *installed.cast::<i32>() = 9;
            let pointee = (ops.pointee)(ptr).expect("installed");
            assert_eq!((*pointee).downcast_ref::<i32>(), Some(&9));

            let rejected = (ops.install)(ptr, Box::new(1u8));
            assert!(rejected.is_err());
        }
        assert_eq!(slot.as_deref(), Some(&9));

        // SAFETY: as above.
        unsafe { (ops.clear)(std::ptr::addr_of_mut!(slot).cast::<u8>()) };
        assert!(slot.is_none());
    }

    #[test]
    fn test_display_names() {
        assert_eq!(PointerFlavor::Boxed.display_name("Node"), "Option<Box<Node>>");
        assert_eq!(PointerFlavor::Poly.display_name("Shape"), "Poly<Shape>");
        assert_eq!(PointerFlavor::Const.display_name("i32"), "*const i32");
        assert_eq!(PointerFlavor::NonNull.display_name("i32"), "Option<NonNull<i32>>");
    }
}
