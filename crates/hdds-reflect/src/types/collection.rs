// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Sequence (`Vec<T>`) and fixed array (`[T; N]`) descriptors.

use super::TypeKey;
use std::fmt;

/// Type-erased `Vec<T>` accessors. Every function takes the address of
/// the vector.
#[derive(Clone, Copy)]
pub struct SequenceOps {
    pub(crate) len: unsafe fn(*const u8) -> usize,
    pub(crate) resize: unsafe fn(*mut u8, usize),
    pub(crate) element: unsafe fn(*const u8, usize) -> *const u8,
    pub(crate) element_mut: unsafe fn(*mut u8, usize) -> *mut u8,
}

impl SequenceOps {
    pub(crate) fn vec<T: Default + 'static>() -> Self {
        Self {
            len: vec_len::<T>,
            resize: vec_resize::<T>,
            element: vec_element::<T>,
            element_mut: vec_element_mut::<T>,
        }
    }
}

impl fmt::Debug for SequenceOps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SequenceOps")
    }
}

unsafe fn vec_len<T>(ptr: *const u8) -> usize {
    (*ptr.cast::<Vec<T>>()).len()
}

unsafe fn vec_resize<T: Default>(ptr: *mut u8, len: usize) {
    (*ptr.cast::<Vec<T>>()).resize_with(len, T::default);
}

unsafe fn vec_element<T>(ptr: *const u8, index: usize) -> *const u8 {
    let vec = &*ptr.cast::<Vec<T>>();
    debug_assert!(index < vec.len());
    vec.as_ptr().add(index).cast()
}

unsafe fn vec_element_mut<T>(ptr: *mut u8, index: usize) -> *mut u8 {
    let vec = &mut *ptr.cast::<Vec<T>>();
    debug_assert!(index < vec.len());
    vec.as_mut_ptr().add(index).cast()
}

/// Growable sequence of elements of one type.
#[derive(Debug, Clone, Copy)]
pub struct SequenceDescriptor {
    element: TypeKey,
    ops: SequenceOps,
}

impl SequenceDescriptor {
    pub(crate) fn new(element: TypeKey, ops: SequenceOps) -> Self {
        Self { element, ops }
    }

    pub fn element(&self) -> TypeKey {
        self.element
    }

    pub fn ops(&self) -> &SequenceOps {
        &self.ops
    }
}

/// Statically sized array. Elements sit at `size_of::<T>()` stride.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedArrayDescriptor {
    element: TypeKey,
    count: usize,
}

impl FixedArrayDescriptor {
    pub(crate) fn new(element: TypeKey, count: usize) -> Self {
        Self { element, count }
    }

    pub fn element(&self) -> TypeKey {
        self.element
    }

    pub fn count(&self) -> usize {
        self.count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vec_ops() {
        let ops = SequenceOps::vec::<u16>();
        let mut values: Vec<u16> = vec![1, 2, 3, 4, 5];
        let ptr = std::ptr::addr_of_mut!(values).cast::<u8>();
        // SAFETY: ptr addresses a live Vec<u16>.
        unsafe {
            assert_eq!((ops.len)(ptr), 5);
            (ops.resize)(ptr, 2);
            assert_eq!((ops.len)(ptr), 2);
            *(ops.element_mut)(ptr, 1).cast::<u16>() = 42;
            assert_eq!(*(ops.element)(ptr, 0).cast::<u16>(), 1);
            (ops.resize)(ptr, 3);
        }
        assert_eq!(values, vec![1, 42, 0]);
    }
}
