// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Growable write buffer and bounds-checked read window.
//!
//! Values are copied in host byte order; the format is meant for
//! same-build persistence, not for exchange between machines.

use crate::config::NAME_TERMINATOR;
use std::ops::Range;

/// Generate native-order write methods for fixed-size integers.
macro_rules! impl_write_ne {
    ($name:ident, $type:ty) => {
        pub fn $name(&mut self, value: $type) {
            self.write(&value.to_ne_bytes());
        }
    };
}

/// Generate native-order read methods for fixed-size integers.
///
/// Each generated method returns `None` and leaves the cursor untouched when
/// fewer than `size_of::<T>()` bytes remain in the window.
macro_rules! impl_read_ne {
    ($name:ident, $type:ty) => {
        pub fn $name(&mut self) -> Option<$type> {
            let mut bytes = [0u8; std::mem::size_of::<$type>()];
            if self.read(&mut bytes) {
                Some(<$type>::from_ne_bytes(bytes))
            } else {
                None
            }
        }
    };
}

/// Growable output buffer.
///
/// Capacity doubles whenever a write does not fit.
#[derive(Debug, Default, Clone)]
pub struct WriteBuffer {
    data: Vec<u8>,
}

impl WriteBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: Vec::with_capacity(capacity),
        }
    }

    /// Append raw bytes.
    pub fn write(&mut self, bytes: &[u8]) {
        self.reserve(bytes.len());
        self.data.extend_from_slice(bytes);
    }

    impl_write_ne!(write_u8, u8);
    impl_write_ne!(write_u64, u64);

    /// Append a length prefix.
    pub fn write_len(&mut self, len: usize) {
        self.write_u64(len as u64);
    }

    /// Append `name` followed by a NUL terminator.
    ///
    /// # Panics
    ///
    /// Names come from type declarations; an interior NUL is a declaration bug.
    pub fn write_cstr(&mut self, name: &str) {
        assert!(
            !name.as_bytes().contains(&NAME_TERMINATOR),
            "name {:?} contains a NUL byte",
            name
        );
        self.reserve(name.len() + 1);
        self.data.extend_from_slice(name.as_bytes());
        self.data.push(NAME_TERMINATOR);
    }

    fn reserve(&mut self, additional: usize) {
        let needed = self.data.len() + additional;
        if needed > self.data.capacity() {
            let target = needed.max(self.data.capacity() * 2);
            self.data.reserve_exact(target - self.data.len());
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.data.capacity()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    /// Drop the contents, keep the allocation.
    pub fn clear(&mut self) {
        self.data.clear();
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.data
    }
}

/// Cursor position plus the end of the readable window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub cursor: usize,
    pub limit: usize,
}

/// Bounds-checked reader over one session's bytes.
///
/// Reads never cross `limit`. Nested payloads narrow the window with
/// [`push_window`](Self::push_window); [`pop_window`](Self::pop_window)
/// jumps past whatever the nested reader left unread.
#[derive(Debug, Default)]
pub struct ReadBuffer {
    data: Vec<u8>,
    cursor: usize,
    limit: usize,
    windows: Vec<usize>,
}

impl ReadBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_bytes(bytes: &[u8]) -> Self {
        let mut buffer = Self::new();
        buffer.reset(bytes);
        buffer
    }

    /// Replace the contents and rewind, reusing the allocation.
    pub fn reset(&mut self, bytes: &[u8]) {
        self.data.clear();
        self.data.extend_from_slice(bytes);
        self.cursor = 0;
        self.limit = self.data.len();
        self.windows.clear();
    }

    pub fn clear(&mut self) {
        self.reset(&[]);
    }

    pub fn offset(&self) -> usize {
        self.cursor
    }

    pub fn remaining(&self) -> usize {
        self.limit.saturating_sub(self.cursor)
    }

    /// Copy exactly `out.len()` bytes into `out`.
    ///
    /// Returns `false` without touching `out` or the cursor when the window
    /// holds fewer bytes.
    pub fn read(&mut self, out: &mut [u8]) -> bool {
        if out.len() > self.remaining() {
            return false;
        }
        out.copy_from_slice(&self.data[self.cursor..self.cursor + out.len()]);
        self.cursor += out.len();
        true
    }

    /// Borrow the next `len` bytes.
    pub fn read_slice(&mut self, len: usize) -> Option<&[u8]> {
        if len > self.remaining() {
            return None;
        }
        let start = self.cursor;
        self.cursor += len;
        Some(&self.data[start..start + len])
    }

    impl_read_ne!(read_u8, u8);
    impl_read_ne!(read_u64, u64);

    /// Read a NUL-terminated name, returned without its terminator.
    pub fn read_cstr(&mut self) -> Option<&[u8]> {
        let window = &self.data[self.cursor..self.limit];
        let len = window.iter().position(|&b| b == NAME_TERMINATOR)?;
        let start = self.cursor;
        self.cursor += len + 1;
        Some(&self.data[start..start + len])
    }

    /// Advance the cursor by `len` bytes.
    pub fn skip(&mut self, len: usize) -> bool {
        if len > self.remaining() {
            return false;
        }
        self.cursor += len;
        true
    }

    /// Restrict reads to the next `len` bytes.
    pub fn push_window(&mut self, len: usize) -> bool {
        if len > self.remaining() {
            return false;
        }
        self.windows.push(self.limit);
        self.limit = self.cursor + len;
        true
    }

    /// Leave the innermost window, skipping its unread tail.
    pub fn pop_window(&mut self) {
        if let Some(outer) = self.windows.pop() {
            self.cursor = self.limit;
            self.limit = outer;
        }
    }

    pub fn window(&self) -> Window {
        Window {
            cursor: self.cursor,
            limit: self.limit,
        }
    }

    /// Move to an arbitrary window inside the data.
    ///
    /// # Panics
    ///
    /// Panics if the window is inverted or lies outside the data.
    pub fn set_window(&mut self, window: Window) {
        assert!(
            window.cursor <= window.limit && window.limit <= self.data.len(),
            "window {:?} outside of {} bytes",
            window,
            self.data.len()
        );
        self.cursor = window.cursor;
        self.limit = window.limit;
    }

    /// Bytes previously located by the reader (e.g. an entry name).
    pub fn bytes(&self, range: Range<usize>) -> &[u8] {
        &self.data[range]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_U64: u64 = 0x1122_3344_5566_7788;

    #[test]
    fn test_write_buffer_doubles_capacity() {
        let mut buffer = WriteBuffer::with_capacity(4);
        buffer.write(&[1, 2, 3, 4]);
        let initial = buffer.capacity();
        assert!(initial >= 4);

        let overflow = initial - buffer.len() + 1;
        buffer.write(&vec![5u8; overflow]);
        assert!(buffer.capacity() >= initial * 2);
        assert_eq!(&buffer.as_slice()[..5], &[1, 2, 3, 4, 5]);
        assert_eq!(buffer.len(), 4 + overflow);

        let before = buffer.len();
        let big = buffer.capacity() * 3;
        buffer.write(&vec![0u8; big]);
        assert_eq!(buffer.len(), before + big);
        assert!(buffer.capacity() >= before + big);
    }

    #[test]
    fn test_write_buffer_clear_keeps_allocation() {
        let mut buffer = WriteBuffer::new();
        buffer.write(&[0u8; 100]);
        let capacity = buffer.capacity();
        buffer.clear();
        assert!(buffer.is_empty());
        assert_eq!(buffer.capacity(), capacity);
    }

    #[test]
    #[should_panic(expected = "NUL byte")]
    fn test_write_cstr_rejects_interior_nul() {
        WriteBuffer::new().write_cstr("a\0b");
    }

    #[test]
    fn test_read_underrun_leaves_output_untouched() {
        let mut reader = ReadBuffer::from_bytes(&[1, 2, 3]);
        let mut out = [0xEE; 4];
        assert!(!reader.read(&mut out));
        assert_eq!(out, [0xEE; 4]);
        assert_eq!(reader.offset(), 0);

        let mut out = [0u8; 3];
        assert!(reader.read(&mut out));
        assert_eq!(out, [1, 2, 3]);
        assert_eq!(reader.remaining(), 0);
    }

    #[test]
    fn test_integer_roundtrip_native_order() {
        let mut writer = WriteBuffer::new();
        writer.write_u64(TEST_U64);
        writer.write_u8(0xAB);
        assert_eq!(&writer.as_slice()[..8], &TEST_U64.to_ne_bytes());

        let mut reader = ReadBuffer::from_bytes(writer.as_slice());
        assert_eq!(reader.read_u64(), Some(TEST_U64));
        assert_eq!(reader.read_u8(), Some(0xAB));
        assert_eq!(reader.read_u8(), None);
    }

    #[test]
    fn test_read_cstr() {
        let mut writer = WriteBuffer::new();
        writer.write_cstr("name");
        writer.write_cstr("");
        let mut reader = ReadBuffer::from_bytes(writer.as_slice());
        assert_eq!(reader.read_cstr(), Some(&b"name"[..]));
        assert_eq!(reader.read_cstr(), Some(&b""[..]));
        assert_eq!(reader.read_cstr(), None);

        // Missing terminator is an underrun, the cursor stays put.
        let mut reader = ReadBuffer::from_bytes(b"abc");
        assert_eq!(reader.read_cstr(), None);
        assert_eq!(reader.offset(), 0);
    }

    #[test]
    fn test_windows_bound_reads_and_skip_tail() {
        let mut reader = ReadBuffer::from_bytes(&[1, 2, 3, 4, 5, 6]);
        assert!(reader.push_window(4));
        assert_eq!(reader.remaining(), 4);
        assert_eq!(reader.read_u8(), Some(1));

        // Nested window cannot outgrow its parent.
        assert!(!reader.push_window(4));
        assert!(reader.push_window(1));
        assert_eq!(reader.read_u8(), Some(2));
        assert_eq!(reader.read_u8(), None);
        reader.pop_window();

        reader.pop_window();
        assert_eq!(reader.offset(), 4);
        assert_eq!(reader.read_u8(), Some(5));
    }

    #[test]
    fn test_cstr_does_not_cross_window() {
        let mut reader = ReadBuffer::from_bytes(b"ab\0");
        assert!(reader.push_window(2));
        assert_eq!(reader.read_cstr(), None);
    }

    #[test]
    fn test_set_window_and_bytes() {
        let mut reader = ReadBuffer::from_bytes(b"xyzw");
        reader.set_window(Window {
            cursor: 1,
            limit: 3,
        });
        assert_eq!(reader.read_slice(2), Some(&b"yz"[..]));
        assert_eq!(reader.bytes(0..1), b"x");
    }

    #[test]
    #[should_panic(expected = "outside of")]
    fn test_set_window_out_of_range() {
        let mut reader = ReadBuffer::from_bytes(b"xy");
        reader.set_window(Window {
            cursor: 0,
            limit: 3,
        });
    }
}
