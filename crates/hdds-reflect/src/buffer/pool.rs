// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Scratch buffer pool for length-prefixed payloads.
//!
//! The wire format writes a payload length before the payload, so every
//! nested entry is first encoded into a scratch buffer. The pool keeps a
//! bounded stack of cleared buffers around so deep values do not allocate
//! once per entry.
//!
//! The pool is owned by one serializer; no state is shared between
//! instances.

use super::cursor::WriteBuffer;

/// Bounded stack of reusable scratch buffers.
#[derive(Debug)]
pub struct BufferPool {
    free: Vec<WriteBuffer>,
    retained: usize,
    scratch_capacity: usize,
}

impl BufferPool {
    /// Create an empty pool keeping at most `retained` buffers once released.
    pub fn new(retained: usize, scratch_capacity: usize) -> Self {
        Self {
            free: Vec::with_capacity(retained),
            retained,
            scratch_capacity,
        }
    }

    /// Take a cleared buffer, allocating one if the pool is empty.
    pub fn acquire(&mut self) -> WriteBuffer {
        match self.free.pop() {
            Some(buffer) => buffer,
            None => WriteBuffer::with_capacity(self.scratch_capacity),
        }
    }

    /// Return a buffer. Dropped when the pool is already full.
    pub fn release(&mut self, mut buffer: WriteBuffer) {
        if self.free.len() < self.retained {
            buffer.clear();
            self.free.push(buffer);
        }
    }

    /// Number of idle buffers currently held.
    pub fn idle(&self) -> usize {
        self.free.len()
    }

    /// Retention cap.
    pub fn retained(&self) -> usize {
        self.retained
    }
}
