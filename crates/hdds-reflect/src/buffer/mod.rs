// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Byte buffers used by the serializer.

mod cursor;
mod pool;

pub use cursor::{ReadBuffer, Window, WriteBuffer};
pub use pool::BufferPool;
