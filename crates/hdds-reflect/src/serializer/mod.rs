// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Metadata-driven binary serializer.
//!
//! # Wire format
//!
//! Host byte order, no padding, no type header:
//!
//! ```text
//! Primitive     raw size_of::<T>() bytes
//! String        u64 length + UTF-8 bytes
//! Enum          enumerator name + NUL
//! Vec<T>        u64 count + count elements
//! [T; N]        N elements
//! Class         Entry*            (a top-level class spans the whole input)
//! Entry         member name + NUL + u64 length + payload
//! Owned pointer u8 presence [+ runtime class name + NUL] [+ u64 length + pointee]
//! ```
//!
//! Classes inside a `Vec` or an array are prefixed with their u64 length.
//! Pointers whose member is not annotated `owned`, and function pointers,
//! are not encoded.
//!
//! Entries are matched by name on read, so members may be added, removed
//! or reordered between the writer's and the reader's version of a class.
//!
//! # Sessions
//!
//! ```text
//! Idle --begin_write--> Writing --end_write--> Idle
//! Idle --begin_read---> Reading --end_read---> Idle
//! ```
//!
//! Starting a session while one is active, or serializing outside of a
//! session, panics.

mod read;
mod write;

use crate::buffer::{BufferPool, ReadBuffer, WriteBuffer};
use crate::config::SerializerConfig;
use crate::error::SerializeResult;
use crate::reflect::Reflect;
use crate::registry::TypeRegistry;
use crate::types::{MetaDataSet, TypeDescriptor, TypeKey};
use read::Reader;
use write::Writer;

/// Metadata of values that are not reached through a member.
static NO_METADATA: MetaDataSet = MetaDataSet::new();

/// Descriptor of a type the serializer must know.
///
/// # Panics
///
/// Panics if `key` is not registered.
fn lookup(registry: &TypeRegistry, key: TypeKey) -> &TypeDescriptor {
    registry
        .find_by_id(key)
        .unwrap_or_else(|| panic!("type {:?} is not registered", key))
}

/// Serializer session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Writing,
    Reading,
}

/// Encodes and decodes registered values by walking their descriptors.
///
/// One instance runs one session at a time and owns its buffers and its
/// scratch pool; instances share nothing but the registry.
pub struct GenericSerializer<'r> {
    registry: &'r TypeRegistry,
    config: SerializerConfig,
    state: SessionState,
    output: WriteBuffer,
    pool: BufferPool,
    input: ReadBuffer,
}

impl<'r> GenericSerializer<'r> {
    pub fn new(registry: &'r TypeRegistry) -> Self {
        Self::with_config(registry, SerializerConfig::default())
    }

    pub fn with_config(registry: &'r TypeRegistry, config: SerializerConfig) -> Self {
        Self {
            registry,
            output: WriteBuffer::with_capacity(config.initial_capacity),
            pool: BufferPool::new(config.pool_retained, config.scratch_capacity),
            input: ReadBuffer::new(),
            state: SessionState::Idle,
            config,
        }
    }

    pub fn registry(&self) -> &'r TypeRegistry {
        self.registry
    }

    pub fn config(&self) -> &SerializerConfig {
        &self.config
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Start a write session on an empty output buffer.
    ///
    /// # Panics
    ///
    /// Panics if a session is already active.
    pub fn begin_write(&mut self) {
        assert!(
            self.state == SessionState::Idle,
            "begin_write during a {:?} session",
            self.state
        );
        self.output.clear();
        self.state = SessionState::Writing;
        log::trace!("[reflect] write session started");
    }

    /// Finish the write session and return what it produced.
    ///
    /// # Panics
    ///
    /// Panics if no write session is active.
    pub fn end_write(&mut self) -> &[u8] {
        assert!(
            self.state == SessionState::Writing,
            "end_write without a write session"
        );
        self.state = SessionState::Idle;
        log::trace!("[reflect] write session ended, {} bytes", self.output.len());
        self.output.as_slice()
    }

    /// Start a read session over a copy of `bytes`.
    ///
    /// # Panics
    ///
    /// Panics if a session is already active.
    pub fn begin_read(&mut self, bytes: &[u8]) {
        assert!(
            self.state == SessionState::Idle,
            "begin_read during a {:?} session",
            self.state
        );
        self.input.reset(bytes);
        self.state = SessionState::Reading;
        log::trace!("[reflect] read session started, {} bytes", bytes.len());
    }

    /// # Panics
    ///
    /// Panics if no read session is active.
    pub fn end_read(&mut self) {
        assert!(
            self.state == SessionState::Reading,
            "end_read without a read session"
        );
        if self.input.remaining() > 0 {
            log::debug!(
                "[reflect] read session ended with {} unread bytes",
                self.input.remaining()
            );
        }
        self.input.clear();
        self.state = SessionState::Idle;
    }

    /// Output of the current or last write session.
    pub fn write_data(&self) -> &[u8] {
        self.output.as_slice()
    }

    /// Move the output out, leaving a fresh buffer behind.
    pub fn take_write_data(&mut self) -> Vec<u8> {
        let fresh = WriteBuffer::with_capacity(self.config.initial_capacity);
        std::mem::replace(&mut self.output, fresh).into_vec()
    }

    /// Write `value` or read into it, depending on the active session.
    ///
    /// # Panics
    ///
    /// Panics outside of a session or if `T` is not registered.
    pub fn serialize<T: Reflect>(&mut self, value: &mut T) -> SerializeResult<()> {
        let desc = self.descriptor_of::<T>();
        // SAFETY: `value` is a live, exclusively borrowed `T` and `desc`
        // describes `T`.
        unsafe { self.serialize_object((value as *mut T).cast(), desc, &NO_METADATA) }
    }

    /// Append `value` to the output.
    ///
    /// # Panics
    ///
    /// Panics outside of a write session or if `T` is not registered.
    pub fn write<T: Reflect>(&mut self, value: &T) -> SerializeResult<()> {
        assert!(
            self.state == SessionState::Writing,
            "write outside of a write session"
        );
        let desc = self.descriptor_of::<T>();
        let mut writer = Writer::new(self.registry, &mut self.pool, self.config.max_depth);
        // SAFETY: `value` is a live `T` and `desc` describes `T`.
        unsafe {
            writer.write_value(
                &mut self.output,
                (value as *const T).cast(),
                desc,
                &NO_METADATA,
            )
        }
    }

    /// [`serialize`](Self::serialize) for a value whose type is only
    /// known at run time.
    pub fn serialize_dyn(&mut self, value: &mut dyn Reflect) -> SerializeResult<()> {
        let key = value.type_key();
        let desc = lookup(self.registry, key);
        // SAFETY: `value` is live and exclusively borrowed; `desc` describes
        // its runtime type.
        unsafe { self.serialize_object((value as *mut dyn Reflect).cast(), desc, &NO_METADATA) }
    }

    /// Serialize the object at `ptr` as described by `desc`.
    ///
    /// # Safety
    ///
    /// `ptr` must point to a live value of the type `desc` describes, and
    /// be valid for writes during a read session.
    ///
    /// # Panics
    ///
    /// Panics outside of a session.
    pub unsafe fn serialize_object(
        &mut self,
        ptr: *mut u8,
        desc: &TypeDescriptor,
        metadata: &MetaDataSet,
    ) -> SerializeResult<()> {
        match self.state {
            SessionState::Writing => {
                let mut writer = Writer::new(self.registry, &mut self.pool, self.config.max_depth);
                writer.write_value(&mut self.output, ptr.cast_const(), desc, metadata)
            }
            SessionState::Reading => {
                let mut reader = Reader::new(self.registry, &mut self.input, &self.config);
                reader.read_value(ptr, desc, metadata)
            }
            SessionState::Idle => panic!("serialize outside of a session"),
        }
    }

    fn descriptor_of<T: Reflect>(&self) -> &'r TypeDescriptor {
        self.registry
            .find_by_id(TypeKey::of::<T>())
            .unwrap_or_else(|| panic!("type `{}` is not registered", std::any::type_name::<T>()))
    }
}

/// Encode `value` into a fresh buffer.
pub fn encode<T: Reflect>(registry: &TypeRegistry, value: &T) -> SerializeResult<Vec<u8>> {
    let mut serializer = GenericSerializer::new(registry);
    serializer.begin_write();
    let result = serializer.write(value);
    serializer.end_write();
    result?;
    Ok(serializer.take_write_data())
}

/// Decode `bytes` into `value`. Members absent from the input keep their
/// current value.
pub fn decode<T: Reflect>(registry: &TypeRegistry, bytes: &[u8], value: &mut T) -> SerializeResult<()> {
    let mut serializer = GenericSerializer::new(registry);
    serializer.begin_read(bytes);
    let result = serializer.serialize(value);
    serializer.end_read();
    result
}
