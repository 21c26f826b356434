// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Encoding half of the serializer.

use super::{lookup, NO_METADATA};
use crate::buffer::{BufferPool, WriteBuffer};
use crate::config::OWNED_KEY;
use crate::error::{SerializeError, SerializeResult};
use crate::reflect::Reflect;
use crate::registry::TypeRegistry;
use crate::types::{ClassDescriptor, MetaDataSet, PointerDescriptor, TypeDescriptor, TypeKind};

/// Walks a value through its descriptors and appends its encoding.
pub(super) struct Writer<'a, 'r> {
    registry: &'r TypeRegistry,
    pool: &'a mut BufferPool,
    max_depth: usize,
    depth: usize,
}

impl<'a, 'r> Writer<'a, 'r> {
    pub(super) fn new(registry: &'r TypeRegistry, pool: &'a mut BufferPool, max_depth: usize) -> Self {
        Self {
            registry,
            pool,
            max_depth,
            depth: 0,
        }
    }

    /// # Safety
    ///
    /// `ptr` must point to a live value of the type `desc` describes.
    pub(super) unsafe fn write_value(
        &mut self,
        out: &mut WriteBuffer,
        ptr: *const u8,
        desc: &TypeDescriptor,
        metadata: &MetaDataSet,
    ) -> SerializeResult<()> {
        if self.depth >= self.max_depth {
            return Err(SerializeError::DepthExceeded {
                limit: self.max_depth,
            });
        }
        self.depth += 1;
        let result = self.write_kind(out, ptr, desc, metadata);
        self.depth -= 1;
        result
    }

    unsafe fn write_kind(
        &mut self,
        out: &mut WriteBuffer,
        ptr: *const u8,
        desc: &TypeDescriptor,
        metadata: &MetaDataSet,
    ) -> SerializeResult<()> {
        match desc.kind() {
            TypeKind::Primitive(kind) => {
                out.write(std::slice::from_raw_parts(ptr, kind.size()));
                Ok(())
            }
            TypeKind::String => {
                let text = &*ptr.cast::<String>();
                out.write_len(text.len());
                out.write(text.as_bytes());
                Ok(())
            }
            TypeKind::Enum(enumeration) => {
                let value = enumeration.load(ptr);
                let name = enumeration.name_of(value).ok_or_else(|| {
                    SerializeError::UnmappedEnumValue {
                        enum_name: desc.name().to_owned(),
                        value,
                    }
                })?;
                out.write_cstr(name);
                Ok(())
            }
            TypeKind::Sequence(seq) => {
                let element = lookup(self.registry, seq.element());
                let ops = seq.ops();
                let len = (ops.len)(ptr);
                out.write_len(len);
                for index in 0..len {
                    self.write_element(out, (ops.element)(ptr, index), element, metadata)?;
                }
                Ok(())
            }
            TypeKind::FixedArray(array) => {
                let element = lookup(self.registry, array.element());
                for index in 0..array.count() {
                    self.write_element(out, ptr.add(index * element.size()), element, metadata)?;
                }
                Ok(())
            }
            TypeKind::Class(class) => self.write_entries(out, ptr, class),
            TypeKind::Pointer(pointer) => self.write_pointer(out, ptr, desc, pointer, metadata),
            TypeKind::Function(_) => Ok(()),
        }
    }

    /// Sequence and array elements. Class elements are length-framed so the
    /// reader can find where each one ends.
    unsafe fn write_element(
        &mut self,
        out: &mut WriteBuffer,
        ptr: *const u8,
        element: &TypeDescriptor,
        metadata: &MetaDataSet,
    ) -> SerializeResult<()> {
        if element.is_class() {
            self.write_framed(out, |writer, scratch| {
                // SAFETY: forwarded from the caller.
                unsafe { writer.write_value(scratch, ptr, element, metadata) }
            })
        } else {
            self.write_value(out, ptr, element, metadata)
        }
    }

    /// One entry per member: name, payload length, payload.
    unsafe fn write_entries(
        &mut self,
        out: &mut WriteBuffer,
        ptr: *const u8,
        class: &ClassDescriptor,
    ) -> SerializeResult<()> {
        let registry = self.registry;
        for member in class.members(registry, true) {
            let desc = lookup(registry, member.member.type_key());
            let field = ptr.add(member.offset);
            let metadata = member.member.metadata();
            out.write_cstr(member.member.name());
            self.write_framed(out, |writer, scratch| {
                // SAFETY: member offsets come from the class layout.
                unsafe { writer.write_value(scratch, field, desc, metadata) }
            })?;
        }
        Ok(())
    }

    unsafe fn write_pointer(
        &mut self,
        out: &mut WriteBuffer,
        ptr: *const u8,
        desc: &TypeDescriptor,
        pointer: &PointerDescriptor,
        metadata: &MetaDataSet,
    ) -> SerializeResult<()> {
        if !metadata.flag(OWNED_KEY) {
            log::trace!("[reflect] pointer `{}` not owned, skipped", desc.name());
            return Ok(());
        }
        let ops = pointer
            .ownership()
            .unwrap_or_else(|| panic!("pointer `{}` cannot own its pointee", desc.name()));
        let Some(pointee) = (ops.pointee)(ptr) else {
            out.write_u8(0);
            return Ok(());
        };

        let registry = self.registry;
        let object: &dyn Reflect = &*pointee;
        let declared = lookup(registry, pointer.pointee());
        let runtime = match declared.as_class() {
            Some(class) => class.runtime_class(registry, object),
            None => {
                assert!(
                    object.type_key() == declared.key(),
                    "pointee of `{}` is not a `{}`",
                    desc.name(),
                    declared.name()
                );
                declared
            }
        };

        out.write_u8(1);
        if runtime.is_class() {
            out.write_cstr(runtime.name());
        }
        let data = pointee.cast::<u8>();
        self.write_framed(out, |writer, scratch| {
            // SAFETY: `data` is the live pointee, described by `runtime`.
            unsafe { writer.write_value(scratch, data, runtime, &NO_METADATA) }
        })
    }

    /// Encode into a pooled scratch buffer, then append it length-prefixed.
    fn write_framed(
        &mut self,
        out: &mut WriteBuffer,
        body: impl FnOnce(&mut Self, &mut WriteBuffer) -> SerializeResult<()>,
    ) -> SerializeResult<()> {
        let mut scratch = self.pool.acquire();
        let result = body(self, &mut scratch);
        if result.is_ok() {
            out.write_len(scratch.len());
            out.write(scratch.as_slice());
        }
        self.pool.release(scratch);
        result
    }
}
