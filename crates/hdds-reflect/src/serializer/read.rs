// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Decoding half of the serializer.
//!
//! Every read goes through the bounds-checked [`ReadBuffer`]; an underrun
//! becomes [`SerializeError::Truncated`] and unwinds the whole call chain.

use super::{lookup, NO_METADATA};
use crate::buffer::{ReadBuffer, Window};
use crate::config::{SerializerConfig, LENGTH_PREFIX_SIZE, OWNED_KEY, PRESENCE_FLAG_SIZE};
use crate::error::{SerializeError, SerializeResult};
use crate::registry::TypeRegistry;
use crate::types::{
    ClassDescriptor, MetaDataSet, PointerDescriptor, PrimitiveKind, TypeDescriptor, TypeKind,
};
use std::ops::Range;

/// Walks a value through its descriptors, overwriting it from the input.
pub(super) struct Reader<'a, 'r> {
    registry: &'r TypeRegistry,
    input: &'a mut ReadBuffer,
    config: &'a SerializerConfig,
    depth: usize,
}

impl<'a, 'r> Reader<'a, 'r> {
    pub(super) fn new(
        registry: &'r TypeRegistry,
        input: &'a mut ReadBuffer,
        config: &'a SerializerConfig,
    ) -> Self {
        Self {
            registry,
            input,
            config,
            depth: 0,
        }
    }

    fn truncated(&self, needed: usize) -> SerializeError {
        SerializeError::Truncated {
            offset: self.input.offset(),
            needed,
            remaining: self.input.remaining(),
        }
    }

    fn read_len(&mut self) -> SerializeResult<usize> {
        let length = self
            .input
            .read_u64()
            .ok_or_else(|| self.truncated(LENGTH_PREFIX_SIZE))?;
        let limit = self.config.max_length;
        if length > limit {
            return Err(SerializeError::LengthOverflow { length, limit });
        }
        usize::try_from(length).map_err(|_| SerializeError::LengthOverflow {
            length,
            limit: usize::MAX as u64,
        })
    }

    /// NUL-terminated UTF-8 name.
    fn read_name(&mut self) -> SerializeResult<&str> {
        let start = self.input.offset();
        let remaining = self.input.remaining();
        let len = match self.input.read_cstr() {
            Some(name) => name.len(),
            None => {
                return Err(SerializeError::Truncated {
                    offset: start,
                    needed: remaining + 1,
                    remaining,
                })
            }
        };
        std::str::from_utf8(self.input.bytes(start..start + len))
            .map_err(|_| SerializeError::InvalidUtf8 { offset: start })
    }

    /// # Safety
    ///
    /// `ptr` must point to a live, exclusively borrowed value of the type
    /// `desc` describes.
    pub(super) unsafe fn read_value(
        &mut self,
        ptr: *mut u8,
        desc: &TypeDescriptor,
        metadata: &MetaDataSet,
    ) -> SerializeResult<()> {
        if self.depth >= self.config.max_depth {
            return Err(SerializeError::DepthExceeded {
                limit: self.config.max_depth,
            });
        }
        self.depth += 1;
        let result = self.read_kind(ptr, desc, metadata);
        self.depth -= 1;
        result
    }

    unsafe fn read_kind(
        &mut self,
        ptr: *mut u8,
        desc: &TypeDescriptor,
        metadata: &MetaDataSet,
    ) -> SerializeResult<()> {
        match desc.kind() {
            TypeKind::Primitive(kind) => self.read_primitive(ptr, *kind),
            TypeKind::String => {
                let len = self.read_len()?;
                if len > self.input.remaining() {
                    return Err(self.truncated(len));
                }
                let offset = self.input.offset();
                let bytes = self.input.read_slice(len).unwrap_or_default();
                let text = std::str::from_utf8(bytes)
                    .map_err(|_| SerializeError::InvalidUtf8 { offset })?;
                let target = &mut *ptr.cast::<String>();
                target.clear();
                target.push_str(text);
                Ok(())
            }
            TypeKind::Enum(enumeration) => {
                let name = self.read_name()?;
                let value = enumeration.value_of(name).ok_or_else(|| {
                    SerializeError::UnknownEnumValue {
                        enum_name: desc.name().to_owned(),
                        value: name.to_owned(),
                    }
                })?;
                enumeration.store(ptr, value);
                Ok(())
            }
            TypeKind::Sequence(seq) => {
                let element = lookup(self.registry, seq.element());
                let count = self.read_len()?;
                let min = min_encoded_size(self.registry, element, metadata);
                if min > 0 && count > self.input.remaining() / min {
                    return Err(self.truncated(count.saturating_mul(min)));
                }
                if min == 0 {
                    let bytes = (count as u64).saturating_mul(element.size() as u64);
                    let limit = self.config.max_unbacked_bytes;
                    if bytes > limit {
                        return Err(SerializeError::LengthOverflow {
                            length: bytes,
                            limit,
                        });
                    }
                }
                let ops = seq.ops();
                (ops.resize)(ptr, count);
                for index in 0..count {
                    self.read_element((ops.element_mut)(ptr, index), element, metadata)?;
                }
                Ok(())
            }
            TypeKind::FixedArray(array) => {
                let element = lookup(self.registry, array.element());
                for index in 0..array.count() {
                    self.read_element(ptr.add(index * element.size()), element, metadata)?;
                }
                Ok(())
            }
            TypeKind::Class(class) => self.read_entries(ptr, class),
            TypeKind::Pointer(pointer) => self.read_pointer(ptr, desc, pointer, metadata),
            TypeKind::Function(_) => Ok(()),
        }
    }

    unsafe fn read_primitive(&mut self, ptr: *mut u8, kind: PrimitiveKind) -> SerializeResult<()> {
        let size = kind.size();
        let mut raw = [0u8; 8];
        let bytes = &mut raw[..size];
        if !self.input.read(bytes) {
            return Err(self.truncated(size));
        }
        match kind {
            PrimitiveKind::Bool if bytes[0] > 1 => {
                return Err(SerializeError::InvalidBool(bytes[0]));
            }
            PrimitiveKind::Char => {
                let scalar = u32::from_ne_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
                if char::from_u32(scalar).is_none() {
                    return Err(SerializeError::InvalidChar(scalar));
                }
            }
            _ => {}
        }
        std::ptr::copy_nonoverlapping(bytes.as_ptr(), ptr, size);
        Ok(())
    }

    unsafe fn read_element(
        &mut self,
        ptr: *mut u8,
        element: &TypeDescriptor,
        metadata: &MetaDataSet,
    ) -> SerializeResult<()> {
        if element.is_class() {
            self.read_framed(|reader| {
                // SAFETY: forwarded from the caller.
                unsafe { reader.read_value(ptr, element, metadata) }
            })
        } else {
            self.read_value(ptr, element, metadata)
        }
    }

    /// Index every entry of the current window, then match members by name.
    ///
    /// Members without an entry keep their value; entries without a member
    /// are skipped.
    unsafe fn read_entries(&mut self, ptr: *mut u8, class: &ClassDescriptor) -> SerializeResult<()> {
        let mut entries: Vec<(Range<usize>, Window)> = Vec::new();
        while self.input.remaining() > 0 {
            let start = self.input.offset();
            let remaining = self.input.remaining();
            let name_len = match self.input.read_cstr() {
                Some(name) => name.len(),
                None => {
                    return Err(SerializeError::Truncated {
                        offset: start,
                        needed: remaining + 1,
                        remaining,
                    })
                }
            };
            let size = self.read_len()?;
            let payload = self.input.offset();
            if !self.input.skip(size) {
                return Err(self.truncated(size));
            }
            entries.push((
                start..start + name_len,
                Window {
                    cursor: payload,
                    limit: payload + size,
                },
            ));
        }
        let end = self.input.window();

        let registry = self.registry;
        let mut matched = vec![false; entries.len()];
        for member in class.members(registry, true) {
            let name = member.member.name();
            // Same-named members consume their entries in write order.
            let found = entries.iter().zip(&matched).position(|((range, _), hit)| {
                !*hit && self.input.bytes(range.clone()) == name.as_bytes()
            });
            let Some(index) = found else {
                log::debug!("[reflect] no entry for member `{}`, left untouched", name);
                continue;
            };
            matched[index] = true;
            self.input.set_window(entries[index].1);
            let desc = lookup(registry, member.member.type_key());
            self.read_value(ptr.add(member.offset), desc, member.member.metadata())?;
        }
        self.input.set_window(end);

        for ((range, _), _) in entries.iter().zip(&matched).filter(|(_, hit)| !**hit) {
            log::debug!(
                "[reflect] skipped unknown entry `{}`",
                String::from_utf8_lossy(self.input.bytes(range.clone()))
            );
        }
        Ok(())
    }

    unsafe fn read_pointer(
        &mut self,
        ptr: *mut u8,
        desc: &TypeDescriptor,
        pointer: &PointerDescriptor,
        metadata: &MetaDataSet,
    ) -> SerializeResult<()> {
        if !metadata.flag(OWNED_KEY) {
            return Ok(());
        }
        let ops = pointer
            .ownership()
            .unwrap_or_else(|| panic!("pointer `{}` cannot own its pointee", desc.name()));
        let flag = self
            .input
            .read_u8()
            .ok_or_else(|| self.truncated(PRESENCE_FLAG_SIZE))?;
        match flag {
            0 => {
                (ops.clear)(ptr);
                return Ok(());
            }
            1 => {}
            other => return Err(SerializeError::InvalidBool(other)),
        }

        let registry = self.registry;
        let declared = lookup(registry, pointer.pointee());
        let target = if declared.is_class() {
            let name = self.read_name()?;
            let target = registry
                .find_by_name(name)
                .ok_or_else(|| SerializeError::UnknownClass {
                    name: name.to_owned(),
                })?;
            let derived = target
                .as_class()
                .is_some_and(|class| class.is_child_of(registry, declared.key(), true));
            if !derived {
                return Err(SerializeError::NotDerived {
                    class: name.to_owned(),
                    base: declared.name().to_owned(),
                });
            }
            target
        } else {
            declared
        };

        let factory = target
            .factory()
            .unwrap_or_else(|| panic!("type `{}` has no factory", target.name()));
        let installed = (ops.install)(ptr, factory()).map_err(|_| {
            SerializeError::PointeeMismatch {
                pointer: desc.name().to_owned(),
                class: target.name().to_owned(),
            }
        })?;
        let data = installed.cast::<u8>();
        self.read_framed(|reader| {
            // SAFETY: `data` is the freshly installed pointee of type `target`.
            unsafe { reader.read_value(data, target, &NO_METADATA) }
        })
    }

    /// Read a length prefix and run `body` inside that many bytes.
    fn read_framed(
        &mut self,
        body: impl FnOnce(&mut Self) -> SerializeResult<()>,
    ) -> SerializeResult<()> {
        let len = self.read_len()?;
        if !self.input.push_window(len) {
            return Err(self.truncated(len));
        }
        let result = body(self);
        self.input.pop_window();
        result
    }
}

/// Fewest bytes one element of `desc` can occupy on the wire.
///
/// Bounds declared sequence counts before anything is allocated. Elements
/// that encode to nothing are bounded by `max_unbacked_bytes` instead.
fn min_encoded_size(registry: &TypeRegistry, desc: &TypeDescriptor, metadata: &MetaDataSet) -> usize {
    match desc.kind() {
        TypeKind::Primitive(kind) => kind.size(),
        TypeKind::String | TypeKind::Sequence(_) | TypeKind::Class(_) => LENGTH_PREFIX_SIZE,
        TypeKind::Enum(_) => 1,
        TypeKind::FixedArray(array) => registry
            .find_by_id(array.element())
            .map_or(0, |element| {
                min_encoded_size(registry, element, metadata).saturating_mul(array.count())
            }),
        TypeKind::Pointer(_) if metadata.flag(OWNED_KEY) => PRESENCE_FLAG_SIZE,
        TypeKind::Pointer(_) | TypeKind::Function(_) => 0,
    }
}
