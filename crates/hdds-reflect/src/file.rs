// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Whole-value persistence to files.
//!
//! The file holds exactly the bytes [`encode`](crate::encode) produces, with
//! no header. Files are only readable by a build with the same byte order
//! and compatible type declarations.

use crate::error::SerializeResult;
use crate::reflect::Reflect;
use crate::registry::TypeRegistry;
use crate::serializer;
use std::path::Path;

/// Encode `value` and write it to `path`, replacing any existing file.
///
/// Nothing is written when encoding fails.
pub fn save_to_file<T: Reflect, P: AsRef<Path>>(
    registry: &TypeRegistry,
    value: &T,
    path: P,
) -> SerializeResult<()> {
    let path = path.as_ref();
    let bytes = serializer::encode(registry, value)?;
    std::fs::write(path, &bytes)?;
    log::debug!("[reflect] saved {} bytes to {}", bytes.len(), path.display());
    Ok(())
}

/// Read `path` and decode its contents into `value`.
pub fn load_from_file<T: Reflect, P: AsRef<Path>>(
    registry: &TypeRegistry,
    value: &mut T,
    path: P,
) -> SerializeResult<()> {
    let path = path.as_ref();
    let bytes = std::fs::read(path)?;
    log::debug!("[reflect] loading {} bytes from {}", bytes.len(), path.display());
    serializer::decode(registry, &bytes, value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SerializeError;

    #[test]
    fn test_save_and_load_string() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("greeting.bin");
        let registry = TypeRegistry::new();

        save_to_file(&registry, &String::from("héllo"), &path).expect("save");
        let mut loaded = String::new();
        load_from_file(&registry, &mut loaded, &path).expect("load");
        assert_eq!(loaded, "héllo");
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let registry = TypeRegistry::new();
        let mut value = 0u32;
        let err = load_from_file(&registry, &mut value, dir.path().join("absent.bin"))
            .expect_err("missing file");
        assert!(matches!(err, SerializeError::Io(_)));
        assert_eq!(value, 0);
    }
}
