// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Function pointer signatures. Described for introspection only; the
//! serializer never traverses them.

use super::TypeKey;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionDescriptor {
    params: Vec<TypeKey>,
    ret: TypeKey,
}

impl FunctionDescriptor {
    pub(crate) fn new(params: Vec<TypeKey>, ret: TypeKey) -> Self {
        Self { params, ret }
    }

    pub fn params(&self) -> &[TypeKey] {
        &self.params
    }

    /// Return type, `()` included.
    pub fn ret(&self) -> TypeKey {
        self.ret
    }

    pub(crate) fn display_name(params: &[&str], ret: &str) -> String {
        let params = params.join(", ");
        if ret == "()" {
            format!("fn({params})")
        } else {
            format!("fn({params}) -> {ret}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name() {
        assert_eq!(FunctionDescriptor::display_name(&[], "()"), "fn()");
        assert_eq!(
            FunctionDescriptor::display_name(&["i32", "String"], "bool"),
            "fn(i32, String) -> bool"
        );
    }
}
