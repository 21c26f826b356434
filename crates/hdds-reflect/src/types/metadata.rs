// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Key/value annotations attached to classes and members.
//!
//! Parsed from a `key=value,key2=value2` string. Whitespace around keys
//! and values is trimmed, empty keys are ignored and a bare key (`owned`)
//! carries an empty value. When a key repeats, the first occurrence wins.

/// One annotation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetaData {
    name: String,
    value: String,
}

impl MetaData {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Empty value, `true`, `yes` and `1` read as true.
    pub fn as_bool(&self) -> bool {
        matches!(
            self.value.to_ascii_lowercase().as_str(),
            "" | "true" | "yes" | "1"
        )
    }

    pub fn as_int(&self) -> Option<i64> {
        self.value.parse().ok()
    }

    pub fn as_float(&self) -> Option<f64> {
        self.value.parse().ok()
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }
}

/// Ordered set of annotations, unique by key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetaDataSet {
    entries: Vec<MetaData>,
}

impl MetaDataSet {
    /// Empty set.
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Parse the `key=value,...` mini-language.
    pub fn parse(text: &str) -> Self {
        let mut set = Self::new();
        for item in text.split(',') {
            let (key, value) = match item.split_once('=') {
                Some((key, value)) => (key.trim(), value.trim()),
                None => (item.trim(), ""),
            };
            if key.is_empty() || set.contains(key) {
                continue;
            }
            set.entries.push(MetaData::new(key, value));
        }
        set
    }

    pub fn get(&self, key: &str) -> Option<&MetaData> {
        self.entries.iter().find(|entry| entry.name == key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// `true` when `key` is present and reads as true.
    pub fn flag(&self, key: &str) -> bool {
        self.get(key).is_some_and(MetaData::as_bool)
    }

    pub fn iter(&self) -> impl Iterator<Item = &MetaData> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
