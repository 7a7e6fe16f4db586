//! Bitflag Decoder
//!
//! Renders integer fields as `Name | Name | 0xRESIDUAL` using per-field
//! mask tables keyed by dotted field path.

use crate::error::{Error, Result};
use std::collections::BTreeMap;

/// Ordered `(mask, name)` entries for one field
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlagSet {
    entries: Vec<(u64, String)>,
}

impl FlagSet {
    pub fn new(entries: Vec<(u64, String)>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[(u64, String)] {
        &self.entries
    }

    /// OR of every mask in the table
    pub fn known_mask(&self) -> u64 {
        self.entries.iter().fold(0, |acc, (mask, _)| acc | mask)
    }

    /// Render `value` as named flags in table order
    ///
    /// Bits not covered by any mask are appended as a hex pseudo-flag.
    /// A value with nothing to show renders as `0x0`.
    pub fn render(&self, value: u64) -> String {
        let mut tokens: Vec<String> = self
            .entries
            .iter()
            .filter(|(mask, _)| value & mask != 0)
            .map(|(_, name)| name.clone())
            .collect();

        let residual = value & !self.known_mask();
        if residual != 0 {
            tokens.push(format!("0x{:X}", residual));
        }

        if tokens.is_empty() {
            "0x0".to_string()
        } else {
            tokens.join(" | ")
        }
    }
}

/// Flag tables keyed by dotted field path
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BitflagTable {
    tables: BTreeMap<String, FlagSet>,
}

impl BitflagTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the table for `path`
    ///
    /// Fails on a path that already has a table or on a zero mask.
    pub fn insert(&mut self, path: impl Into<String>, entries: Vec<(u64, String)>) -> Result<()> {
        let path = path.into();

        if let Some((_, name)) = entries.iter().find(|(mask, _)| *mask == 0) {
            return Err(Error::config(format!(
                "flag '{}' in table '{}' has a zero mask",
                name, path
            )));
        }
        if self.tables.contains_key(&path) {
            return Err(Error::config(format!(
                "duplicate bitflag table for '{}'",
                path
            )));
        }

        self.tables.insert(path, FlagSet::new(entries));
        Ok(())
    }

    pub fn get(&self, path: &str) -> Option<&FlagSet> {
        self.tables.get(path)
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}
