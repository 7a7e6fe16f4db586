//! Decoded Records
//!
//! Output of the walker: ordered field maps whose values are rendered
//! strings, sentinels, or nested record lists.

use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use std::fmt;

/// Value of one decoded field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodedValue {
    /// Rendered scalar, string, boolean, or flag set
    Text(String),
    /// Null string pointer
    Null,
    /// Field type the decoder cannot handle
    Unsupported(String),
    /// The field could not be read
    Fault(String),
    /// Elements of a collection, in pointer-chain order
    List(Vec<DecodedRecord>),
}

impl DecodedValue {
    pub fn text(s: impl Into<String>) -> Self {
        Self::Text(s.into())
    }

    pub fn as_list(&self) -> Option<&[DecodedRecord]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn is_fault(&self) -> bool {
        matches!(self, Self::Fault(_))
    }
}

impl fmt::Display for DecodedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::Null => f.write_str("none"),
            Self::Unsupported(_) => f.write_str("unsupported"),
            Self::Fault(reason) => write!(f, "<error: {}>", reason),
            Self::List(items) => write!(f, "[{}]", join_entries(items)),
        }
    }
}

impl Serialize for DecodedValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            other => serializer.collect_str(other),
        }
    }
}

/// Entries joined as `k=v | k=v; k=v | k=v`
pub(crate) fn join_entries(items: &[DecodedRecord]) -> String {
    items
        .iter()
        .map(DecodedRecord::display_pairs)
        .collect::<Vec<_>>()
        .join("; ")
}

/// One decoded struct instance, fields in declaration order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecodedRecord {
    fields: Vec<(String, DecodedValue)>,
}

impl DecodedRecord {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            fields: Vec::with_capacity(capacity),
        }
    }

    pub(crate) fn push(&mut self, name: impl Into<String>, value: DecodedValue) {
        self.fields.push((name.into(), value));
    }

    pub fn get(&self, name: &str) -> Option<&DecodedValue> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &DecodedValue)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// `name=value` pairs joined with `" | "`
    pub fn display_pairs(&self) -> String {
        self.iter()
            .map(|(name, value)| format!("{}={}", name, value))
            .collect::<Vec<_>>()
            .join(" | ")
    }
}

impl FromIterator<(String, DecodedValue)> for DecodedRecord {
    fn from_iter<I: IntoIterator<Item = (String, DecodedValue)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

impl Serialize for DecodedRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// A top-level record produced by root enumeration
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RootRecord {
    #[serde(rename = "Index")]
    pub index: usize,
    #[serde(rename = "Address", serialize_with = "serialize_address")]
    pub address: u64,
    #[serde(rename = "Data")]
    pub record: DecodedRecord,
}

fn serialize_address<S: Serializer>(address: &u64, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(&format_args!("0x{:08X}", address))
}
