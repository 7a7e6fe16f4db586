//! Schema Model
//!
//! Declarative struct layouts as a typed tree of field specifications.
//! Offsets are relative to the base address of the struct instance being
//! decoded. Every field carries its dotted path from the root struct
//! (`Members.flags`), which is the key used by the bitflag table.

use crate::bitflags::BitflagTable;
use crate::error::{Error, Result};
use crate::source::Endian;

use std::collections::HashSet;
use std::fmt::Write as _;

/// How a collection field follows its pointer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainMode {
    /// Dereference once; at most one element
    Single,
    /// Follow the pointer stored at `element + next_offset` until null or a cycle
    LinkedList { next_offset: u64 },
}

impl ChainMode {
    /// Map a raw `next_offset` to a chain mode; any negative value is the
    /// single-pointer sentinel
    pub fn from_next_offset(next_offset: i64) -> Self {
        match u64::try_from(next_offset) {
            Ok(next_offset) => Self::LinkedList { next_offset },
            Err(_) => Self::Single,
        }
    }
}

/// A pointer to one element or a linked list of elements
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionSpec {
    pub offset: u64,
    pub chain: ChainMode,
    pub element: StructSchema,
    /// Upper bound on decoded elements for one collection instance
    pub max_elements: usize,
}

/// Field discriminant
#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    Scalar {
        offset: u64,
        width: usize,
        endian: Endian,
    },
    Bitflag {
        offset: u64,
        width: usize,
        endian: Endian,
    },
    StringRef {
        offset: u64,
    },
    Bool {
        offset: u64,
    },
    Collection(CollectionSpec),
    /// A field type the decoder does not know; rendered as a sentinel
    Unsupported {
        kind: String,
    },
}

impl FieldKind {
    pub fn scalar(offset: u64) -> Self {
        Self::Scalar {
            offset,
            width: 4,
            endian: Endian::Little,
        }
    }

    pub fn bitflag(offset: u64) -> Self {
        Self::Bitflag {
            offset,
            width: 4,
            endian: Endian::Little,
        }
    }

    pub fn single(offset: u64, element: StructSchema) -> Self {
        Self::Collection(CollectionSpec {
            offset,
            chain: ChainMode::Single,
            element,
            max_elements: crate::config::DEFAULT_MAX_ELEMENTS,
        })
    }

    pub fn linked_list(offset: u64, next_offset: u64, element: StructSchema) -> Self {
        Self::Collection(CollectionSpec {
            offset,
            chain: ChainMode::LinkedList { next_offset },
            element,
            max_elements: crate::config::DEFAULT_MAX_ELEMENTS,
        })
    }

    /// Short type name used in listings
    pub fn type_name(&self) -> &str {
        match self {
            Self::Scalar { .. } => "int",
            Self::Bitflag { .. } => "flags",
            Self::StringRef { .. } => "string",
            Self::Bool { .. } => "bool",
            Self::Collection(spec) => match spec.chain {
                ChainMode::Single => "pointer",
                ChainMode::LinkedList { .. } => "list",
            },
            Self::Unsupported { kind } => kind,
        }
    }

    fn is_integer(&self) -> bool {
        matches!(self, Self::Scalar { .. } | Self::Bitflag { .. })
    }
}

/// One named field of a struct layout
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    pub name: String,
    /// Dotted path from the root struct
    pub path: String,
    pub kind: FieldKind,
}

impl FieldSpec {
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        let name = name.into();
        Self {
            path: name.clone(),
            name,
            kind,
        }
    }
}

/// Ordered field list describing one struct layout
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StructSchema {
    pub fields: Vec<FieldSpec>,
}

impl StructSchema {
    /// Build a root layout, assigning dotted paths to every nested field
    pub fn new(fields: Vec<FieldSpec>) -> Self {
        let mut schema = Self { fields };
        schema.assign_paths(None);
        schema
    }

    fn assign_paths(&mut self, prefix: Option<&str>) {
        for field in &mut self.fields {
            field.path = match prefix {
                Some(prefix) => format!("{}.{}", prefix, field.name),
                None => field.name.clone(),
            };
            if let FieldKind::Collection(spec) = &mut field.kind {
                spec.element.assign_paths(Some(&field.path));
            }
        }
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// All fields in the tree, depth-first in declaration order
    pub fn all_fields(&self) -> Vec<&FieldSpec> {
        let mut out = Vec::new();
        self.collect_fields(&mut out);
        out
    }

    fn collect_fields<'a>(&'a self, out: &mut Vec<&'a FieldSpec>) {
        for field in &self.fields {
            out.push(field);
            if let FieldKind::Collection(spec) = &field.kind {
                spec.element.collect_fields(out);
            }
        }
    }

    /// Structural validation against the flag table
    ///
    /// Rejects duplicate field paths, integer widths outside 1..=8 bytes,
    /// bitflag fields without a table, table entries that do not name an
    /// integer field, and collections with a zero element bound.
    pub fn validate(&self, bitflags: &BitflagTable) -> Result<()> {
        let fields = self.all_fields();
        let mut seen = HashSet::new();

        for field in &fields {
            if field.name.is_empty() {
                return Err(Error::config("field with an empty name"));
            }
            if !seen.insert(field.path.as_str()) {
                return Err(Error::config(format!(
                    "duplicate field path '{}'",
                    field.path
                )));
            }

            match &field.kind {
                FieldKind::Scalar { width, .. } | FieldKind::Bitflag { width, .. }
                    if !(1..=8).contains(width) =>
                {
                    return Err(Error::config(format!(
                        "field '{}' has unsupported width {}",
                        field.path, width
                    )));
                }
                FieldKind::Bitflag { .. } if bitflags.get(&field.path).is_none() => {
                    return Err(Error::config(format!(
                        "flags field '{}' has no bitflag table",
                        field.path
                    )));
                }
                FieldKind::Collection(spec) if spec.max_elements == 0 => {
                    return Err(Error::config(format!(
                        "collection '{}' has max_elements 0",
                        field.path
                    )));
                }
                FieldKind::Unsupported { kind } => {
                    tracing::warn!(
                        "Field '{}' has unsupported type '{}'; it will be rendered as a sentinel",
                        field.path,
                        kind
                    );
                }
                _ => {}
            }
        }

        for path in bitflags.paths() {
            let target = fields.iter().find(|f| f.path == path);
            if !target.is_some_and(|f| f.kind.is_integer()) {
                return Err(Error::config(format!(
                    "bitflag table '{}' does not match an integer field",
                    path
                )));
            }
        }

        Ok(())
    }

    /// Indented listing of the layout tree
    pub fn describe(&self) -> String {
        let mut out = String::new();
        self.describe_into(&mut out, 0);
        out
    }

    fn describe_into(&self, out: &mut String, depth: usize) {
        let indent = "  ".repeat(depth);
        for field in &self.fields {
            let _ = match &field.kind {
                FieldKind::Scalar {
                    offset,
                    width,
                    endian,
                }
                | FieldKind::Bitflag {
                    offset,
                    width,
                    endian,
                } => writeln!(
                    out,
                    "{}+{:#x} {} ({}, {} bytes, {:?})",
                    indent,
                    offset,
                    field.name,
                    field.kind.type_name(),
                    width,
                    endian
                ),
                FieldKind::StringRef { offset } | FieldKind::Bool { offset } => writeln!(
                    out,
                    "{}+{:#x} {} ({})",
                    indent,
                    offset,
                    field.name,
                    field.kind.type_name()
                ),
                FieldKind::Collection(spec) => {
                    let chain = match spec.chain {
                        ChainMode::Single => "single".to_string(),
                        ChainMode::LinkedList { next_offset } => {
                            format!("next at +{:#x}", next_offset)
                        }
                    };
                    writeln!(
                        out,
                        "{}+{:#x} {} ({}, {})",
                        indent,
                        spec.offset,
                        field.name,
                        field.kind.type_name(),
                        chain
                    )
                }
                FieldKind::Unsupported { kind } => {
                    writeln!(out, "{}? {} (unsupported: {})", indent, field.name, kind)
                }
            };

            if let FieldKind::Collection(spec) = &field.kind {
                spec.element.describe_into(out, depth + 1);
            }
        }
    }
}
