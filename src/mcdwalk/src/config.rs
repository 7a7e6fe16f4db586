//! Walk Configuration
//!
//! A walk is described by a YAML or TOML file naming the dump, the root
//! address, pointer layout, limits, bitflag tables, and the field layout.
//! The file is parsed into raw serde structs, then converted into an
//! immutable, validated `WalkConfig` that is passed to every traversal.
//!
//! ```yaml
//! dump: bone1.bin
//! base_address: 0x9F35F8
//! next_offset: 168
//! bitflags:
//!   - path: flags
//!     flags:
//!       - { mask: 0x01, name: Registered }
//! fields:
//!   - { name: description, kind: string, offset: 12 }
//!   - { name: flags, kind: int, offset: 4 }
//!   - name: Members
//!     kind: array
//!     offset: 160
//!     next_offset: 24
//!     fields:
//!       - { name: name, kind: string, offset: 4 }
//! ```

use crate::bitflags::BitflagTable;
use crate::error::{Error, Result};
use crate::schema::{ChainMode, CollectionSpec, FieldKind, FieldSpec, StructSchema};
use crate::source::{Endian, PointerLayout};

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_MAX_RECORDS: usize = 3000;
pub const DEFAULT_MAX_STRING_LEN: usize = 256;
pub const DEFAULT_MAX_ELEMENTS: usize = 4096;

/// Everything a walk needs besides the dump itself
#[derive(Debug, Clone, PartialEq)]
pub struct WalkConfig {
    /// Dump file named by the configuration, if any
    pub dump: Option<PathBuf>,
    /// Absolute address of the first top-level record, used as given
    pub base_address: u64,
    pub pointer: PointerLayout,
    /// Offset of the `next` pointer inside a top-level record
    pub next_offset: u64,
    pub max_records: usize,
    pub max_string_len: usize,
    pub schema: StructSchema,
    pub bitflags: BitflagTable,
    /// Top-level fields shown in the table preview, in display order
    pub table: Vec<String>,
    pub output: Option<PathBuf>,
}

impl WalkConfig {
    /// Create a configuration with default limits and a 4-byte little-endian
    /// pointer layout
    pub fn new(base_address: u64, next_offset: u64, schema: StructSchema) -> Self {
        Self {
            dump: None,
            base_address,
            pointer: PointerLayout::default(),
            next_offset,
            max_records: DEFAULT_MAX_RECORDS,
            max_string_len: DEFAULT_MAX_STRING_LEN,
            schema,
            bitflags: BitflagTable::new(),
            table: Vec::new(),
            output: None,
        }
    }

    pub fn with_bitflags(mut self, bitflags: BitflagTable) -> Self {
        self.bitflags = bitflags;
        self
    }

    pub fn with_pointer(mut self, pointer: PointerLayout) -> Self {
        self.pointer = pointer;
        self
    }

    pub fn with_base_address(mut self, base_address: u64) -> Self {
        self.base_address = base_address;
        self
    }

    pub fn with_max_records(mut self, max_records: usize) -> Self {
        self.max_records = max_records;
        self
    }

    pub fn with_max_string_len(mut self, max_string_len: usize) -> Self {
        self.max_string_len = max_string_len;
        self
    }

    pub fn with_table(mut self, columns: Vec<String>) -> Self {
        self.table = columns;
        self
    }

    /// Load a configuration file; `.yaml`/`.yml` is read as YAML, anything
    /// else as TOML. Relative `dump` and `output` paths are resolved against
    /// the file's directory.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;

        let is_yaml = matches!(
            path.extension().and_then(|e| e.to_str()),
            Some("yaml" | "yml")
        );
        let mut config = if is_yaml {
            Self::from_yaml_str(&contents)?
        } else {
            Self::from_toml_str(&contents)?
        };

        if let Some(dir) = path.parent() {
            config.dump = config.dump.map(|p| dir.join(p));
            config.output = config.output.map(|p| dir.join(p));
        }

        tracing::debug!(
            "Loaded walk config {}: {} top-level fields, {} flag tables",
            path.display(),
            config.schema.len(),
            config.bitflags.len()
        );

        Ok(config)
    }

    pub fn from_yaml_str(contents: &str) -> Result<Self> {
        let raw: RawWalkFile =
            serde_yaml::from_str(contents).map_err(|e| Error::Parse(e.to_string()))?;
        raw.into_config()
    }

    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let raw: RawWalkFile =
            toml::from_str(contents).map_err(|e| Error::Parse(e.to_string()))?;
        raw.into_config()
    }

    /// Structural validation run before any traversal
    pub fn validate(&self) -> Result<()> {
        if !matches!(self.pointer.width, 4 | 8) {
            return Err(Error::config(format!(
                "pointer width must be 4 or 8, got {}",
                self.pointer.width
            )));
        }
        if self.max_string_len == 0 {
            return Err(Error::config("max_string_len must be positive"));
        }

        self.schema.validate(&self.bitflags)?;

        for column in &self.table {
            if self.schema.field(column).is_none() {
                return Err(Error::config(format!(
                    "table column '{}' is not a top-level field",
                    column
                )));
            }
        }

        Ok(())
    }
}

/// Integer given either as a number or as a decimal/`0x` hex string
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum RawNumber {
    Unsigned(u64),
    Signed(i64),
    Text(String),
}

impl RawNumber {
    fn to_i128(&self) -> Option<i128> {
        match self {
            Self::Unsigned(n) => Some(i128::from(*n)),
            Self::Signed(n) => Some(i128::from(*n)),
            Self::Text(text) => parse_int(text),
        }
    }

    fn to_u64(&self, what: &str) -> Result<u64> {
        self.to_i128()
            .and_then(|n| u64::try_from(n).ok())
            .ok_or_else(|| {
                Error::config(format!("{} is not a valid unsigned integer: {:?}", what, self))
            })
    }

    fn to_usize(&self, what: &str) -> Result<usize> {
        let n = self.to_u64(what)?;
        usize::try_from(n).map_err(|_| Error::config(format!("{} is too large: {}", what, n)))
    }

    fn to_i64(&self, what: &str) -> Result<i64> {
        self.to_i128()
            .and_then(|n| i64::try_from(n).ok())
            .ok_or_else(|| {
                Error::config(format!("{} is not a valid integer: {:?}", what, self))
            })
    }
}

/// Parse an address given as decimal or `0x` hex, as accepted in walk files
pub fn parse_address(text: &str) -> Result<u64> {
    parse_int(text)
        .and_then(|n| u64::try_from(n).ok())
        .ok_or_else(|| Error::Parse(format!("invalid address {:?}", text.trim())))
}

/// Parse `123`, `-1`, `0x1F`, or `0X1f`
fn parse_int(text: &str) -> Option<i128> {
    let text = text.trim().replace('_', "");
    let (negative, digits) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text.as_str()),
    };

    let value = match digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
    {
        Some(hex) => i128::from_str_radix(hex, 16).ok()?,
        None => digits.parse::<i128>().ok()?,
    };

    Some(if negative { -value } else { value })
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawWalkFile {
    dump: Option<PathBuf>,
    base_address: Option<RawNumber>,
    pointer_width: Option<RawNumber>,
    #[serde(default)]
    endian: Endian,
    next_offset: RawNumber,
    max_records: Option<RawNumber>,
    max_string_len: Option<RawNumber>,
    max_elements: Option<RawNumber>,
    output: Option<PathBuf>,
    #[serde(default)]
    table: Vec<String>,
    #[serde(default)]
    bitflags: Vec<RawFlagTable>,
    fields: Vec<RawField>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawFlagTable {
    path: String,
    flags: Vec<RawFlag>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawFlag {
    mask: RawNumber,
    name: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawField {
    name: String,
    kind: String,
    offset: Option<RawNumber>,
    width: Option<RawNumber>,
    endian: Option<Endian>,
    next_offset: Option<RawNumber>,
    max_elements: Option<RawNumber>,
    fields: Option<Vec<RawField>>,
}

/// Defaults inherited by every field while converting the raw tree
struct FieldDefaults {
    endian: Endian,
    max_elements: usize,
}

impl RawWalkFile {
    fn into_config(self) -> Result<WalkConfig> {
        let defaults = FieldDefaults {
            endian: self.endian,
            max_elements: optional_usize(&self.max_elements, "max_elements")?
                .unwrap_or(DEFAULT_MAX_ELEMENTS),
        };

        let mut bitflags = BitflagTable::new();
        for table in self.bitflags {
            let entries = table
                .flags
                .into_iter()
                .map(|flag| -> Result<(u64, String)> {
                    let what = format!("mask of flag '{}'", flag.name);
                    Ok((flag.mask.to_u64(&what)?, flag.name))
                })
                .collect::<Result<Vec<_>>>()?;
            bitflags.insert(table.path, entries)?;
        }

        let fields = convert_fields(self.fields, "", &defaults)?;

        let config = WalkConfig {
            dump: self.dump,
            base_address: match &self.base_address {
                Some(n) => n.to_u64("base_address")?,
                None => 0,
            },
            pointer: PointerLayout {
                width: optional_usize(&self.pointer_width, "pointer_width")?.unwrap_or(4),
                endian: self.endian,
            },
            next_offset: self.next_offset.to_u64("next_offset")?,
            max_records: optional_usize(&self.max_records, "max_records")?
                .unwrap_or(DEFAULT_MAX_RECORDS),
            max_string_len: optional_usize(&self.max_string_len, "max_string_len")?
                .unwrap_or(DEFAULT_MAX_STRING_LEN),
            schema: StructSchema::new(fields),
            bitflags,
            table: self.table,
            output: self.output,
        };

        config.validate()?;
        Ok(config)
    }
}

fn optional_usize(value: &Option<RawNumber>, what: &str) -> Result<Option<usize>> {
    value.as_ref().map(|n| n.to_usize(what)).transpose()
}

fn convert_fields(
    raw: Vec<RawField>,
    prefix: &str,
    defaults: &FieldDefaults,
) -> Result<Vec<FieldSpec>> {
    raw.into_iter()
        .map(|field| convert_field(field, prefix, defaults))
        .collect()
}

fn convert_field(raw: RawField, prefix: &str, defaults: &FieldDefaults) -> Result<FieldSpec> {
    let path = if prefix.is_empty() {
        raw.name.clone()
    } else {
        format!("{}.{}", prefix, raw.name)
    };

    let offset = || -> Result<u64> {
        raw.offset
            .as_ref()
            .ok_or_else(|| Error::config(format!("field '{}' is missing `offset`", path)))?
            .to_u64(&format!("offset of '{}'", path))
    };
    let width = || -> Result<usize> {
        Ok(optional_usize(&raw.width, &format!("width of '{}'", path))?.unwrap_or(4))
    };
    let endian = raw.endian.unwrap_or(defaults.endian);

    let kind = match raw.kind.as_str() {
        "int" | "uint" | "scalar" => FieldKind::Scalar {
            offset: offset()?,
            width: width()?,
            endian,
        },
        "flags" | "bitflag" => FieldKind::Bitflag {
            offset: offset()?,
            width: width()?,
            endian,
        },
        "string" => FieldKind::StringRef { offset: offset()? },
        "bool" => FieldKind::Bool { offset: offset()? },
        "array" | "collection" => {
            let chain = match &raw.next_offset {
                Some(n) => {
                    ChainMode::from_next_offset(n.to_i64(&format!("next_offset of '{}'", path))?)
                }
                None => ChainMode::Single,
            };
            let what = format!("max_elements of '{}'", path);
            let max_elements =
                optional_usize(&raw.max_elements, &what)?.unwrap_or(defaults.max_elements);
            let Some(element_fields) = raw.fields else {
                return Err(Error::config(format!(
                    "collection '{}' is missing `fields`",
                    path
                )));
            };

            FieldKind::Collection(CollectionSpec {
                offset: offset()?,
                chain,
                element: StructSchema {
                    fields: convert_fields(element_fields, &path, defaults)?,
                },
                max_elements,
            })
        }
        other => FieldKind::Unsupported {
            kind: other.to_string(),
        },
    };

    Ok(FieldSpec {
        name: raw.name,
        path,
        kind,
    })
}
