//! Output for decoded records
//!
//! - `json` - nested document of `{Index, Address, Data}` entries
//! - `table` - column-aligned text preview over selected top-level fields

mod json;
mod table;

pub use json::{to_json_string, write_json};
pub use table::{format_table, render_cell, render_table};
