//! Column-aligned table preview

use crate::error::{Error, Result};
use crate::record::{join_entries, DecodedValue, RootRecord};

/// Marker for a collection with no elements
const EMPTY_LIST: &str = "<empty>";

/// Flatten one top-level value into a single cell
///
/// Lists become `k=v | k=v; k=v | k=v`, or `<empty>` when they have no
/// elements.
pub fn render_cell(value: &DecodedValue) -> String {
    match value {
        DecodedValue::List(items) if items.is_empty() => EMPTY_LIST.to_string(),
        DecodedValue::List(items) => join_entries(items),
        other => other.to_string(),
    }
}

/// Render `columns` of every record as an aligned table
///
/// Fails if a column does not name a field of the records.
pub fn render_table(records: &[RootRecord], columns: &[String]) -> Result<String> {
    let rows = records
        .iter()
        .map(|root| {
            columns
                .iter()
                .map(|column| {
                    root.record.get(column).map(render_cell).ok_or_else(|| {
                        Error::config(format!("table column '{}' is not a decoded field", column))
                    })
                })
                .collect::<Result<Vec<_>>>()
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(format_table(columns, &rows))
}

/// Lay out `headers` and `rows` with every column padded to its widest cell
pub fn format_table(headers: &[String], rows: &[Vec<String>]) -> String {
    let widths: Vec<usize> = headers
        .iter()
        .enumerate()
        .map(|(i, header)| {
            rows.iter()
                .filter_map(|row| row.get(i))
                .map(|cell| cell.chars().count())
                .chain(std::iter::once(header.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let format_row = |cells: &[String]| -> String {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, &width)| format!("{:<width$}", cell, width = width))
            .collect::<Vec<_>>()
            .join(" | ")
    };

    let mut out = String::new();
    out.push_str(&format_row(headers));
    out.push('\n');
    out.push_str(
        &widths
            .iter()
            .map(|&w| "-".repeat(w))
            .collect::<Vec<_>>()
            .join("-+-"),
    );
    out.push('\n');
    for row in rows {
        out.push_str(&format_row(row.as_slice()));
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::DecodedRecord;

    fn root(index: usize, description: &str, members: Vec<DecodedRecord>) -> RootRecord {
        let mut record = DecodedRecord::default();
        record.push("description", DecodedValue::text(description));
        record.push("Members", DecodedValue::List(members));
        RootRecord {
            index,
            address: 0x1000 + index as u64 * 0x100,
            record,
        }
    }

    fn member(name: &str, flags: &str) -> DecodedRecord {
        let mut record = DecodedRecord::default();
        record.push("name", DecodedValue::text(name));
        record.push("flags", DecodedValue::text(flags));
        record
    }

    #[test]
    fn test_column_widths_and_padding() {
        let headers = vec!["a".to_string(), "longer".to_string()];
        let rows = vec![
            vec!["xyz".to_string(), "1".to_string()],
            vec!["q".to_string(), "22".to_string()],
        ];

        let table = format_table(&headers, &rows);
        let lines: Vec<&str> = table.lines().collect();

        assert_eq!(lines[0], "a   | longer");
        assert_eq!(lines[1], "----+-------");
        assert_eq!(lines[2], "xyz | 1     ");
        assert_eq!(lines[3], "q   | 22    ");
    }

    #[test]
    fn test_width_counts_characters() {
        let headers = vec!["n".to_string()];
        let rows = vec![vec!["äö".to_string()], vec!["a".to_string()]];

        let table = format_table(&headers, &rows);
        assert_eq!(table.lines().nth(3), Some("a "));
    }

    #[test]
    fn test_render_cell_flattens_lists() {
        let members = DecodedValue::List(vec![member("mA", "0x1"), member("mB", "BaseClass")]);
        assert_eq!(
            render_cell(&members),
            "name=mA | flags=0x1; name=mB | flags=BaseClass"
        );
        assert_eq!(render_cell(&DecodedValue::List(Vec::new())), "<empty>");
        assert_eq!(render_cell(&DecodedValue::Null), "none");
    }

    #[test]
    fn test_render_table() {
        let records = vec![
            root(0, "class Foo", vec![member("m", "0x0")]),
            root(1, "Bar", Vec::new()),
        ];
        let columns = vec!["description".to_string(), "Members".to_string()];

        let table = render_table(&records, &columns).unwrap();
        let lines: Vec<&str> = table.lines().collect();

        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "description | Members           ");
        assert_eq!(lines[2], "class Foo   | name=m | flags=0x0");
        assert_eq!(lines[3], "Bar         | <empty>           ");
    }

    #[test]
    fn test_render_table_unknown_column() {
        let records = vec![root(0, "Foo", Vec::new())];
        assert!(render_table(&records, &["size".to_string()]).is_err());
    }
}
