use crate::flatten::{Extracted, Table};
use anyhow::{Context, Result};
use serde_json::Value;
use std::io::Write;
use std::path::Path;

/// Write a table as CSV: one header row of key-paths, one row per record.
///
/// CSV has no way to distinguish an absent column from a resolved null, so
/// both render as an empty cell. Strings render bare; everything else
/// renders as compact JSON so nested values survive round-tripping.
pub fn write_table<W: Write>(table: &Table, writer: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);

    wtr.write_record(table.columns().iter().map(|c| c.as_str()))
        .context("Failed to write CSV header")?;

    for record in table.rows() {
        wtr.write_record(record.values().iter().map(cell))
            .context("Failed to write CSV row")?;
    }

    wtr.flush().context("Failed to flush CSV output")?;
    Ok(())
}

/// Write a table to a CSV file, creating parent directories as needed.
pub fn write_table_to_path<P: AsRef<Path>>(table: &Table, path: P) -> Result<()> {
    if let Some(parent) = path.as_ref().parent() {
        std::fs::create_dir_all(parent).context("Failed to create output directory")?;
    }
    let file = std::fs::File::create(&path)
        .with_context(|| format!("Failed to create {}", path.as_ref().display()))?;
    write_table(table, file)
}

fn cell(value: &Extracted) -> String {
    match value.value() {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flatten::Flattener;
    use serde_json::json;

    #[test]
    fn test_header_and_rows() {
        let flattener = Flattener::new(&["title", "meta.score"]).unwrap();
        let table = flattener.table(&[
            json!({"title": "first", "meta": {"score": 3}}),
            json!({"title": "second"}),
        ]);

        let mut buffer = Vec::new();
        write_table(&table, &mut buffer).unwrap();
        let output = String::from_utf8(buffer).unwrap();

        let lines: Vec<_> = output.lines().collect();
        assert_eq!(lines, ["title,meta.score", "first,3", "second,"]);
    }

    #[test]
    fn test_absent_and_null_collapse_to_empty_cells() {
        let flattener = Flattener::new(&["a", "b"]).unwrap();
        let table = flattener.table(&[json!({"a": null})]);

        let mut buffer = Vec::new();
        write_table(&table, &mut buffer).unwrap();
        let output = String::from_utf8(buffer).unwrap();

        assert_eq!(output.lines().nth(1), Some(","));
    }

    #[test]
    fn test_nested_values_render_as_json() {
        let flattener = Flattener::new(&["tags"]).unwrap();
        let table = flattener.table(&[json!({"tags": ["a", "b"]})]);

        let mut buffer = Vec::new();
        write_table(&table, &mut buffer).unwrap();
        let output = String::from_utf8(buffer).unwrap();

        // The csv crate quotes the embedded commas and doubles the quotes.
        assert_eq!(output.lines().nth(1), Some(r#""[""a"",""b""]""#));
    }
}
