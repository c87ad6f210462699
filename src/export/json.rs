use crate::flatten::Table;
use anyhow::{Context, Result};
use chrono::Local;
use serde::Serialize;
use serde_json::{Map, Value};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Write a table as JSON lines, one object per record.
///
/// JSON can represent the absent/null distinction, so it is preserved:
/// absent columns are omitted from the object while a resolved null is
/// written as an explicit `null`.
pub fn write_table_jsonl<W: Write>(table: &Table, mut writer: W) -> Result<()> {
    for record in table.rows() {
        let mut object = Map::new();
        for (column, value) in table.columns().iter().zip(record.values()) {
            if let Some(v) = value.value() {
                object.insert(column.as_str().to_string(), v.clone());
            }
        }
        let line =
            serde_json::to_string(&Value::Object(object)).context("Failed to serialize record")?;
        writeln!(writer, "{}", line).context("Failed to write record")?;
    }
    Ok(())
}

#[derive(Serialize)]
struct Snapshot<'a> {
    snapshot_ymd: String,
    snapshot_timestamp: String,
    response: &'a [Value],
}

/// Persist raw fetched items as a timestamped JSON document.
///
/// Creates `dir` if needed and returns the written path. The envelope keeps
/// the capture date alongside the untouched API items so a flattening run
/// can be replayed later without refetching.
pub fn write_snapshot<P: AsRef<Path>>(items: &[Value], dir: P, filename: &str) -> Result<PathBuf> {
    std::fs::create_dir_all(&dir).context("Failed to create snapshot directory")?;

    let now = Local::now();
    let snapshot = Snapshot {
        snapshot_ymd: now.format("%Y%m%d").to_string(),
        snapshot_timestamp: now.format("%Y/%m/%d %H:%M:%S").to_string(),
        response: items,
    };

    let path = dir.as_ref().join(filename);
    let file = std::fs::File::create(&path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    serde_json::to_writer_pretty(file, &snapshot).context("Failed to write snapshot")?;

    Ok(path)
}

/// The conventional `{prefix}_{YYYYMMDD}.{ext}` output name.
pub fn dated_filename(prefix: &str, extension: &str) -> String {
    format!(
        "{}_{}.{}",
        prefix,
        Local::now().format("%Y%m%d"),
        extension
    )
}
