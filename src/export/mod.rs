//! Downstream exporters - persist tables and raw API snapshots
//!
//! CSV collapses absent and null to empty cells; JSON lines keeps the
//! distinction (absent columns are omitted, nulls written explicitly).

pub mod csv;
pub mod json;

pub use self::csv::{write_table, write_table_to_path};
pub use json::{dated_filename, write_snapshot, write_table_jsonl};
