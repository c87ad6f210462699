//! # Quarry - API results to tables
//!
//! A small toolkit for pulling structured records out of external REST APIs
//! (a corporate registry, a web search service) and flattening the nested
//! JSON responses into tabular CSV/JSON files.
//!
//! ## Modules
//!
//! - **flatten**: resolve dotted key-paths against nested JSON and build tables
//! - **fetch**: sequential, blocking fetchers for the two upstream APIs
//! - **export**: CSV, JSON lines, and raw snapshot writers
//!
//! ## Quick Start
//!
//! ```rust
//! use quarry::flatten::Flattener;
//! use serde_json::json;
//!
//! # fn main() -> anyhow::Result<()> {
//! let items = vec![
//!     json!({"title": "first", "pagemap": {"cse_image": [{"src": "a.png"}]}}),
//!     json!({"title": "second"}),
//! ];
//!
//! let flattener = Flattener::new(&["title", "pagemap.cse_image.0.src"])?;
//! let table = flattener.table(&items);
//!
//! // Both rows share the column set; the second row's image column is absent.
//! assert_eq!(table.rows().len(), 2);
//! assert!(table.rows()[1].get(1).unwrap().is_absent());
//! # Ok(())
//! # }
//! ```

use anyhow::{Context, Result};
use serde_json::Value;
use std::io::BufRead;

pub mod export;
pub mod fetch;
pub mod flatten;

// Re-export commonly used types for convenience
pub use fetch::{FetchError, RegistryClient, RegistryConfig, SearchClient, SearchConfig};
pub use flatten::{Extracted, Flattener, KeyPath, PathError, Record, Table};

/// Flatten a stream of newline-delimited JSON items into a table.
pub fn flatten_ndjson<R: BufRead>(reader: R, flattener: &Flattener) -> Result<Table> {
    let mut items = Vec::new();

    for line in reader.lines() {
        let line = line.context("Failed to read line")?;
        if line.trim().is_empty() {
            continue;
        }
        let value: Value = serde_json::from_str(&line).context("Failed to parse JSON")?;
        items.push(value);
    }

    Ok(flattener.table(&items))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_flatten_ndjson() {
        let input = "{\"x\": 1}\n\n{\"y\": 2}\n";
        let flattener = Flattener::new(&["x"]).unwrap();
        let table = flatten_ndjson(input.as_bytes(), &flattener).unwrap();

        assert_eq!(table.rows().len(), 2);
        assert_eq!(table.rows()[0].get(0).unwrap().value(), Some(&json!(1)));
        assert!(table.rows()[1].get(0).unwrap().is_absent());
    }
}
