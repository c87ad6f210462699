//! Key-path flattening - turn nested JSON into flat, tabular records
//!
//! This module resolves dotted key-paths (e.g. `pagemap.cse_image.0.src`)
//! against arbitrarily nested JSON and assembles the results into rectangular
//! tables suitable for CSV or JSON lines export.
//!
//! Resolution never errors: a path that cannot be followed yields a dedicated
//! absent marker, kept distinct from a resolved JSON null so exporters can
//! tell "the API said null" apart from "the field wasn't there".

pub mod extractor;
pub mod path;
pub mod types;

pub use extractor::{extract, resolve, Flattener};
pub use path::{KeyPath, PathError, Segment};
pub use types::{Extracted, Record, Table};
