use crate::flatten::path::KeyPath;
use serde_json::Value;

/// The outcome of resolving one key-path against one item.
///
/// `Resolved(Value::Null)` means the path legitimately reached a JSON null;
/// `Absent` means the path could not be followed to the end. Exporters must
/// be able to tell the two apart, so null is never reused as the sentinel.
#[derive(Debug, Clone, PartialEq)]
pub enum Extracted {
    Resolved(Value),
    Absent,
}

impl Extracted {
    pub fn is_absent(&self) -> bool {
        matches!(self, Extracted::Absent)
    }

    /// The resolved value, if any.
    pub fn value(&self) -> Option<&Value> {
        match self {
            Extracted::Resolved(v) => Some(v),
            Extracted::Absent => None,
        }
    }
}

/// One flattened row. Values are aligned with the owning table's columns.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    values: Vec<Extracted>,
}

impl Record {
    pub fn new(values: Vec<Extracted>) -> Self {
        Record { values }
    }

    pub fn values(&self) -> &[Extracted] {
        &self.values
    }

    pub fn get(&self, column: usize) -> Option<&Extracted> {
        self.values.get(column)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// An ordered collection of records sharing one column schema.
///
/// Every record has exactly one value per column, in column order, so the
/// table is rectangular by construction.
#[derive(Debug, Clone)]
pub struct Table {
    columns: Vec<KeyPath>,
    rows: Vec<Record>,
}

impl Table {
    /// # Panics
    ///
    /// Panics if any row's width differs from the column count.
    pub fn new(columns: Vec<KeyPath>, rows: Vec<Record>) -> Self {
        assert!(
            rows.iter().all(|r| r.len() == columns.len()),
            "every record must have one value per column"
        );
        Table { columns, rows }
    }

    pub fn columns(&self) -> &[KeyPath] {
        &self.columns
    }

    pub fn rows(&self) -> &[Record] {
        &self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Look up a column index by its dotted path string.
    pub fn column_index(&self, path: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.as_str() == path)
    }

    /// Append the rows of another table with the same column schema.
    ///
    /// # Panics
    ///
    /// Panics if the two tables' column schemas differ.
    pub fn append(&mut self, other: Table) {
        assert_eq!(
            self.columns, other.columns,
            "appended table must share the column schema"
        );
        self.rows.extend(other.rows);
    }
}
