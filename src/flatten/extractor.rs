use crate::flatten::path::{KeyPath, PathError};
use crate::flatten::types::{Extracted, Record, Table};
use serde_json::Value;

/// Walk a key-path through a nested JSON value.
///
/// At each segment the cursor's runtime type decides the reading:
/// an all-digit segment indexes the cursor only when the cursor is an
/// array; against an object it is an ordinary key lookup. Any miss
/// (out-of-bounds index, missing key, scalar or null cursor) ends the
/// walk immediately with `None`. Resolution never fails with an error.
pub fn resolve<'a>(value: &'a Value, path: &KeyPath) -> Option<&'a Value> {
    let mut cursor = value;

    for segment in path.segments() {
        cursor = match (segment.as_index(), cursor) {
            (Some(idx), Value::Array(arr)) => arr.get(idx)?,
            (_, Value::Object(map)) => map.get(segment.key())?,
            _ => return None,
        };
    }

    Some(cursor)
}

/// Resolve a path to an owned [`Extracted`], keeping a reached JSON null
/// distinguishable from an unresolvable path.
pub fn extract(value: &Value, path: &KeyPath) -> Extracted {
    match resolve(value, path) {
        Some(v) => Extracted::Resolved(v.clone()),
        None => Extracted::Absent,
    }
}

/// Flattens heterogeneous JSON items into records with a fixed column set.
///
/// The column paths are parsed and validated once at construction; after
/// that, flattening any batch of items cannot fail. Paths that never
/// resolve for any item are fine and simply yield absent columns.
pub struct Flattener {
    columns: Vec<KeyPath>,
}

impl Flattener {
    /// Build a flattener from dotted path strings, preserving order.
    ///
    /// This is the only place path validation happens; malformed paths
    /// (empty string, doubled dots) are rejected here.
    pub fn new<S: AsRef<str>>(paths: &[S]) -> Result<Self, PathError> {
        Ok(Flattener {
            columns: KeyPath::parse_all(paths)?,
        })
    }

    pub fn from_paths(columns: Vec<KeyPath>) -> Self {
        Flattener { columns }
    }

    pub fn columns(&self) -> &[KeyPath] {
        &self.columns
    }

    /// Flatten one item into a record with exactly one value per column,
    /// in column order. Unresolvable paths store `Absent`, so every record
    /// keeps the same tabular shape regardless of the item's shape.
    pub fn record(&self, item: &Value) -> Record {
        let values = self
            .columns
            .iter()
            .map(|path| extract(item, path))
            .collect();
        Record::new(values)
    }

    /// Flatten a batch of items into a table, preserving item order.
    ///
    /// No item can abort the batch; an item with nothing extractable
    /// degrades to an all-absent row.
    pub fn table(&self, items: &[Value]) -> Table {
        let rows = items.iter().map(|item| self.record(item)).collect();
        Table::new(self.columns.clone(), rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn path(s: &str) -> KeyPath {
        KeyPath::parse(s).unwrap()
    }

    #[test]
    fn test_nested_index_resolves() {
        let v = json!({"a": {"b": [10, 20, 30]}});
        assert_eq!(extract(&v, &path("a.b.1")), Extracted::Resolved(json!(20)));
    }

    #[test]
    fn test_index_out_of_bounds_is_absent() {
        let v = json!({"a": {"b": [10, 20, 30]}});
        assert_eq!(extract(&v, &path("a.b.5")), Extracted::Absent);
    }

    #[test]
    fn test_missing_key_is_absent() {
        let v = json!({"a": {"b": 1}});
        assert_eq!(extract(&v, &path("a.c.d")), Extracted::Absent);
    }

    #[test]
    fn test_terminal_null_is_resolved_not_absent() {
        let v = json!({"a": null});
        assert_eq!(extract(&v, &path("a")), Extracted::Resolved(Value::Null));
    }

    #[test]
    fn test_traversal_through_null_is_absent() {
        let v = json!({"a": null});
        assert_eq!(extract(&v, &path("a.b")), Extracted::Absent);
    }

    #[test]
    fn test_scalar_cursor_is_absent() {
        let v = json!({"a": 42});
        assert_eq!(extract(&v, &path("a.b")), Extracted::Absent);
    }

    #[test]
    fn test_digit_segment_against_object_is_a_key_lookup() {
        // An all-digit segment only indexes when the cursor is an array.
        let v = json!({"a": {"0": "zero"}});
        assert_eq!(extract(&v, &path("a.0")), Extracted::Resolved(json!("zero")));

        let v = json!({"a": {"b": 1}});
        assert_eq!(extract(&v, &path("a.0")), Extracted::Absent);
    }

    #[test]
    fn test_non_digit_segment_against_array_is_absent() {
        let v = json!({"a": [1, 2, 3]});
        assert_eq!(extract(&v, &path("a.first")), Extracted::Absent);
    }

    #[test]
    fn test_null_root() {
        assert_eq!(extract(&Value::Null, &path("a")), Extracted::Absent);
    }

    #[test]
    fn test_extract_is_idempotent() {
        let v = json!({"a": {"b": [10, 20]}});
        let p = path("a.b.0");
        assert_eq!(extract(&v, &p), extract(&v, &p));
    }

    #[test]
    fn test_record_shape_is_stable_across_items() {
        let flattener = Flattener::new(&["x"]).unwrap();
        let table = flattener.table(&[json!({"x": 1}), json!({})]);

        assert_eq!(table.rows().len(), 2);
        assert_eq!(
            table.rows()[0].get(0),
            Some(&Extracted::Resolved(json!(1)))
        );
        assert_eq!(table.rows()[1].get(0), Some(&Extracted::Absent));
    }

    #[test]
    fn test_table_preserves_item_and_column_order() {
        let flattener = Flattener::new(&["b", "a"]).unwrap();
        let table = flattener.table(&[json!({"a": 1, "b": 2}), json!({"a": 3, "b": 4})]);

        let cols: Vec<_> = table.columns().iter().map(|c| c.as_str()).collect();
        assert_eq!(cols, ["b", "a"]);
        assert_eq!(
            table.rows()[1].values(),
            &[
                Extracted::Resolved(json!(4)),
                Extracted::Resolved(json!(3)),
            ]
        );
    }

    #[test]
    fn test_unparseable_item_degrades_to_all_absent() {
        let flattener = Flattener::new(&["a", "b.c"]).unwrap();
        let table = flattener.table(&[json!("just a string")]);

        assert!(table.rows()[0].values().iter().all(|v| v.is_absent()));
    }

    #[test]
    fn test_resolve_borrows_without_cloning() {
        let v = json!({"items": [{"title": "first"}]});
        let got = resolve(&v, &path("items.0.title")).unwrap();
        assert!(std::ptr::eq(got, &v["items"][0]["title"]));
    }
}
