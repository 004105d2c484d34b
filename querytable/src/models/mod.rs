//! Domain models shared by every stage of the build.
//!
//! - [`Row`] - One fetched row, keyed by column name
//! - [`cell_text`] - Canonical text form of a cell value
//!
//! Cell values are plain [`serde_json::Value`]s so that sources can hand over
//! numbers, booleans and nulls without losing their type, while matchers and
//! renderers agree on a single textual rendering.

use serde_json::{Map, Value};
use std::borrow::Cow;

/// One row as delivered by a data source: column name to cell value.
pub type Row = Map<String, Value>;

/// Build a row from parallel column and value lists.
///
/// Extra values are dropped; missing ones become `null`.
pub fn row_from_values<S: AsRef<str>>(columns: &[S], values: Vec<Value>) -> Row {
    let mut values = values.into_iter();
    columns
        .iter()
        .map(|col| (col.as_ref().to_string(), values.next().unwrap_or(Value::Null)))
        .collect()
}

/// Text form used for matching and rendering.
///
/// Strings are returned as-is, numbers and booleans use their JSON text,
/// `null` renders as the empty string and arrays/objects as compact JSON.
pub fn cell_text(value: &Value) -> Cow<'_, str> {
    match value {
        Value::String(s) => Cow::Borrowed(s.as_str()),
        Value::Null => Cow::Borrowed(""),
        Value::Number(n) => Cow::Owned(n.to_string()),
        Value::Bool(b) => Cow::Borrowed(if *b { "true" } else { "false" }),
        other => Cow::Owned(other.to_string()),
    }
}

/// Whether a cell renders as nothing.
pub fn is_empty_cell(value: &Value) -> bool {
    cell_text(value).is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_cell_text_forms() {
        assert_eq!(cell_text(&json!("R1C1")), "R1C1");
        assert_eq!(cell_text(&json!(42)), "42");
        assert_eq!(cell_text(&json!(1.5)), "1.5");
        assert_eq!(cell_text(&json!(true)), "true");
        assert_eq!(cell_text(&Value::Null), "");
        assert_eq!(cell_text(&json!([1, 2])), "[1,2]");
    }

    #[test]
    fn test_row_from_values_pads_and_truncates() {
        let row = row_from_values(&["a", "b", "c"], vec![json!(1), json!(2)]);
        assert_eq!(row["a"], 1);
        assert_eq!(row["b"], 2);
        assert_eq!(row["c"], Value::Null);

        let row = row_from_values(&["a"], vec![json!(1), json!(2)]);
        assert_eq!(row.len(), 1);
    }

    #[test]
    fn test_is_empty_cell() {
        assert!(is_empty_cell(&Value::Null));
        assert!(is_empty_cell(&json!("")));
        assert!(!is_empty_cell(&json!(" ")));
        assert!(!is_empty_cell(&json!(0)));
    }
}
