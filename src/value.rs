use rusqlite::types::{Null, ToSqlOutput, ValueRef};
use rusqlite::ToSql;
use serde::{Serialize, Serializer};
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;
use std::fmt;

/// A scalar or nested value crossing the query surface.
///
/// `Absent` is the explicit missing marker produced by normalization. It is
/// distinct from `Null`, which is a stored SQL NULL.
#[derive(Debug, Clone)]
pub enum Value {
    Null,
    Absent,
    Integer(i64),
    Float(f64),
    Text(String),
    Boolean(bool),
    List(Vec<Value>),
    Map(BTreeMap<String, Value>),
}

impl Value {
    pub fn is_absent(&self) -> bool {
        matches!(self, Value::Absent)
    }

    /// Convert a JSON scalar into a value. Nested arrays and objects are
    /// carried as JSON text so tabular batches stay flat.
    pub fn from_json(json: &JsonValue) -> Value {
        match json {
            JsonValue::Null => Value::Null,
            JsonValue::Bool(b) => Value::Boolean(*b),
            JsonValue::Number(n) => match n.as_i64() {
                Some(i) => Value::Integer(i),
                None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            JsonValue::String(s) => Value::Text(s.clone()),
            other => Value::Text(other.to_string()),
        }
    }
}

/// Equality treats two NaN floats as equal so normalized value trees
/// compare structurally.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) | (Value::Absent, Value::Absent) => true,
            (Value::Integer(a), Value::Integer(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b || (a.is_nan() && b.is_nan()),
            (Value::Text(a), Value::Text(b)) => a == b,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Map(a), Value::Map(b)) => a == b,
            _ => false,
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Boolean(value)
    }
}

impl From<ValueRef<'_>> for Value {
    fn from(value: ValueRef<'_>) -> Self {
        match value {
            ValueRef::Null => Value::Null,
            ValueRef::Integer(i) => Value::Integer(i),
            ValueRef::Real(f) => Value::Float(f),
            ValueRef::Text(t) => Value::Text(String::from_utf8_lossy(t).into_owned()),
            // BLOBs are outside the domain scalar set; carry them as text
            ValueRef::Blob(b) => Value::Text(String::from_utf8_lossy(b).into_owned()),
        }
    }
}

impl ToSql for Value {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        match self {
            Value::Null | Value::Absent => Ok(ToSqlOutput::from(Null)),
            Value::Integer(i) => Ok(ToSqlOutput::from(*i)),
            Value::Float(f) => Ok(ToSqlOutput::from(*f)),
            Value::Text(s) => Ok(ToSqlOutput::from(s.as_str())),
            Value::Boolean(b) => Ok(ToSqlOutput::from(*b)),
            nested @ (Value::List(_) | Value::Map(_)) => {
                let text = serde_json::to_string(nested)
                    .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?;
                Ok(ToSqlOutput::from(text))
            }
        }
    }
}

/// JSON rendering: `Absent`, `Null`, and NaN all serialize to JSON null,
/// so the serialized form never carries a not-a-number sentinel.
impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Value::Null | Value::Absent => serializer.serialize_none(),
            Value::Integer(i) => serializer.serialize_i64(*i),
            Value::Float(f) if f.is_nan() => serializer.serialize_none(),
            Value::Float(f) => serializer.serialize_f64(*f),
            Value::Text(s) => serializer.serialize_str(s),
            Value::Boolean(b) => serializer.serialize_bool(*b),
            Value::List(items) => serializer.collect_seq(items),
            Value::Map(entries) => serializer.collect_map(entries),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null | Value::Absent => Ok(()),
            Value::Integer(i) => write!(f, "{i}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Text(s) => write!(f, "{s}"),
            Value::Boolean(b) => write!(f, "{b}"),
            Value::List(_) | Value::Map(_) => {
                let text = serde_json::to_string(self).map_err(|_| fmt::Error)?;
                write!(f, "{text}")
            }
        }
    }
}

/// One column of a table schema, in declared order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnInfo {
    pub name: String,
    pub column_type: String,
}

/// An eagerly materialized tabular result: ordered column names plus rows
/// of values, one per column per row. A zero-row table is a valid result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl Table {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        Table { columns, rows }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Look up a single cell by row index and column name
    pub fn value(&self, row: usize, column: &str) -> Option<&Value> {
        let index = self.column_index(column)?;
        self.rows.get(row)?.get(index)
    }

    /// One row as a column-name keyed map
    pub fn row_map(&self, row: usize) -> Option<Value> {
        let row = self.rows.get(row)?;
        let entries = self
            .columns
            .iter()
            .cloned()
            .zip(row.iter().cloned())
            .collect();
        Some(Value::Map(entries))
    }

    /// All rows as column-name keyed maps
    pub fn records(&self) -> Vec<Value> {
        (0..self.rows.len())
            .filter_map(|index| self.row_map(index))
            .collect()
    }

    /// Build a tabular batch from JSON records. Columns are the union of
    /// the records' top-level keys in first-seen order; keys missing from a
    /// record become `Null`.
    pub fn from_records(records: &[JsonValue]) -> Table {
        let mut columns: Vec<String> = Vec::new();
        for record in records {
            if let Some(map) = record.as_object() {
                for key in map.keys() {
                    if !columns.iter().any(|c| c == key) {
                        columns.push(key.clone());
                    }
                }
            }
        }

        let rows = records
            .iter()
            .filter_map(|record| record.as_object())
            .map(|map| {
                columns
                    .iter()
                    .map(|column| map.get(column).map(Value::from_json).unwrap_or(Value::Null))
                    .collect()
            })
            .collect();

        Table { columns, rows }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_json_scalars() {
        assert_eq!(Value::from_json(&json!(null)), Value::Null);
        assert_eq!(Value::from_json(&json!(true)), Value::Boolean(true));
        assert_eq!(Value::from_json(&json!(42)), Value::Integer(42));
        assert_eq!(Value::from_json(&json!(1.5)), Value::Float(1.5));
        assert_eq!(
            Value::from_json(&json!("p1")),
            Value::Text("p1".to_string())
        );
    }

    #[test]
    fn test_from_json_nested_becomes_text() {
        let value = Value::from_json(&json!({"a": 1}));
        assert_eq!(value, Value::Text("{\"a\":1}".to_string()));
    }

    #[test]
    fn test_nan_floats_compare_equal() {
        assert_eq!(Value::Float(f64::NAN), Value::Float(f64::NAN));
        assert_ne!(Value::Float(f64::NAN), Value::Float(0.0));
        assert_ne!(Value::Float(f64::NAN), Value::Null);
    }

    #[test]
    fn test_serialize_missing_values_as_null() {
        let row = Value::List(vec![
            Value::Absent,
            Value::Null,
            Value::Float(f64::NAN),
            Value::Integer(7),
        ]);
        let rendered = serde_json::to_string(&row).unwrap();
        assert_eq!(rendered, "[null,null,null,7]");
    }

    #[test]
    fn test_table_cell_lookup() {
        let table = Table::new(
            vec!["property_id".to_string(), "zipCode".to_string()],
            vec![vec![Value::Text("p1".to_string()), Value::Integer(22903)]],
        );
        assert_eq!(
            table.value(0, "zipCode"),
            Some(&Value::Integer(22903))
        );
        assert_eq!(table.value(0, "missing"), None);
        assert_eq!(table.value(1, "zipCode"), None);
    }

    #[test]
    fn test_from_records_unions_columns() {
        let records = vec![
            json!({"id": "a", "price": 1200}),
            json!({"id": "b", "status": "active"}),
        ];
        let table = Table::from_records(&records);
        assert_eq!(table.columns(), &["id", "price", "status"]);
        assert_eq!(table.value(0, "status"), Some(&Value::Null));
        assert_eq!(table.value(1, "price"), Some(&Value::Null));
        assert_eq!(
            table.value(1, "status"),
            Some(&Value::Text("active".to_string()))
        );
    }

    #[test]
    fn test_from_records_keeps_nested_as_json_text() {
        let records = vec![json!({"id": "a", "history": [{"price": 1}]})];
        let table = Table::from_records(&records);
        assert_eq!(
            table.value(0, "history"),
            Some(&Value::Text("[{\"price\":1}]".to_string()))
        );
    }
}
