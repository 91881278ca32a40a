//! Local tabular rows
//!
//! A [`Row`] is an ordered mapping from column name to [`CellValue`]. The
//! insertion order is the "observed column order" used when a schema has to
//! be inferred from a sample row.

use serde_json::Value;

/// A scalar cell value tagged with its runtime kind.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Null,
    String(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    /// Complex value (array/object) serialized to JSON text on upload.
    Json(Value),
}

impl CellValue {
    /// Name of the runtime kind, for log fields.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::String(_) => "string",
            Self::Integer(_) => "integer",
            Self::Float(_) => "float",
            Self::Boolean(_) => "boolean",
            Self::Json(_) => "json",
        }
    }

    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

impl From<Value> for CellValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(flag) => Self::Boolean(flag),
            Value::Number(number) => match number.as_i64() {
                Some(integer) => Self::Integer(integer),
                None => number.as_f64().map_or(Self::Json(Value::Number(number)), Self::Float),
            },
            Value::String(text) => Self::String(text),
            complex @ (Value::Array(_) | Value::Object(_)) => Self::Json(complex),
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<i32> for CellValue {
    fn from(value: i32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for CellValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl<T: Into<Self>> From<Option<T>> for CellValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

/// Ordered column-name to value mapping.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    cells: Vec<(String, CellValue)>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    #[must_use]
    pub fn with(mut self, column: impl Into<String>, value: impl Into<CellValue>) -> Self {
        self.insert(column, value);
        self
    }

    /// Set `column`, keeping its original position if already present.
    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<CellValue>) {
        let column = column.into();
        let value = value.into();
        match self.cells.iter_mut().find(|(name, _)| *name == column) {
            Some((_, existing)) => *existing = value,
            None => self.cells.push((column, value)),
        }
    }

    pub fn get(&self, column: &str) -> Option<&CellValue> {
        self.cells.iter().find(|(name, _)| name == column).map(|(_, value)| value)
    }

    /// Column names in observed order.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.cells.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &CellValue)> {
        self.cells.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for Row
where
    K: Into<String>,
    V: Into<CellValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut row = Self::new();
        for (column, value) in iter {
            row.insert(column, value);
        }
        row
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn json_values_map_to_tagged_cells() {
        assert_eq!(CellValue::from(json!(null)), CellValue::Null);
        assert_eq!(CellValue::from(json!(3)), CellValue::Integer(3));
        assert_eq!(CellValue::from(json!(2.5)), CellValue::Float(2.5));
        assert_eq!(CellValue::from(json!(true)), CellValue::Boolean(true));
        assert_eq!(CellValue::from(json!("x")), CellValue::String("x".into()));
        assert_eq!(CellValue::from(json!([1, 2])), CellValue::Json(json!([1, 2])));
    }

    #[test]
    fn row_keeps_observed_order_and_replaces_in_place() {
        let mut row = Row::new().with("b", 2).with("a", 1);
        row.insert("b", "two");

        assert_eq!(row.columns().collect::<Vec<_>>(), ["b", "a"]);
        assert_eq!(row.get("b"), Some(&CellValue::String("two".into())));
        assert_eq!(row.get("missing"), None);
    }

    #[test]
    fn optional_values_become_null() {
        let row: Row = [("x", Option::<i64>::None), ("y", Some(4))].into_iter().collect();
        assert_eq!(row.get("x"), Some(&CellValue::Null));
        assert_eq!(row.get("y"), Some(&CellValue::Integer(4)));
    }
}
