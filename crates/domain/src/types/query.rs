//! Dataset SQL query request/response

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::row::{CellValue, Row};

/// Body of the query-execute call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryRequest {
    pub sql: String,
}

impl QueryRequest {
    /// Newlines are collapsed to spaces; the service rejects multi-line SQL.
    pub fn new(sql: &str) -> Self {
        Self { sql: sql.replace("\r\n", " ").replace(['\n', '\r'], " ") }
    }
}

/// Tabular query result: column names plus positional rows.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    #[serde(default)]
    pub columns: Vec<String>,
    #[serde(default)]
    pub rows: Vec<Vec<Value>>,
}

impl QueryResult {
    /// Zip each positional row with the column names.
    ///
    /// Short rows leave trailing columns unset; extra values are ignored.
    pub fn keyed_rows(&self) -> Vec<Row> {
        self.rows
            .iter()
            .map(|values| {
                self.columns
                    .iter()
                    .zip(values.iter())
                    .map(|(column, value)| (column.clone(), CellValue::from(value.clone())))
                    .collect()
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn sql_newlines_are_flattened() {
        let request = QueryRequest::new("SELECT *\nFROM table\r\nWHERE x = 1");
        assert_eq!(request.sql, "SELECT * FROM table WHERE x = 1");
    }

    #[test]
    fn keyed_rows_zip_columns() {
        let result: QueryResult = serde_json::from_value(json!({
            "columns": ["ticket", "count"],
            "rows": [["T-1", 4], ["T-2", null]],
            "numRows": 2
        }))
        .unwrap();

        let rows = result.keyed_rows();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get("ticket"), Some(&CellValue::String("T-1".into())));
        assert_eq!(rows[0].get("count"), Some(&CellValue::Integer(4)));
        assert_eq!(rows[1].get("count"), Some(&CellValue::Null));
    }
}
