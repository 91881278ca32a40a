//! Column type inference from sampled values
//!
//! Used only when a dataset does not exist yet. Once it exists, the remote
//! schema is authoritative and nothing here is consulted.

use datasync_domain::constants::DATETIME_COLUMNS;
use datasync_domain::{CellValue, Column, ColumnType, Row, Schema};

/// Map a value's runtime kind to the column type that will hold it.
///
/// | kind    | type    |
/// |---------|---------|
/// | string  | STRING  |
/// | integer | DECIMAL |
/// | float   | DOUBLE  |
/// | boolean | DECIMAL |
/// | json    | STRING  |
/// | null    | STRING  |
pub const fn infer_column_type(value: &CellValue) -> ColumnType {
    match value {
        CellValue::Integer(_) | CellValue::Boolean(_) => ColumnType::Decimal,
        CellValue::Float(_) => ColumnType::Double,
        CellValue::String(_) | CellValue::Json(_) | CellValue::Null => ColumnType::String,
    }
}

/// Convert a value to the form it is uploaded in.
///
/// Booleans land in DECIMAL columns: `true` becomes `1` and `false` becomes
/// null. Every other value is returned unchanged.
pub fn normalize_cell(value: CellValue) -> CellValue {
    match value {
        CellValue::Boolean(true) => CellValue::Integer(1),
        CellValue::Boolean(false) => CellValue::Null,
        other => other,
    }
}

/// Whether `name` is always typed DATETIME.
pub fn is_datetime_column(name: &str) -> bool {
    DATETIME_COLUMNS.contains(&name)
}

/// Build a schema from one sample row, keeping its column order.
pub fn infer_schema(sample: &Row) -> Schema {
    let columns = sample
        .iter()
        .map(|(name, value)| {
            let column_type = if is_datetime_column(name) {
                ColumnType::Datetime
            } else {
                infer_column_type(value)
            };
            Column::new(name, column_type)
        })
        .collect();
    Schema::new(columns)
}
