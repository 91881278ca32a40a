//! Remote-versus-local schema decisions and row projection

use datasync_domain::{CellValue, Result, Row, Schema, SyncError};

use super::inference::{infer_schema, normalize_cell};

/// Which schema a sync run uploads against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaPlan {
    /// No remote dataset exists; create one with this schema.
    Create(Schema),
    /// Upload against the existing remote schema, unchanged.
    Adopt(Schema),
}

impl SchemaPlan {
    /// Schema the rows are projected onto, whichever variant.
    pub fn schema(&self) -> &Schema {
        match self {
            Self::Create(schema) | Self::Adopt(schema) => schema,
        }
    }

    /// Whether the dataset has to be created first.
    pub const fn is_create(&self) -> bool {
        matches!(self, Self::Create(_))
    }
}

/// Choose the schema for an upload.
///
/// An existing remote schema always wins and is never altered. Otherwise a
/// declared schema is used, and failing that one is inferred from the first
/// row.
///
/// # Errors
/// `SyncError::Schema` when a dataset must be created but there is neither a
/// declared schema nor a sample row.
pub fn reconcile(
    existing: Option<Schema>,
    declared: Option<&Schema>,
    rows: &[Row],
) -> Result<SchemaPlan> {
    if let Some(remote) = existing {
        return Ok(SchemaPlan::Adopt(remote));
    }
    if let Some(declared) = declared.filter(|schema| !schema.is_empty()) {
        return Ok(SchemaPlan::Create(declared.clone()));
    }
    rows.first()
        .map(|sample| SchemaPlan::Create(infer_schema(sample)))
        .ok_or_else(|| SyncError::Schema("no rows to infer a schema from".into()))
}

/// Rows reordered to a schema's column order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Projection {
    /// One entry per input row, one cell per schema column.
    pub rows: Vec<Vec<CellValue>>,
    /// Local column names absent from the schema, sorted and deduplicated.
    pub dropped_columns: Vec<String>,
}

/// Project `rows` onto `schema`.
///
/// Missing columns become null, extra local columns are dropped and reported,
/// and values are normalized for upload.
pub fn project_rows(schema: &Schema, rows: &[Row]) -> Projection {
    let mut dropped_columns: Vec<String> = Vec::new();

    let projected = rows
        .iter()
        .map(|row| {
            for column in row.columns().filter(|column| !schema.contains(column)) {
                dropped_columns.push(column.to_string());
            }
            schema
                .column_names()
                .map(|name| row.get(name).cloned().map_or(CellValue::Null, normalize_cell))
                .collect()
        })
        .collect();

    dropped_columns.sort_unstable();
    dropped_columns.dedup();

    Projection { rows: projected, dropped_columns }
}

#[cfg(test)]
mod tests {
    use datasync_domain::{Column, ColumnType};

    use super::*;

    fn schema(names: &[&str]) -> Schema {
        Schema::new(names.iter().map(|name| Column::new(*name, ColumnType::String)).collect())
    }

    #[test]
    fn remote_schema_wins_over_everything() {
        let remote = schema(&["a", "b"]);
        let declared = schema(&["z"]);
        let rows = vec![Row::new().with("q", 1)];

        let plan = reconcile(Some(remote.clone()), Some(&declared), &rows).unwrap();
        assert_eq!(plan, SchemaPlan::Adopt(remote));
        assert!(!plan.is_create());
    }

    #[test]
    fn declared_schema_beats_inference() {
        let declared = schema(&["z"]);
        let rows = vec![Row::new().with("q", 1)];

        let plan = reconcile(None, Some(&declared), &rows).unwrap();
        assert_eq!(plan, SchemaPlan::Create(declared));
    }

    #[test]
    fn inference_uses_first_row_only() {
        let rows = vec![Row::new().with("n", 1), Row::new().with("n", 1.5).with("extra", "x")];

        let plan = reconcile(None, None, &rows).unwrap();
        assert!(plan.is_create());
        assert_eq!(plan.schema().columns, vec![Column::new("n", ColumnType::Decimal)]);
    }

    #[test]
    fn nothing_to_infer_from_is_a_schema_error() {
        let err = reconcile(None, Some(&Schema::default()), &[]).unwrap_err();
        assert!(matches!(err, SyncError::Schema(_)));
    }

    #[test]
    fn projection_pads_reorders_and_drops() {
        let target = schema(&["a", "b", "c"]);
        let rows = vec![
            Row::new().with("b", 2).with("a", 1),
            Row::new().with("c", true).with("zeta", 0).with("alpha", 0),
            Row::new().with("zeta", 1).with("a", false),
        ];

        let projection = project_rows(&target, &rows);

        assert_eq!(
            projection.rows,
            vec![
                vec![CellValue::Integer(1), CellValue::Integer(2), CellValue::Null],
                vec![CellValue::Null, CellValue::Null, CellValue::Integer(1)],
                vec![CellValue::Null, CellValue::Null, CellValue::Null],
            ]
        );
        assert_eq!(projection.dropped_columns, ["alpha", "zeta"]);
    }

    #[test]
    fn projection_of_no_rows_is_empty() {
        let projection = project_rows(&schema(&["a"]), &[]);
        assert!(projection.rows.is_empty());
        assert!(projection.dropped_columns.is_empty());
    }
}
