//! Remote dataset records and their schemas

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::DATASET_DESCRIPTION_PREFIX;

/// Column type understood by the Datasets Service.
///
/// The client only ever creates the four named types. Any other type read
/// from a remote schema is preserved verbatim in `Other` so an existing
/// dataset is never rejected for using a type this client does not produce.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ColumnType {
    String,
    Decimal,
    Double,
    Datetime,
    Other(String),
}

impl ColumnType {
    /// Wire representation.
    pub fn as_str(&self) -> &str {
        match self {
            Self::String => "STRING",
            Self::Decimal => "DECIMAL",
            Self::Double => "DOUBLE",
            Self::Datetime => "DATETIME",
            Self::Other(other) => other.as_str(),
        }
    }
}

impl From<String> for ColumnType {
    fn from(value: String) -> Self {
        match value.to_ascii_uppercase().as_str() {
            "STRING" => Self::String,
            "DECIMAL" => Self::Decimal,
            "DOUBLE" => Self::Double,
            "DATETIME" => Self::Datetime,
            _ => Self::Other(value),
        }
    }
}

impl From<ColumnType> for String {
    fn from(value: ColumnType) -> Self {
        match value {
            ColumnType::Other(other) => other,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named, typed column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    #[serde(rename = "type")]
    pub column_type: ColumnType,
}

impl Column {
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self { name: name.into(), column_type }
    }
}

/// Ordered column list. The order is the CSV column order of every upload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    #[serde(default)]
    pub columns: Vec<Column>,
}

impl Schema {
    pub fn new(columns: Vec<Column>) -> Self {
        Self { columns }
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.columns.iter().any(|column| column.name == name)
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|column| column.name.as_str())
    }
}

/// Dataset owner as reported by the service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Owner {
    #[serde(default)]
    pub name: String,
}

/// A remote dataset.
///
/// `id` is the stable identity. `name` is a lookup convenience and is not
/// guaranteed unique by the service. List responses may omit `schema`; a
/// full record fetched by id is expected to carry one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<Schema>,
    #[serde(default, rename = "rows")]
    pub row_count: u64,
    #[serde(default, rename = "columns")]
    pub column_count: u64,
    #[serde(default, rename = "createdAt", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, rename = "updatedAt", skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<Owner>,
}

impl Dataset {
    /// The schema, if the record carries one with at least one column.
    pub fn usable_schema(&self) -> Option<&Schema> {
        self.schema.as_ref().filter(|schema| !schema.is_empty())
    }
}

/// One line of a dataset listing, flattened for tabular display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DatasetListing {
    pub name: String,
    pub id: String,
    pub rows: u64,
    pub created: String,
    pub updated: String,
    pub owner: String,
}

impl DatasetListing {
    /// Column headings matching the field order.
    pub const HEADERS: [&'static str; 6] = ["Name", "ID", "Rows", "Created", "Updated", "Owner"];

    /// Fields in heading order.
    pub fn cells(&self) -> [String; 6] {
        [
            self.name.clone(),
            self.id.clone(),
            self.rows.to_string(),
            self.created.clone(),
            self.updated.clone(),
            self.owner.clone(),
        ]
    }
}

impl From<&Dataset> for DatasetListing {
    fn from(dataset: &Dataset) -> Self {
        let stamp = |at: Option<DateTime<Utc>>| at.map(|at| at.to_rfc3339()).unwrap_or_default();
        Self {
            name: dataset.name.clone(),
            id: dataset.id.clone(),
            rows: dataset.row_count,
            created: stamp(dataset.created_at),
            updated: stamp(dataset.updated_at),
            owner: dataset.owner.as_ref().map(|owner| owner.name.clone()).unwrap_or_default(),
        }
    }
}

/// Body of the create-dataset call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateDatasetRequest {
    pub name: String,
    pub description: String,
    pub rows: u64,
    pub schema: Schema,
}

impl CreateDatasetRequest {
    /// New empty dataset with the generated description.
    pub fn new(name: impl Into<String>, columns: Vec<Column>) -> Self {
        let name = name.into();
        Self {
            description: format!("{DATASET_DESCRIPTION_PREFIX}{name}"),
            name,
            rows: 0,
            schema: Schema::new(columns),
        }
    }
}
