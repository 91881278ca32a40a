//! Domain types for the Datasets Service

pub mod dataset;
pub mod query;
pub mod row;
pub mod token;

pub use dataset::{Column, ColumnType, CreateDatasetRequest, Dataset, DatasetListing, Owner, Schema};
pub use query::{QueryRequest, QueryResult};
pub use row::{CellValue, Row};
pub use token::AccessToken;
