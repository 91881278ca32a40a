//! # DataSync Core
//!
//! Synchronization logic with no I/O of its own.
//!
//! This crate contains:
//! - Port interfaces for the Datasets Service and progress reporting
//! - Schema inference and reconciliation against remote schemas
//! - CSV encoding of upload payloads
//! - The batch synchronizer that ties them together
//!
//! ## Architecture Principles
//! - Only depends on `datasync-domain`
//! - No HTTP or filesystem code
//! - All external dependencies via traits

pub mod encoding;
pub mod schema;
pub mod sync;

// Re-export specific items to avoid ambiguity
pub use encoding::csv::encode_csv;
pub use schema::{
    infer_column_type, infer_schema, normalize_cell, project_rows, reconcile, Projection,
    SchemaPlan,
};
pub use sync::batch::{BatchReport, DatasetBatch, DatasetBatches, DatasetReport, UploadStatus};
pub use sync::ports::{DatasetsApi, NoopProgress, SyncProgress, TracingProgress};
pub use sync::DatasetSynchronizer;
