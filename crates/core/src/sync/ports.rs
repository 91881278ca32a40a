//! Port interfaces for sync operations

use datasync_domain::{CellValue, Column, Dataset, Result, Schema};
use tracing::info;

/// Remote Datasets Service operations the synchronizer relies on.
///
/// Implemented over HTTP by `datasync-infra`; tests use an in-memory fake.
pub trait DatasetsApi: Send + Sync {
    /// Drop every cached dataset record, listing and query result.
    fn flush_cache(&self);

    /// All datasets visible to the client.
    fn list_datasets(&self) -> Result<Vec<Dataset>>;

    /// First dataset whose name matches exactly.
    ///
    /// Returns `SyncError::NotFound` when nothing matches.
    fn dataset_by_name(&self, name: &str) -> Result<Dataset>;

    /// Authoritative schema of an existing dataset.
    fn dataset_schema(&self, dataset_id: &str) -> Result<Schema>;

    /// Create an empty dataset with the given columns.
    fn create_dataset(&self, name: &str, columns: &[Column]) -> Result<Dataset>;

    /// Append rows, already in schema column order, to a dataset.
    fn append_rows(&self, dataset_id: &str, rows: &[Vec<CellValue>]) -> Result<()>;
}

/// Progress reporting for long batch runs
pub trait SyncProgress {
    /// Describe the dataset about to be processed.
    fn message(&mut self, text: &str);

    /// Mark one dataset as finished, whatever its outcome.
    fn advance(&mut self);
}

/// Discards all progress.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopProgress;

impl SyncProgress for NoopProgress {
    fn message(&mut self, _text: &str) {}

    fn advance(&mut self) {}
}

/// Emits progress as `info` events.
#[derive(Debug, Default, Clone)]
pub struct TracingProgress {
    total: usize,
    done: usize,
}

impl TracingProgress {
    pub fn new(total: usize) -> Self {
        Self { total, done: 0 }
    }

    pub const fn done(&self) -> usize {
        self.done
    }
}

impl SyncProgress for TracingProgress {
    fn message(&mut self, text: &str) {
        info!(done = self.done, total = self.total, "{text}");
    }

    fn advance(&mut self) {
        self.done += 1;
        info!(done = self.done, total = self.total, "dataset finished");
    }
}
