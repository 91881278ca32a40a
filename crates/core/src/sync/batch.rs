//! Batch inputs and per-dataset outcomes

use std::path::{Path, PathBuf};

use datasync_domain::{Row, Schema, SyncError};

/// Rows destined for one remote dataset.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DatasetBatch {
    /// Target dataset name.
    pub name: String,
    /// Rows in arrival order; each may carry a different column set.
    pub rows: Vec<Row>,
    /// Local files the rows were read from. Safe to delete only after a
    /// successful upload.
    pub sources: Vec<PathBuf>,
    /// Column types known up front; used instead of inference on create.
    pub declared_schema: Option<Schema>,
}

impl DatasetBatch {
    /// Empty batch for the dataset `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), ..Self::default() }
    }

    /// Append `rows` to the batch.
    #[must_use]
    pub fn with_rows(mut self, rows: impl IntoIterator<Item = Row>) -> Self {
        self.rows.extend(rows);
        self
    }

    /// Record a local file the rows came from.
    #[must_use]
    pub fn with_source(mut self, source: impl Into<PathBuf>) -> Self {
        self.sources.push(source.into());
        self
    }

    /// Column types to create the dataset with if it does not exist.
    #[must_use]
    pub fn with_declared_schema(mut self, schema: Schema) -> Self {
        self.declared_schema = Some(schema);
        self
    }
}

/// Groups rows from many sources by target dataset name, keeping the order
/// in which datasets were first seen.
#[derive(Debug, Clone, Default)]
pub struct DatasetBatches {
    batches: Vec<DatasetBatch>,
}

impl DatasetBatches {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add rows read from `source` to the batch for `dataset`.
    pub fn add(
        &mut self,
        dataset: &str,
        source: impl Into<PathBuf>,
        rows: impl IntoIterator<Item = Row>,
    ) {
        let batch = self.entry(dataset);
        batch.rows.extend(rows);
        let source = source.into();
        if !batch.sources.contains(&source) {
            batch.sources.push(source);
        }
    }

    /// Attach a declared schema to the batch for `dataset`.
    pub fn declare_schema(&mut self, dataset: &str, schema: Schema) {
        self.entry(dataset).declared_schema = Some(schema);
    }

    /// Number of distinct datasets.
    pub fn len(&self) -> usize {
        self.batches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.batches.is_empty()
    }

    /// Batches in first-seen order.
    pub fn into_vec(self) -> Vec<DatasetBatch> {
        self.batches
    }

    fn entry(&mut self, dataset: &str) -> &mut DatasetBatch {
        let index = match self.batches.iter().position(|batch| batch.name == dataset) {
            Some(index) => index,
            None => {
                self.batches.push(DatasetBatch::new(dataset));
                self.batches.len() - 1
            }
        };
        &mut self.batches[index]
    }
}

impl IntoIterator for DatasetBatches {
    type Item = DatasetBatch;
    type IntoIter = std::vec::IntoIter<DatasetBatch>;

    fn into_iter(self) -> Self::IntoIter {
        self.batches.into_iter()
    }
}

/// Outcome of one dataset in a batch run.
#[derive(Debug, Clone, PartialEq)]
pub enum UploadStatus {
    /// Rows were appended to `dataset_id`.
    Uploaded {
        dataset_id: String,
        rows: usize,
        /// Whether the dataset was created by this run.
        created: bool,
        /// Local columns absent from the remote schema, sorted.
        dropped_columns: Vec<String>,
    },
    /// Nothing to upload.
    Skipped,
    /// The dataset failed; other datasets in the run are unaffected.
    Failed(SyncError),
}

impl UploadStatus {
    pub const fn is_failure(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

/// Outcome of one dataset together with the files it was built from.
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetReport {
    pub name: String,
    pub status: UploadStatus,
    pub sources: Vec<PathBuf>,
}

/// Summary of a batch run, one entry per dataset in input order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchReport {
    pub datasets: Vec<DatasetReport>,
}

impl BatchReport {
    /// Record the outcome of the next dataset.
    pub fn push(&mut self, report: DatasetReport) {
        self.datasets.push(report);
    }

    pub fn failure_count(&self) -> usize {
        self.datasets.iter().filter(|report| report.status.is_failure()).count()
    }

    pub fn success_count(&self) -> usize {
        self.datasets
            .iter()
            .filter(|report| matches!(report.status, UploadStatus::Uploaded { .. }))
            .count()
    }

    /// Total rows uploaded across all datasets.
    pub fn uploaded_rows(&self) -> usize {
        self.datasets
            .iter()
            .map(|report| match report.status {
                UploadStatus::Uploaded { rows, .. } => rows,
                UploadStatus::Skipped | UploadStatus::Failed(_) => 0,
            })
            .sum()
    }

    /// Process exit status for a CLI caller: 0 when nothing failed, 1 otherwise.
    pub fn exit_code(&self) -> i32 {
        i32::from(self.failure_count() > 0)
    }

    /// Sources of every dataset that did not fail.
    pub fn deletable_sources(&self) -> Vec<&Path> {
        self.datasets
            .iter()
            .filter(|report| !report.status.is_failure())
            .flat_map(|report| report.sources.iter().map(PathBuf::as_path))
            .collect()
    }

    /// Dataset names paired with the error that failed them.
    pub fn failures(&self) -> impl Iterator<Item = (&str, &SyncError)> {
        self.datasets.iter().filter_map(|report| match &report.status {
            UploadStatus::Failed(err) => Some((report.name.as_str(), err)),
            _ => None,
        })
    }
}
