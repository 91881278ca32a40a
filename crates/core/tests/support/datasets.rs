//! In-memory mock for the `DatasetsApi` port.

use std::collections::HashSet;
use std::sync::Mutex;

use datasync_core::DatasetsApi;
use datasync_domain::{
    CellValue, Column, Dataset, Result as DomainResult, Schema, SyncError,
};

/// One recorded append call.
#[derive(Debug, Clone, PartialEq)]
pub struct Append {
    pub dataset_id: String,
    pub rows: Vec<Vec<CellValue>>,
}

#[derive(Default)]
struct State {
    datasets: Vec<Dataset>,
    appends: Vec<Append>,
    flushes: usize,
    next_id: usize,
}

/// Stores datasets in memory and fails on request.
///
/// Failures are keyed by dataset name and apply to every call that touches
/// that dataset.
#[derive(Default)]
pub struct FakeDatasetsApi {
    state: Mutex<State>,
    failing_uploads: HashSet<String>,
    failing_lookups: HashSet<String>,
}

impl FakeDatasetsApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an existing dataset with a schema.
    pub fn with_dataset(self, id: &str, name: &str, columns: Vec<Column>) -> Self {
        self.lock().datasets.push(dataset(id, name, Some(Schema::new(columns))));
        self
    }

    /// Make `append_rows` fail with HTTP 400 for this dataset name.
    pub fn failing_upload(mut self, name: &str) -> Self {
        self.failing_uploads.insert(name.to_string());
        self
    }

    /// Make `dataset_by_name` fail with HTTP 500 for this dataset name.
    pub fn failing_lookup(mut self, name: &str) -> Self {
        self.failing_lookups.insert(name.to_string());
        self
    }

    pub fn appends(&self) -> Vec<Append> {
        self.lock().appends.clone()
    }

    pub fn datasets(&self) -> Vec<Dataset> {
        self.lock().datasets.clone()
    }

    pub fn flushes(&self) -> usize {
        self.lock().flushes
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

fn dataset(id: &str, name: &str, schema: Option<Schema>) -> Dataset {
    Dataset {
        id: id.to_string(),
        name: name.to_string(),
        description: Some(format!("table for {name}")),
        schema,
        row_count: 0,
        column_count: 0,
        created_at: None,
        updated_at: None,
        owner: None,
    }
}

impl DatasetsApi for FakeDatasetsApi {
    fn flush_cache(&self) {
        self.lock().flushes += 1;
    }

    fn list_datasets(&self) -> DomainResult<Vec<Dataset>> {
        Ok(self.datasets())
    }

    fn dataset_by_name(&self, name: &str) -> DomainResult<Dataset> {
        if self.failing_lookups.contains(name) {
            return Err(SyncError::Http { status: 500, body: "lookup exploded".into() });
        }
        self.lock()
            .datasets
            .iter()
            .find(|dataset| dataset.name == name)
            .cloned()
            .ok_or_else(|| SyncError::NotFound(format!("dataset '{name}'")))
    }

    fn dataset_schema(&self, dataset_id: &str) -> DomainResult<Schema> {
        self.lock()
            .datasets
            .iter()
            .find(|dataset| dataset.id == dataset_id)
            .and_then(|dataset| dataset.usable_schema().cloned())
            .ok_or_else(|| SyncError::Schema(format!("dataset {dataset_id} has no schema")))
    }

    fn create_dataset(&self, name: &str, columns: &[Column]) -> DomainResult<Dataset> {
        let mut state = self.lock();
        state.next_id += 1;
        let created =
            dataset(&format!("new-{}", state.next_id), name, Some(Schema::new(columns.to_vec())));
        state.datasets.push(created.clone());
        Ok(created)
    }

    fn append_rows(&self, dataset_id: &str, rows: &[Vec<CellValue>]) -> DomainResult<()> {
        let mut state = self.lock();
        let name = state
            .datasets
            .iter()
            .find(|dataset| dataset.id == dataset_id)
            .map(|dataset| dataset.name.clone())
            .unwrap_or_default();
        if self.failing_uploads.contains(&name) {
            return Err(SyncError::Upload { dataset: dataset_id.into(), status: 400, body: "bad csv".into() });
        }
        state.appends.push(Append { dataset_id: dataset_id.into(), rows: rows.to_vec() });
        Ok(())
    }
}
