//! Batch synchronization service

use datasync_domain::{Result, SyncError};
use tracing::{error, info, instrument, warn};

use super::batch::{BatchReport, DatasetBatch, DatasetReport, UploadStatus};
use super::ports::{DatasetsApi, NoopProgress, SyncProgress};
use crate::schema::{project_rows, reconcile, SchemaPlan};

/// Uploads batches of local rows into their remote datasets.
///
/// Runs sequentially. A failure in one dataset is logged and recorded, and
/// the remaining datasets still run.
pub struct DatasetSynchronizer<'a, A: DatasetsApi + ?Sized> {
    api: &'a A,
    progress: Box<dyn SyncProgress + 'a>,
}

impl<'a, A: DatasetsApi + ?Sized> DatasetSynchronizer<'a, A> {
    pub fn new(api: &'a A) -> Self {
        Self { api, progress: Box::new(NoopProgress) }
    }

    #[must_use]
    pub fn with_progress(mut self, progress: impl SyncProgress + 'a) -> Self {
        self.progress = Box::new(progress);
        self
    }

    /// Synchronize every batch and report per-dataset outcomes.
    ///
    /// The registry cache is flushed first so no decision is taken against a
    /// stale dataset list.
    #[instrument(skip_all, fields(datasets = batches.len()))]
    pub fn sync_all(&mut self, batches: Vec<DatasetBatch>) -> BatchReport {
        self.api.flush_cache();

        let mut report = BatchReport::default();
        for batch in batches {
            self.progress.message(&format!("Uploading dataset {}", batch.name));

            let status = match self.sync_one(&batch) {
                Ok(status) => status,
                Err(err) => {
                    error!(dataset = %batch.name, error = %err, kind = err.label(), "dataset upload failed");
                    UploadStatus::Failed(err)
                }
            };
            self.progress.advance();

            report.push(DatasetReport { name: batch.name, status, sources: batch.sources });
        }

        info!(
            succeeded = report.success_count(),
            failed = report.failure_count(),
            rows = report.uploaded_rows(),
            "batch upload finished"
        );
        report
    }

    /// Synchronize a single batch.
    ///
    /// # Errors
    /// Propagates any registry, schema or upload failure for this dataset.
    #[instrument(skip_all, fields(dataset = %batch.name, rows = batch.rows.len()))]
    pub fn sync_one(&self, batch: &DatasetBatch) -> Result<UploadStatus> {
        if batch.rows.is_empty() {
            info!("no rows to upload, skipping");
            return Ok(UploadStatus::Skipped);
        }

        let (dataset_id, plan) = self.resolve(batch)?;
        let projection = project_rows(plan.schema(), &batch.rows);
        if !projection.dropped_columns.is_empty() {
            warn!(
                dropped = ?projection.dropped_columns,
                "columns missing from remote schema were not uploaded"
            );
        }

        self.api.append_rows(&dataset_id, &projection.rows)?;

        Ok(UploadStatus::Uploaded {
            dataset_id,
            rows: projection.rows.len(),
            created: plan.is_create(),
            dropped_columns: projection.dropped_columns,
        })
    }

    /// Find the target dataset, creating it when it does not exist.
    fn resolve(&self, batch: &DatasetBatch) -> Result<(String, SchemaPlan)> {
        match self.api.dataset_by_name(&batch.name) {
            Ok(dataset) => {
                let remote = self.api.dataset_schema(&dataset.id)?;
                let plan = reconcile(Some(remote), None, &batch.rows)?;
                Ok((dataset.id, plan))
            }
            Err(SyncError::NotFound(_)) => {
                let plan = reconcile(None, batch.declared_schema.as_ref(), &batch.rows)?;
                let created = self.api.create_dataset(&batch.name, &plan.schema().columns)?;
                info!(dataset_id = %created.id, columns = plan.schema().len(), "created dataset");
                Ok((created.id, plan))
            }
            Err(err) => Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use datasync_domain::{CellValue, Column, ColumnType, Dataset, Row, Schema};

    use super::*;

    /// Single-dataset fake recording what was uploaded.
    #[derive(Default)]
    struct OneDataset {
        existing: Option<Schema>,
        created: Mutex<Option<Vec<Column>>>,
        appended: Mutex<Vec<Vec<CellValue>>>,
    }

    fn dataset(id: &str, name: &str) -> Dataset {
        Dataset {
            id: id.into(),
            name: name.into(),
            description: None,
            schema: None,
            row_count: 0,
            column_count: 0,
            created_at: None,
            updated_at: None,
            owner: None,
        }
    }

    impl DatasetsApi for OneDataset {
        fn flush_cache(&self) {}

        fn list_datasets(&self) -> Result<Vec<Dataset>> {
            Ok(self.existing.iter().map(|_| dataset("ds-1", "metrics")).collect())
        }

        fn dataset_by_name(&self, name: &str) -> Result<Dataset> {
            match &self.existing {
                Some(_) => Ok(dataset("ds-1", name)),
                None => Err(SyncError::NotFound(name.into())),
            }
        }

        fn dataset_schema(&self, _dataset_id: &str) -> Result<Schema> {
            self.existing.clone().ok_or_else(|| SyncError::Schema("none".into()))
        }

        fn create_dataset(&self, name: &str, columns: &[Column]) -> Result<Dataset> {
            *self.created.lock().unwrap() = Some(columns.to_vec());
            Ok(dataset("ds-new", name))
        }

        fn append_rows(&self, _dataset_id: &str, rows: &[Vec<CellValue>]) -> Result<()> {
            self.appended.lock().unwrap().extend(rows.iter().cloned());
            Ok(())
        }
    }

    #[test]
    fn empty_batch_is_skipped_without_remote_calls() {
        let api = OneDataset::default();
        let sync = DatasetSynchronizer::new(&api);

        let status = sync.sync_one(&DatasetBatch::new("metrics")).unwrap();

        assert_eq!(status, UploadStatus::Skipped);
        assert!(api.created.lock().unwrap().is_none());
    }

    #[test]
    fn existing_dataset_keeps_remote_column_order() {
        let api = OneDataset {
            existing: Some(Schema::new(vec![
                Column::new("a", ColumnType::Decimal),
                Column::new("b", ColumnType::Decimal),
                Column::new("c", ColumnType::Decimal),
            ])),
            ..OneDataset::default()
        };
        let batch = DatasetBatch::new("metrics").with_rows([Row::new().with("b", 2).with("a", 1)]);

        let status = DatasetSynchronizer::new(&api).sync_one(&batch).unwrap();

        assert!(matches!(status, UploadStatus::Uploaded { created: false, rows: 1, .. }));
        assert_eq!(
            *api.appended.lock().unwrap(),
            vec![vec![CellValue::Integer(1), CellValue::Integer(2), CellValue::Null]]
        );
    }

    #[test]
    fn missing_dataset_is_created_from_first_row() {
        let api = OneDataset::default();
        let batch = DatasetBatch::new("metrics")
            .with_rows([Row::new().with("result_date", "2024-01-01").with("score", 0.5)]);

        let status = DatasetSynchronizer::new(&api).sync_one(&batch).unwrap();

        assert!(matches!(status, UploadStatus::Uploaded { created: true, .. }));
        assert_eq!(
            api.created.lock().unwrap().clone().unwrap(),
            vec![
                Column::new("result_date", ColumnType::Datetime),
                Column::new("score", ColumnType::Double),
            ]
        );
    }
}
