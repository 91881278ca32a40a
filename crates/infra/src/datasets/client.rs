//! Dataset registry over the Datasets Service REST API

use std::sync::Arc;

use datasync_common::{Clock, SystemClock};
use datasync_core::{encode_csv, DatasetsApi};
use datasync_domain::constants::{APPEND_UPDATE_METHOD, DATASETS_PATH, QUERY_EXECUTE_PATH};
use datasync_domain::{
    CellValue, Column, CreateDatasetRequest, Dataset, DatasetListing, DatasetsConfig,
    QueryRequest, QueryResult, Result, Row, Schema, SyncError,
};
use tracing::{debug, info, instrument, warn};

use super::auth::TokenManager;
use super::cache::DatasetCache;
use super::transport::{ApiRequest, Transport};
use crate::http::HttpClient;

/// Client for one sync run.
///
/// Owns its cache: dataset records, the dataset list and query results are
/// fetched at most once per client unless invalidated. Names are not unique
/// on the service; name lookups return the first match in list order.
pub struct DatasetsClient {
    transport: Transport,
    cache: Arc<DatasetCache>,
    page_size: usize,
}

impl DatasetsClient {
    /// # Errors
    /// `SyncError::Config` for an invalid configuration or HTTP client
    /// settings.
    pub fn new(config: &DatasetsConfig) -> Result<Self> {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Client whose token expiry is measured with `clock` (for testing).
    ///
    /// # Errors
    /// Same as [`DatasetsClient::new`].
    pub fn with_clock(config: &DatasetsConfig, clock: Arc<dyn Clock>) -> Result<Self> {
        config.validate()?;

        let http = HttpClient::from_config(config)?;
        let cache = Arc::new(DatasetCache::with_clock(clock));
        let tokens = TokenManager::new(http.clone(), config, Arc::clone(&cache))?;
        let transport = Transport::new(http, config.base(), tokens)?;

        Ok(Self { transport, cache, page_size: config.page_size })
    }

    pub fn cache(&self) -> &DatasetCache {
        &self.cache
    }

    pub const fn tokens(&self) -> &TokenManager {
        self.transport.tokens()
    }

    /// Every dataset visible to the client, across all pages.
    ///
    /// # Errors
    /// Any transport or decoding failure; nothing is cached on error.
    #[instrument(skip(self))]
    pub fn list_datasets(&self) -> Result<Vec<Dataset>> {
        Ok(self.dataset_list()?.as_ref().clone())
    }

    /// First dataset named `name`.
    ///
    /// # Errors
    /// `SyncError::NotFound` when no dataset has that name.
    #[instrument(skip(self))]
    pub fn dataset_by_name(&self, name: &str) -> Result<Dataset> {
        self.dataset_list()?
            .iter()
            .find(|dataset| dataset.name == name)
            .cloned()
            .ok_or_else(|| SyncError::NotFound(format!("dataset '{name}'")))
    }

    /// Full dataset record, including its schema.
    ///
    /// # Errors
    /// `SyncError::Http` with status 404 for an unknown id.
    #[instrument(skip(self))]
    pub fn dataset(&self, dataset_id: &str) -> Result<Dataset> {
        let dataset = self.cache.dataset(dataset_id, || {
            self.transport.call(&ApiRequest::get(dataset_path(dataset_id)))?.json()
        })?;
        Ok(dataset.as_ref().clone())
    }

    /// Authoritative schema of an existing dataset.
    ///
    /// A record without columns is corrupt: it is deleted so the next run
    /// recreates it, and this call fails.
    ///
    /// # Errors
    /// `SyncError::Schema` after deleting a schema-less dataset.
    #[instrument(skip(self))]
    pub fn dataset_schema(&self, dataset_id: &str) -> Result<Schema> {
        let dataset = self.dataset(dataset_id)?;
        if let Some(schema) = dataset.usable_schema() {
            return Ok(schema.clone());
        }

        warn!(name = %dataset.name, "dataset has no schema, deleting it so it can be recreated");
        self.delete_dataset(dataset_id)?;
        Err(SyncError::Schema(format!(
            "dataset '{}' ({dataset_id}) had no schema and was deleted; it will be recreated",
            dataset.name
        )))
    }

    /// Create an empty dataset.
    ///
    /// # Errors
    /// Any transport or decoding failure.
    #[instrument(skip(self, columns), fields(columns = columns.len()))]
    pub fn create_dataset(&self, name: &str, columns: &[Column]) -> Result<Dataset> {
        let request = ApiRequest::post(DATASETS_PATH)
            .json(&CreateDatasetRequest::new(name, columns.to_vec()))?;
        let created: Dataset = self.transport.call(&request)?.json()?;

        self.cache.invalidate_list();
        info!(dataset_id = %created.id, "dataset created");
        Ok(created)
    }

    /// Delete a dataset.
    ///
    /// # Errors
    /// Any transport failure.
    #[instrument(skip(self))]
    pub fn delete_dataset(&self, dataset_id: &str) -> Result<()> {
        self.transport.call(&ApiRequest::delete(dataset_path(dataset_id)))?;

        self.cache.invalidate_list();
        self.cache.invalidate_dataset(dataset_id);
        info!("dataset deleted");
        Ok(())
    }

    /// Drop cached lists, records and query results. The token survives.
    pub fn flush_cache(&self) {
        debug!("flushing dataset cache");
        self.cache.flush();
    }

    /// Append rows, already in schema column order, as CSV.
    ///
    /// # Errors
    /// `SyncError::Upload` when the service rejects the data.
    #[instrument(skip(self, rows), fields(rows = rows.len()))]
    pub fn append_rows(&self, dataset_id: &str, rows: &[Vec<CellValue>]) -> Result<()> {
        let body = encode_csv(rows)?;
        let bytes = body.len();
        let request = ApiRequest::put(format!("{}/data", dataset_path(dataset_id)))
            .query("updateMethod", APPEND_UPDATE_METHOD)
            .csv(body);

        self.transport.call(&request).map_err(|err| match err {
            SyncError::Http { status, body } => {
                SyncError::Upload { dataset: dataset_id.to_string(), status, body }
            }
            other => other,
        })?;

        info!(bytes, "rows appended");
        Ok(())
    }

    /// Run SQL against a dataset. Results are cached per dataset and SQL text.
    ///
    /// # Errors
    /// Any transport or decoding failure.
    #[instrument(skip(self, sql))]
    pub fn query_dataset(&self, dataset_id: &str, sql: &str) -> Result<QueryResult> {
        let result = self.cache.query(dataset_id, sql, || {
            let request = ApiRequest::post(format!(
                "{QUERY_EXECUTE_PATH}/{}",
                urlencoding::encode(dataset_id)
            ))
            .json(&QueryRequest::new(sql))?;
            self.transport.call(&request)?.json()
        })?;
        Ok(result.as_ref().clone())
    }

    /// [`query_dataset`](Self::query_dataset) with each row keyed by column name.
    ///
    /// # Errors
    /// Same as [`query_dataset`](Self::query_dataset).
    pub fn query_dataset_keyed(&self, dataset_id: &str, sql: &str) -> Result<Vec<Row>> {
        Ok(self.query_dataset(dataset_id, sql)?.keyed_rows())
    }

    /// [`query_dataset`](Self::query_dataset) against the first dataset named `name`.
    ///
    /// # Errors
    /// `SyncError::NotFound` when no dataset has that name.
    pub fn query_dataset_by_name(&self, name: &str, sql: &str) -> Result<QueryResult> {
        let dataset = self.dataset_by_name(name)?;
        self.query_dataset(&dataset.id, sql)
    }

    /// Flattened listing rows for tabular display.
    ///
    /// # Errors
    /// Same as [`list_datasets`](Self::list_datasets).
    pub fn dataset_listings(&self) -> Result<Vec<DatasetListing>> {
        Ok(self.dataset_list()?.iter().map(DatasetListing::from).collect())
    }

    fn dataset_list(&self) -> Result<Arc<Vec<Dataset>>> {
        self.cache.datasets(|| self.fetch_all_pages())
    }

    fn fetch_all_pages(&self) -> Result<Vec<Dataset>> {
        let limit = self.page_size;
        let mut datasets = Vec::new();
        let mut offset = 0;

        loop {
            let request = ApiRequest::get(DATASETS_PATH).query("offset", offset).query("limit", limit);
            let page: Vec<Dataset> = self.transport.call(&request)?.json()?;
            let received = page.len();
            debug!(offset, received, "fetched dataset page");

            datasets.extend(page);
            if received < limit {
                break;
            }
            offset += received;
        }

        info!(count = datasets.len(), "dataset list loaded");
        Ok(datasets)
    }
}

fn dataset_path(dataset_id: &str) -> String {
    format!("{DATASETS_PATH}/{}", urlencoding::encode(dataset_id))
}

impl DatasetsApi for DatasetsClient {
    fn flush_cache(&self) {
        Self::flush_cache(self);
    }

    fn list_datasets(&self) -> Result<Vec<Dataset>> {
        Self::list_datasets(self)
    }

    fn dataset_by_name(&self, name: &str) -> Result<Dataset> {
        Self::dataset_by_name(self, name)
    }

    fn dataset_schema(&self, dataset_id: &str) -> Result<Schema> {
        Self::dataset_schema(self, dataset_id)
    }

    fn create_dataset(&self, name: &str, columns: &[Column]) -> Result<Dataset> {
        Self::create_dataset(self, name, columns)
    }

    fn append_rows(&self, dataset_id: &str, rows: &[Vec<CellValue>]) -> Result<()> {
        Self::append_rows(self, dataset_id, rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dataset_ids_are_path_encoded() {
        assert_eq!(dataset_path("ds-1"), "/v1/datasets/ds-1");
        assert_eq!(dataset_path("a/b c"), "/v1/datasets/a%2Fb%20c");
    }

    #[test]
    fn invalid_config_is_rejected_before_any_request() {
        let config = DatasetsConfig::new("ftp://example.com", "client", "secret");
        assert!(matches!(DatasetsClient::new(&config), Err(SyncError::Config(_))));
    }
}
