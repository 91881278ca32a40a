//! Datasets Service client
//!
//! - [`auth`]: OAuth client-credentials token manager
//! - [`transport`]: authenticated requests with one invalid-token retry
//! - [`cache`]: per-client cache of tokens, records and query results
//! - [`client`]: the dataset registry, implementing
//!   [`DatasetsApi`](datasync_core::DatasetsApi)

pub mod auth;
pub mod cache;
pub mod client;
pub mod transport;

pub use auth::TokenManager;
pub use cache::{CacheKey, CachedValue, DatasetCache};
pub use client::DatasetsClient;
pub use transport::{ApiRequest, ApiResponse, RequestBody, Transport};
