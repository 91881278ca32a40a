//! # DataSync Infrastructure
//!
//! Infrastructure implementations of core domain ports.
//!
//! This crate contains:
//! - The blocking HTTP client with transport settings
//! - OAuth client-credentials token management
//! - The authenticated transport with a single invalid-token retry
//! - The dataset registry (`DatasetsClient`) implementing `DatasetsApi`
//! - Configuration loading from the environment or files
//!
//! ## Architecture
//! - Implements traits defined in `datasync-core`
//! - Depends on `datasync-common` for the cache store and clock
//! - Contains all "impure" code (network and filesystem I/O)

pub mod config;
pub mod datasets;
pub mod errors;
pub mod http;

// Re-export commonly used items
pub use datasets::{ApiRequest, ApiResponse, CacheKey, DatasetCache, DatasetsClient, TokenManager, Transport};
pub use errors::InfraError;
pub use http::{HttpClient, HttpClientBuilder};
