//! Protocol and client constants
//!
//! Centralized location for values fixed by the Datasets Service API or by
//! the client's caching contract.

// Pagination
pub const DATASET_PAGE_SIZE: usize = 50;

// OAuth
pub const OAUTH_TOKEN_PATH: &str = "/oauth/token";
pub const OAUTH_GRANT_TYPE: &str = "client_credentials";
pub const OAUTH_SCOPE: &str = "data";
/// Seconds shaved off the server-declared token lifetime before caching.
pub const TOKEN_EXPIRY_MARGIN_SECS: u64 = 1;
/// Error code the service returns for an expired or revoked bearer token.
pub const INVALID_TOKEN_ERROR: &str = "invalid_token";

// API paths
pub const DATASETS_PATH: &str = "/v1/datasets";
pub const QUERY_EXECUTE_PATH: &str = "/v1/datasets/query/execute";
pub const APPEND_UPDATE_METHOD: &str = "APPEND";
pub const CSV_CONTENT_TYPE: &str = "text/csv";

// Transport defaults
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;
pub const DEFAULT_USER_AGENT: &str = concat!("datasync/", env!("CARGO_PKG_VERSION"));

// Schema inference
/// Column names always typed as DATETIME regardless of the sampled value.
pub const DATETIME_COLUMNS: [&str; 3] =
    ["result_date", "reporting_period_start", "reporting_period_end"];
pub const DATASET_DESCRIPTION_PREFIX: &str = "table for ";
