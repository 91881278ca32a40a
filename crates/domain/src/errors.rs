//! Error types used throughout the synchronization client

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for DataSync
///
/// `Clone` so cached loads can hand the same failure to every waiting caller.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "detail")]
pub enum SyncError {
    /// Credentials rejected or token response malformed.
    #[error("Authentication error: {0}")]
    Auth(String),

    /// Any non-2xx API response other than a handled invalid-token retry.
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// Dataset lookup by name found no match.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Appending rows to a dataset failed.
    #[error("Upload to dataset '{dataset}' failed with HTTP {status}: {body}")]
    Upload { dataset: String, status: u16, body: String },

    /// A remote dataset has no usable schema.
    #[error("Schema error: {0}")]
    Schema(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl SyncError {
    /// Stable label suitable for structured log fields.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Auth(_) => "auth",
            Self::Http { .. } => "http",
            Self::NotFound(_) => "not_found",
            Self::Upload { .. } => "upload",
            Self::Schema(_) => "schema",
            Self::Network(_) => "network",
            Self::Config(_) => "config",
            Self::Serialization(_) => "serialization",
            Self::Internal(_) => "internal",
        }
    }

    /// Whether a later attempt could plausibly succeed without changes.
    ///
    /// Nothing in the client retries on this; it informs callers that
    /// schedule their own reruns.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Network(_) | Self::Schema(_) => true,
            Self::Http { status, .. } | Self::Upload { status, .. } => {
                *status == 429 || *status >= 500
            }
            Self::Auth(_)
            | Self::NotFound(_)
            | Self::Config(_)
            | Self::Serialization(_)
            | Self::Internal(_) => false,
        }
    }

    /// HTTP status carried by the error, if any.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } | Self::Upload { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Result type alias for DataSync operations
pub type Result<T> = std::result::Result<T, SyncError>;
