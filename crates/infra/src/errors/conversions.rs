//! Conversions from external infrastructure errors into domain errors.

use datasync_domain::SyncError;
use reqwest::Error as HttpError;
use serde_json::Error as JsonError;
use toml::de::Error as TomlError;
use url::ParseError as UrlError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub SyncError);

impl From<InfraError> for SyncError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<SyncError> for InfraError {
    fn from(value: SyncError) -> Self {
        Self(value)
    }
}

/// Extension trait to make the conversion logic explicit in tests and within
/// this module.
trait IntoSyncError {
    fn into_sync(self) -> SyncError;
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → SyncError */
/* -------------------------------------------------------------------------- */

impl IntoSyncError for HttpError {
    fn into_sync(self) -> SyncError {
        if self.is_timeout() {
            return SyncError::Network("HTTP request timed out".into());
        }

        if self.is_connect() {
            return SyncError::Network(format!("HTTP connection failure: {self}"));
        }

        if self.is_builder() {
            return SyncError::Config(format!("invalid HTTP request or client settings: {self}"));
        }

        if self.is_decode() {
            return SyncError::Serialization(format!("failed to decode HTTP response: {self}"));
        }

        if let Some(status) = self.status() {
            return SyncError::Http { status: status.as_u16(), body: self.to_string() };
        }

        SyncError::Network(self.to_string())
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        Self(value.into_sync())
    }
}

/* -------------------------------------------------------------------------- */
/* serde_json::Error → SyncError */
/* -------------------------------------------------------------------------- */

impl IntoSyncError for JsonError {
    fn into_sync(self) -> SyncError {
        SyncError::Serialization(format!(
            "invalid JSON at line {} column {}: {self}",
            self.line(),
            self.column()
        ))
    }
}

impl From<JsonError> for InfraError {
    fn from(value: JsonError) -> Self {
        Self(value.into_sync())
    }
}

/* -------------------------------------------------------------------------- */
/* toml / url errors → SyncError::Config */
/* -------------------------------------------------------------------------- */

impl IntoSyncError for TomlError {
    fn into_sync(self) -> SyncError {
        SyncError::Config(format!("Invalid TOML format: {}", self.message()))
    }
}

impl From<TomlError> for InfraError {
    fn from(value: TomlError) -> Self {
        Self(value.into_sync())
    }
}

impl IntoSyncError for UrlError {
    fn into_sync(self) -> SyncError {
        SyncError::Config(format!("invalid base URI: {self}"))
    }
}

impl From<UrlError> for InfraError {
    fn from(value: UrlError) -> Self {
        Self(value.into_sync())
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */
