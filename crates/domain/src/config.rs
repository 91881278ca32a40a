//! Client configuration
//!
//! The credential/config source is external; these structs are what it
//! produces. Loading from the environment or a file lives in
//! `datasync-infra::config`.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{
    DATASET_PAGE_SIZE, DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_TIMEOUT_SECS, DEFAULT_USER_AGENT,
};
use crate::errors::{Result, SyncError};

/// Connection settings for the Datasets Service.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetsConfig {
    /// API base URI, e.g. `https://api.example.com`.
    pub base_uri: String,
    /// OAuth client id.
    pub client_id: String,
    /// OAuth client secret. Never logged.
    pub secret: String,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Skip TLS certificate validation. Only for trusted test environments.
    #[serde(default)]
    pub accept_invalid_certs: bool,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

fn default_connect_timeout_secs() -> u64 {
    DEFAULT_CONNECT_TIMEOUT_SECS
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

fn default_page_size() -> usize {
    DATASET_PAGE_SIZE
}

impl DatasetsConfig {
    /// Build a config with default transport settings.
    pub fn new(
        base_uri: impl Into<String>,
        client_id: impl Into<String>,
        secret: impl Into<String>,
    ) -> Self {
        Self {
            base_uri: base_uri.into(),
            client_id: client_id.into(),
            secret: secret.into(),
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            accept_invalid_certs: false,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            page_size: DATASET_PAGE_SIZE,
        }
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Base URI without a trailing slash, ready for path concatenation.
    pub fn base(&self) -> &str {
        self.base_uri.trim_end_matches('/')
    }

    /// Check that the configuration can produce a working client.
    ///
    /// # Errors
    /// Returns `SyncError::Config` for empty credentials, a base URI that is
    /// not http(s), zero timeouts or a zero page size.
    pub fn validate(&self) -> Result<()> {
        if self.client_id.trim().is_empty() {
            return Err(SyncError::Config("client_id must not be empty".into()));
        }
        if self.secret.is_empty() {
            return Err(SyncError::Config("secret must not be empty".into()));
        }
        if !(self.base_uri.starts_with("https://") || self.base_uri.starts_with("http://")) {
            return Err(SyncError::Config(format!(
                "base_uri must be an http(s) URI, got '{}'",
                self.base_uri
            )));
        }
        if self.connect_timeout_secs == 0 || self.timeout_secs == 0 {
            return Err(SyncError::Config("timeouts must be greater than zero".into()));
        }
        if self.page_size == 0 {
            return Err(SyncError::Config("page_size must be greater than zero".into()));
        }
        Ok(())
    }
}

impl fmt::Debug for DatasetsConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatasetsConfig")
            .field("base_uri", &self.base_uri)
            .field("client_id", &self.client_id)
            .field("secret", &"<redacted>")
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .field("timeout_secs", &self.timeout_secs)
            .field("accept_invalid_certs", &self.accept_invalid_certs)
            .field("user_agent", &self.user_agent)
            .field("page_size", &self.page_size)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> DatasetsConfig {
        DatasetsConfig::new("https://api.example.com/", "client", "s3cret")
    }

    #[test]
    fn defaults_match_transport_contract() {
        let cfg = config();
        assert_eq!(cfg.connect_timeout(), Duration::from_secs(10));
        assert_eq!(cfg.timeout(), Duration::from_secs(300));
        assert!(!cfg.accept_invalid_certs);
        assert_eq!(cfg.page_size, 50);
        assert_eq!(cfg.base(), "https://api.example.com");
    }

    #[test]
    fn debug_output_redacts_secret() {
        let rendered = format!("{:?}", config());
        assert!(!rendered.contains("s3cret"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn validate_rejects_bad_values() {
        assert!(config().validate().is_ok());

        let mut cfg = config();
        cfg.client_id = "  ".into();
        assert!(matches!(cfg.validate(), Err(SyncError::Config(_))));

        let mut cfg = config();
        cfg.base_uri = "ftp://example.com".into();
        assert!(matches!(cfg.validate(), Err(SyncError::Config(_))));

        let mut cfg = config();
        cfg.timeout_secs = 0;
        assert!(matches!(cfg.validate(), Err(SyncError::Config(_))));
    }

    #[test]
    fn missing_optional_fields_take_defaults() {
        let cfg: DatasetsConfig = serde_json::from_str(
            r#"{"base_uri":"https://api.example.com","client_id":"id","secret":"s"}"#,
        )
        .unwrap();
        assert_eq!(cfg.timeout_secs, 300);
        assert_eq!(cfg.user_agent, DEFAULT_USER_AGENT);
    }
}
