//! Configuration loader
//!
//! Loads the Datasets Service connection settings from environment variables
//! or files.
//!
//! ## Loading Strategy
//! 1. First, attempts to load from environment variables
//! 2. If incomplete, falls back to loading from file
//! 3. Probes multiple paths for config files
//! 4. Supports JSON and TOML formats
//!
//! ## Environment Variables
//! - `DATASYNC_BASE_URI`: API base URI (required)
//! - `DATASYNC_CLIENT_ID`: OAuth client id (required)
//! - `DATASYNC_SECRET`: OAuth client secret (required)
//! - `DATASYNC_CONNECT_TIMEOUT_SECS`: Connect timeout in seconds
//! - `DATASYNC_TIMEOUT_SECS`: Total request timeout in seconds
//! - `DATASYNC_ACCEPT_INVALID_CERTS`: Skip TLS validation (true/false)
//! - `DATASYNC_USER_AGENT`: `User-Agent` header value
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./datasync.toml` or `./datasync.json` (current working directory)
//! 2. `./config.toml` or `./config.json` (current working directory)

use std::path::{Path, PathBuf};

use datasync_domain::{DatasetsConfig, Result, SyncError};
use tracing::{debug, info, warn};
use url::Url;

use crate::errors::InfraError;

pub const ENV_BASE_URI: &str = "DATASYNC_BASE_URI";
pub const ENV_CLIENT_ID: &str = "DATASYNC_CLIENT_ID";
pub const ENV_SECRET: &str = "DATASYNC_SECRET";
pub const ENV_CONNECT_TIMEOUT_SECS: &str = "DATASYNC_CONNECT_TIMEOUT_SECS";
pub const ENV_TIMEOUT_SECS: &str = "DATASYNC_TIMEOUT_SECS";
pub const ENV_ACCEPT_INVALID_CERTS: &str = "DATASYNC_ACCEPT_INVALID_CERTS";
pub const ENV_USER_AGENT: &str = "DATASYNC_USER_AGENT";

const CONFIG_FILE_NAMES: [&str; 4] = ["datasync.toml", "datasync.json", "config.toml", "config.json"];

/// Load configuration with automatic fallback strategy
///
/// First attempts to load from environment variables. If any required
/// variables are missing, falls back to loading from a config file.
///
/// # Errors
/// Returns `SyncError::Config` if:
/// - Configuration cannot be loaded from either source
/// - File format is invalid
/// - The loaded values fail validation
pub fn load() -> Result<DatasetsConfig> {
    match load_from_env() {
        Ok(config) => {
            info!("Configuration loaded from environment variables");
            Ok(config)
        }
        Err(e) => {
            debug!(error = %e, "Failed to load from environment, trying file");
            load_from_file(None)
        }
    }
}

/// Load configuration from environment variables
///
/// # Errors
/// Returns `SyncError::Config` if required variables are missing or have
/// invalid values.
pub fn load_from_env() -> Result<DatasetsConfig> {
    let mut config =
        DatasetsConfig::new(env_var(ENV_BASE_URI)?, env_var(ENV_CLIENT_ID)?, env_var(ENV_SECRET)?);

    if let Some(secs) = env_u64(ENV_CONNECT_TIMEOUT_SECS)? {
        config.connect_timeout_secs = secs;
    }
    if let Some(secs) = env_u64(ENV_TIMEOUT_SECS)? {
        config.timeout_secs = secs;
    }
    config.accept_invalid_certs = env_bool(ENV_ACCEPT_INVALID_CERTS, false);
    if let Ok(agent) = std::env::var(ENV_USER_AGENT) {
        config.user_agent = agent;
    }

    validate(&config)?;
    Ok(config)
}

/// Load configuration from a file
///
/// If `path` is `None`, probes the standard locations (see
/// [`probe_config_paths`]). The format is chosen by file extension.
///
/// # Errors
/// Returns `SyncError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
/// - The loaded values fail validation
pub fn load_from_file(path: Option<PathBuf>) -> Result<DatasetsConfig> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(SyncError::Config(format!("Config file not found: {}", p.display())));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            SyncError::Config("No config file found in any of the standard locations".to_string())
        })?,
    };

    info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| SyncError::Config(format!("Failed to read config file: {e}")))?;

    let config = parse_config(&contents, &config_path)?;
    validate(&config)?;
    Ok(config)
}

/// Parse configuration from string content
///
/// Format is detected by file extension (`.json` or `.toml`); files without
/// an extension are read as JSON.
fn parse_config(contents: &str, path: &Path) -> Result<DatasetsConfig> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents).map_err(|e| InfraError::from(e).into()),
        "json" => serde_json::from_str(contents)
            .map_err(|e| SyncError::Config(format!("Invalid JSON format: {e}"))),
        _ => Err(SyncError::Config(format!("Unsupported config format: {extension}"))),
    }
}

/// Check a loaded configuration before any client is built from it.
///
/// Runs the structural checks of [`DatasetsConfig::validate`] and also
/// requires the base URI to parse.
///
/// # Errors
/// Returns `SyncError::Config` describing the first problem found.
pub fn validate(config: &DatasetsConfig) -> Result<()> {
    config.validate()?;
    Url::parse(config.base()).map_err(InfraError::from)?;

    if config.accept_invalid_certs {
        warn!(base_uri = %config.base_uri, "TLS certificate validation disabled by configuration");
    }
    Ok(())
}

/// Probe the standard paths for configuration files
///
/// # Returns
/// The first config file found in the current working directory, or `None`
/// if none exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    let cwd = std::env::current_dir().ok()?;
    probe_in(&cwd)
}

fn probe_in(dir: &Path) -> Option<PathBuf> {
    CONFIG_FILE_NAMES.iter().map(|name| dir.join(name)).find(|path| path.exists())
}

/// Get required environment variable
fn env_var(key: &str) -> Result<String> {
    std::env::var(key)
        .map_err(|_| SyncError::Config(format!("Missing required environment variable: {key}")))
}

/// Parse an optional numeric environment variable.
fn env_u64(key: &str) -> Result<Option<u64>> {
    std::env::var(key)
        .ok()
        .map(|value| {
            value
                .trim()
                .parse::<u64>()
                .map_err(|e| SyncError::Config(format!("Invalid value for {key}: {e}")))
        })
        .transpose()
}

/// Parse boolean from environment variable
///
/// Accepts: `1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off` (case-insensitive)
fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .map_or(default, |s| matches!(s.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
}
