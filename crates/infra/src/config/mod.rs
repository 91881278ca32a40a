//! Configuration loading
//!
//! Produces a validated [`DatasetsConfig`](datasync_domain::DatasetsConfig)
//! from environment variables or configuration files.

pub mod loader;

// Re-export commonly used items
pub use loader::{load, load_from_env, load_from_file, probe_config_paths, validate};
