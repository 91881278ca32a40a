//! # DataSync Domain
//!
//! Domain types for synchronizing tabular data into the Datasets Service.
//!
//! This crate contains:
//! - Dataset, schema, row and token types
//! - The [`SyncError`] taxonomy and [`Result`] alias
//! - Client configuration structures
//! - Protocol constants
//!
//! ## Architecture
//! - No dependencies on other DataSync crates
//! - Pure data structures, no I/O

pub mod config;
pub mod constants;
pub mod errors;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
