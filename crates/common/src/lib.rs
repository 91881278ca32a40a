//! Shared utilities for the DataSync crates.
//!
//! # Feature Tiers
//!
//! - default: clock abstraction ([`time`]) with no side effects
//! - `runtime`: the keyed TTL cache store ([`cache`]) backed by moka
//! - `test-utils`: `runtime` plus `MockClock` for downstream test suites

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::complexity, clippy::suspicious)]

pub mod time;

// Runtime tier
// --------------------------------------------------------------------
#[cfg(feature = "runtime")]
pub mod cache;

// Re-export commonly used types and traits for convenience
// ------------------------
#[cfg(feature = "runtime")]
pub use cache::TtlCache;
pub use time::{Clock, SystemClock};
#[cfg(any(test, feature = "test-utils"))]
pub use time::MockClock;
