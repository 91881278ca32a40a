//! Keyed cache store with per-entry time-to-live
//!
//! [`TtlCache`] wraps a [`moka::sync::Cache`] and adds the semantics the
//! dataset client needs from its cache collaborator:
//!
//! - **get-or-compute**: a miss runs the loader once per key, even when
//!   several threads ask at the same time
//! - **per-entry TTL**: each insert decides its own lifetime (or none),
//!   measured against an injectable [`Clock`](crate::time::Clock)
//! - **explicit invalidation**: single keys, predicates, or everything
//!
//! Failed loads are never cached.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//!
//! use datasync_common::cache::TtlCache;
//!
//! let cache: TtlCache<String, u32> = TtlCache::new(100);
//! let value: Result<u32, String> = cache
//!     .get_or_try_insert_with("answer".to_string(), || Ok((42, Some(Duration::from_secs(60)))));
//! assert_eq!(value, Ok(42));
//! assert_eq!(cache.get(&"answer".to_string()), Some(42));
//! ```

mod ttl;

pub use ttl::{TtlCache, DEFAULT_MAX_CAPACITY};
