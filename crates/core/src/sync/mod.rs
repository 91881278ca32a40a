//! Batch synchronization of local rows into remote datasets

pub mod batch;
pub mod ports;
pub mod service;

pub use service::DatasetSynchronizer;
