//! Payload encodings for the Datasets Service

pub mod csv;
