//! Schema inference and reconciliation
//!
//! - [`inference`]: pure mapping from sampled values to column types
//! - [`reconcile`](mod@reconcile): choosing between an inferred and a remote schema, and
//!   projecting rows onto the chosen column order

pub mod inference;
pub mod reconcile;

pub use inference::{infer_column_type, infer_schema, is_datetime_column, normalize_cell};
pub use reconcile::{project_rows, reconcile, Projection, SchemaPlan};
