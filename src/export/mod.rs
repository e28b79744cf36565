//! Export module for costsplit
//!
//! Provides data export functionality in multiple formats:
//! - CSV: one row per segment with its expense context (spreadsheet-compatible)
//! - JSON: machine-readable full database export
//! - YAML: human-readable full database export

pub mod csv;
pub mod json;
pub mod yaml;

pub use csv::export_segments_csv;
pub use json::{export_full_json, FullExport, EXPORT_SCHEMA_VERSION};
pub use yaml::export_full_yaml;
