//! Error types for churn feature extraction

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading sources or building features.
///
/// Every failure aborts the run; there is no per-row recovery.
#[derive(Debug, Error)]
pub enum FeatureError {
    #[error("Failed to open {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Source '{source_name}' is missing required column '{column}'")]
    MissingColumn {
        source_name: &'static str,
        column: &'static str,
    },

    #[error("Source '{source_name}' row {row}: empty value in column '{column}'")]
    MissingValue {
        source_name: &'static str,
        row: usize,
        column: &'static str,
    },

    #[error("Row {row}: unparseable timestamp '{value}'")]
    TimestampParse { row: usize, value: String },

    #[error("Row {row}: unparseable signup date '{value}'")]
    DateParse { row: usize, value: String },

    #[error("Duplicate churn label for member '{member_id}'")]
    DuplicateMember { member_id: String },

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}
