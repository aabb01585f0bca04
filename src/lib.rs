//! Churn Features - per-member feature table for churn prediction
//!
//! Builds one row per known member from four raw sources through a
//! deterministic pipeline: source reading → per-source feature extraction →
//! left-join onto churn labels → zero fill.
//!
//! ## Sources
//!
//! - **Web visits**: content titles categorized into five health vocabularies
//! - **App usage**: usage event counts
//! - **Claims**: per-diagnosis-code counts over a data-driven code vocabulary
//! - **Churn labels**: outcome plus calendar-month tenure; defines the row set

pub mod config;
pub mod error;
pub mod extractors;
pub mod pipeline;
pub mod sources;
pub mod table;
pub mod types;

pub use config::{CategoryVocabularies, ContentCategory, PipelineConfig, SourcePaths};
pub use error::FeatureError;
pub use pipeline::{extract_all_features, merge, FeatureMerger, SourceRecords};
pub use table::FeatureTable;

/// Crate version, reported by the CLI
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
