//! Source-specific feature extractors
//!
//! Each extractor is a pure function of its source records (plus any fixed
//! reference data it was built with) and returns one aggregated row per member
//! that appears in the source.

mod app_usage;
mod churn_labels;
mod claims;
mod web_visits;

pub use app_usage::AppUsageFeatureExtractor;
pub use churn_labels::{months_between, ChurnLabelExtractor};
pub use claims::ClaimsFeatureExtractor;
pub use web_visits::WebVisitFeatureExtractor;

/// `count / total`, zero when there is nothing to divide by
pub(crate) fn ratio(count: u32, total: u32) -> f64 {
    if total == 0 {
        0.0
    } else {
        f64::from(count) / f64::from(total)
    }
}
