//! App usage feature extraction

use crate::types::{AppUsageFeatures, AppUsageRecord, FeatureMap};

/// Feature extractor for app usage events.
///
/// `event_type` is constant across the source and ignored. Timestamps are
/// parsed on read but only the event count is derived for now.
pub struct AppUsageFeatureExtractor;

impl AppUsageFeatureExtractor {
    /// Count usage events per member
    pub fn extract(records: &[AppUsageRecord]) -> FeatureMap<AppUsageFeatures> {
        let mut features: FeatureMap<AppUsageFeatures> = FeatureMap::new();

        for record in records {
            features.entry(record.member_id.clone()).or_default().app_usage += 1;
        }

        tracing::debug!(
            records = records.len(),
            members = features.len(),
            "extracted app usage features"
        );
        features
    }
}
