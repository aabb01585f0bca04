//! Claims feature extraction
//!
//! The diagnosis-code vocabulary is discovered from the data: every distinct
//! `icd_code` becomes a count column, so the output schema varies with input.

use crate::config::PRIORITY_ICD_CODES;
use crate::types::{ClaimRecord, ClaimsFeatureSet, ClaimsFeatures, FeatureMap};
use std::collections::BTreeSet;

/// Feature extractor for claim diagnosis records
pub struct ClaimsFeatureExtractor {
    priority_codes: Vec<String>,
}

impl Default for ClaimsFeatureExtractor {
    fn default() -> Self {
        Self::new(PRIORITY_ICD_CODES.iter().map(|c| c.to_string()).collect())
    }
}

impl ClaimsFeatureExtractor {
    pub fn new(priority_codes: Vec<String>) -> Self {
        Self { priority_codes }
    }

    /// Build per-member code counts over the codes present in `records`.
    ///
    /// Every member row carries an entry for every discovered code.
    pub fn extract(&self, records: &[ClaimRecord]) -> ClaimsFeatureSet {
        // Discovery pass
        let codes: Vec<String> = records
            .iter()
            .map(|r| r.icd_code.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let mut members: FeatureMap<ClaimsFeatures> = FeatureMap::new();
        for record in records {
            let entry = members
                .entry(record.member_id.clone())
                .or_insert_with(|| ClaimsFeatures::zeroed(&codes));
            if let Some(count) = entry.icd_codes.get_mut(&record.icd_code) {
                *count += 1;
            }
        }

        // Priority codes missing from the data contribute nothing
        let priority: Vec<&String> = self
            .priority_codes
            .iter()
            .filter(|c| codes.contains(c))
            .collect();

        for features in members.values_mut() {
            features.code_count = features.icd_codes.values().sum();
            features.priority_condition_count =
                priority.iter().map(|c| features.count_for(c)).sum();
        }

        tracing::debug!(
            records = records.len(),
            members = members.len(),
            codes = codes.len(),
            "extracted claims features"
        );

        ClaimsFeatureSet { codes, members }
    }
}
