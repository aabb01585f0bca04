//! Pipeline orchestration
//!
//! This module provides the public API for building the churn feature table.
//! It runs the four extractors and left-joins their outputs onto the churn
//! labels, which define the row universe.

use crate::config::{PipelineConfig, SourcePaths};
use crate::error::FeatureError;
use crate::extractors::{
    AppUsageFeatureExtractor, ChurnLabelExtractor, ClaimsFeatureExtractor,
    WebVisitFeatureExtractor,
};
use crate::sources::load_records;
use crate::table::FeatureTable;
use crate::types::{
    AppUsageFeatures, AppUsageRecord, ChurnLabelFeatures, ChurnLabelRecord, ClaimRecord,
    ClaimsFeatureSet, ClaimsFeatures, FeatureMap, MemberFeatureRecord, WebVisitFeatures,
    WebVisitRecord,
};
use std::collections::HashSet;

/// Build the feature table from the four default input files.
///
/// # Example
/// ```ignore
/// let table = extract_all_features(&SourcePaths::default())?;
/// print!("{}", table.head(5));
/// ```
pub fn extract_all_features(sources: &SourcePaths) -> Result<FeatureTable, FeatureError> {
    FeatureMerger::new(PipelineConfig::new().with_sources(sources.clone())).run()
}

/// Raw records of all four sources, as handed over by the reader layer
#[derive(Debug, Clone, Default)]
pub struct SourceRecords {
    pub web_visits: Vec<WebVisitRecord>,
    pub app_usage: Vec<AppUsageRecord>,
    pub claims: Vec<ClaimRecord>,
    pub churn_labels: Vec<ChurnLabelRecord>,
}

impl SourceRecords {
    /// Read every source listed in `paths`, failing on the first error
    pub fn load(paths: &SourcePaths) -> Result<Self, FeatureError> {
        Ok(Self {
            web_visits: load_records(&paths.web_visits)?,
            app_usage: load_records(&paths.app_usage)?,
            claims: load_records(&paths.claims)?,
            churn_labels: load_records(&paths.churn_labels)?,
        })
    }
}

/// Runs the extractors and merges their outputs
pub struct FeatureMerger {
    config: PipelineConfig,
    web: WebVisitFeatureExtractor,
    claims: ClaimsFeatureExtractor,
    labels: ChurnLabelExtractor,
}

impl Default for FeatureMerger {
    fn default() -> Self {
        Self::new(PipelineConfig::default())
    }
}

impl FeatureMerger {
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            web: WebVisitFeatureExtractor::new(config.vocabularies.clone()),
            claims: ClaimsFeatureExtractor::new(config.priority_codes.clone()),
            labels: ChurnLabelExtractor::new(config.reference_date),
            config,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Load the configured sources and build the table
    pub fn run(&self) -> Result<FeatureTable, FeatureError> {
        tracing::info!(sources = ?self.config.sources, "loading sources");
        let records = SourceRecords::load(&self.config.sources)?;
        self.process(&records)
    }

    /// Extract features from already loaded records and merge them
    pub fn process(&self, records: &SourceRecords) -> Result<FeatureTable, FeatureError> {
        let web = self.web.extract(&records.web_visits);
        let app = AppUsageFeatureExtractor::extract(&records.app_usage);
        let claims = self.claims.extract(&records.claims);
        let labels = self.labels.extract(&records.churn_labels);

        merge(labels, &web, &app, &claims)
    }
}

/// Left-join web, app and claims features onto the labels.
///
/// Members without a row in a source get that source's all-zero features.
/// Members absent from the labels are dropped. `signup_date` is not carried.
pub fn merge(
    labels: Vec<ChurnLabelFeatures>,
    web: &FeatureMap<WebVisitFeatures>,
    app: &FeatureMap<AppUsageFeatures>,
    claims: &ClaimsFeatureSet,
) -> Result<FeatureTable, FeatureError> {
    let mut seen: HashSet<String> = HashSet::with_capacity(labels.len());
    let mut rows = Vec::with_capacity(labels.len());
    let mut unmatched = [0usize; 3];

    for label in labels {
        if !seen.insert(label.member_id.clone()) {
            return Err(FeatureError::DuplicateMember {
                member_id: label.member_id,
            });
        }

        let web_features = web.get(&label.member_id).cloned().unwrap_or_else(|| {
            unmatched[0] += 1;
            WebVisitFeatures::default()
        });
        let app_features = app.get(&label.member_id).copied().unwrap_or_else(|| {
            unmatched[1] += 1;
            AppUsageFeatures::default()
        });
        let claims_features = claims
            .members
            .get(&label.member_id)
            .cloned()
            .unwrap_or_else(|| {
                unmatched[2] += 1;
                ClaimsFeatures::zeroed(&claims.codes)
            });

        rows.push(MemberFeatureRecord {
            member_id: label.member_id,
            churn_label: label.churn_label,
            months_in_app: label.months_in_app,
            web: web_features,
            app: app_features,
            claims: claims_features,
        });
    }

    let dropped = web
        .keys()
        .chain(app.keys())
        .chain(claims.members.keys())
        .filter(|m| !seen.contains(*m))
        .collect::<HashSet<_>>()
        .len();

    tracing::info!(
        members = rows.len(),
        claim_codes = claims.codes.len(),
        no_web_visits = unmatched[0],
        no_app_usage = unmatched[1],
        no_claims = unmatched[2],
        dropped_unlabelled = dropped,
        "merged member features"
    );

    Ok(FeatureTable::new(claims.codes.clone(), rows))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::read_records;
    use pretty_assertions::assert_eq;

    const WEB_CSV: &str = "member_id,title\n\
        M1,Mediterranean diet\n\
        M1,Aerobic exercise\n\
        M1,Unrelated page\n\
        M2,Sleep hygiene\n\
        M9,Stress reduction\n";

    const APP_CSV: &str = "member_id,event_type,timestamp\n\
        M1,session,2025-04-01 08:00:00\n\
        M1,session,2025-04-02 09:30:00\n\
        M3,session,2025-04-03T10:00:00\n\
        M9,session,2025-04-04 11:00:00\n";

    const CLAIMS_CSV: &str = "member_id,icd_code\n\
        M2,I10\n\
        M2,I10\n\
        M2,E66.9\n\
        M1,Z71.3\n\
        M8,E11.9\n";

    const LABELS_CSV: &str = "member_id,signup_date,churn_label\n\
        M1,2024-05-01,0\n\
        M2,2025-04-15,1\n\
        M3,2025-04-30,0\n\
        M4,2023-01-20,1\n";

    fn sample_records() -> SourceRecords {
        SourceRecords {
            web_visits: read_records(WEB_CSV.as_bytes()).unwrap(),
            app_usage: read_records(APP_CSV.as_bytes()).unwrap(),
            claims: read_records(CLAIMS_CSV.as_bytes()).unwrap(),
            churn_labels: read_records(LABELS_CSV.as_bytes()).unwrap(),
        }
    }

    fn sample_table() -> FeatureTable {
        FeatureMerger::default().process(&sample_records()).unwrap()
    }

    #[test]
    fn test_row_universe_is_label_source() {
        let table = sample_table();
        let members: Vec<&str> = table.rows.iter().map(|r| r.member_id.as_str()).collect();

        assert_eq!(members, vec!["M1", "M2", "M3", "M4"]);
        assert!(table.get("M8").is_none());
        assert!(table.get("M9").is_none());
    }

    #[test]
    fn test_merged_features() {
        let table = sample_table();

        let m1 = table.get("M1").unwrap();
        assert_eq!(m1.months_in_app, 12);
        assert_eq!(m1.web.total_visits, 3);
        assert_eq!(m1.web.category_diversity, 2);
        assert_eq!(m1.app.app_usage, 2);
        assert_eq!(m1.claims.code_count, 1);
        assert_eq!(m1.claims.priority_condition_count, 1);

        let m2 = table.get("M2").unwrap();
        assert_eq!(m2.churn_label, "1");
        assert_eq!(m2.months_in_app, 1);
        assert_eq!(m2.web.sleep_visits, 1);
        assert_eq!(m2.app.app_usage, 0);
        assert_eq!(m2.claims.code_count, 3);
        assert_eq!(m2.claims.priority_condition_count, 2);
    }

    #[test]
    fn test_absent_sources_fill_with_zero() {
        let table = sample_table();
        let m4 = table.get("M4").unwrap();

        assert_eq!(m4.web, WebVisitFeatures::default());
        assert_eq!(m4.web.diet_visits_ratio, 0.0);
        assert_eq!(m4.app.app_usage, 0);
        assert_eq!(m4.claims.code_count, 0);
        assert_eq!(m4.claims.priority_condition_count, 0);
        // Zero-filled claim rows still carry every discovered code
        assert_eq!(m4.claims.icd_codes.len(), table.claim_codes.len());
        assert!(m4.claims.icd_codes.values().all(|c| *c == 0));
    }

    #[test]
    fn test_table_invariants() {
        let table = sample_table();

        for row in &table.rows {
            let web = &row.web;
            assert_eq!(web.health_engagement_ratio, web.total_health_visits_ratio);
            assert!(web.category_diversity <= 5);

            let any_category = [
                web.diet_visits,
                web.physical_activity_visits,
                web.sleep_visits,
                web.resilience_visits,
                web.clinical_visits,
            ]
            .iter()
            .any(|c| *c > 0);
            assert_eq!(web.category_diversity == 0, !any_category);

            if web.total_visits > 0 {
                for r in [
                    web.diet_visits_ratio,
                    web.physical_activity_visits_ratio,
                    web.sleep_visits_ratio,
                    web.resilience_visits_ratio,
                    web.clinical_visits_ratio,
                    web.total_health_visits_ratio,
                ] {
                    assert!((0.0..=1.0).contains(&r));
                }
            }

            assert!(row.claims.priority_condition_count <= row.claims.code_count);
        }
    }

    #[test]
    fn test_claim_codes_cover_unlabelled_members() {
        // Codes come from the whole claims source, including dropped members
        let table = sample_table();
        assert_eq!(table.claim_codes, vec!["E11.9", "E66.9", "I10", "Z71.3"]);
    }

    #[test]
    fn test_priority_codes_from_config() {
        let config = PipelineConfig::new().with_priority_codes(["E66.9"]);
        let merger = FeatureMerger::new(config);
        let table = merger.process(&sample_records()).unwrap();

        assert_eq!(merger.config().priority_codes, vec!["E66.9"]);
        assert_eq!(table.get("M2").unwrap().claims.priority_condition_count, 1);
        assert_eq!(table.get("M1").unwrap().claims.priority_condition_count, 0);
    }

    #[test]
    fn test_duplicate_label_rejected() {
        let mut records = sample_records();
        records.churn_labels.push(records.churn_labels[0].clone());

        let result = FeatureMerger::default().process(&records);
        assert!(matches!(
            result,
            Err(FeatureError::DuplicateMember { ref member_id }) if member_id == "M1"
        ));
    }

    #[test]
    fn test_empty_labels_yield_empty_table() {
        let mut records = sample_records();
        records.churn_labels.clear();

        let table = FeatureMerger::default().process(&records).unwrap();
        assert!(table.is_empty());
        assert_eq!(table.claim_codes.len(), 4);
    }

    #[test]
    fn test_missing_source_file_aborts() {
        let sources = SourcePaths {
            web_visits: "does/not/exist/web_visits.csv".into(),
            ..SourcePaths::default()
        };

        let result = extract_all_features(&sources);
        assert!(matches!(result, Err(FeatureError::Io { .. })));
    }
}
