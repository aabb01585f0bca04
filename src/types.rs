//! Core types for the churn feature pipeline
//!
//! This module defines the data structures that flow through each stage of the
//! pipeline: raw source records, per-source feature rows, and the merged
//! member feature record.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Stable plan-member identifier, the join key across all sources
pub type MemberId = String;

/// Per-member feature rows keyed (and ordered) by member id
pub type FeatureMap<T> = BTreeMap<MemberId, T>;

/// One web content visit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebVisitRecord {
    pub member_id: MemberId,
    /// Content label of the visited page
    pub title: String,
}

/// One mobile app usage event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppUsageRecord {
    pub member_id: MemberId,
    /// Constant across the source; carries no signal
    pub event_type: String,
    pub timestamp: NaiveDateTime,
}

/// One insurance claim diagnosis
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimRecord {
    pub member_id: MemberId,
    pub icd_code: String,
}

/// Churn outcome and signup date for one member
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChurnLabelRecord {
    pub member_id: MemberId,
    pub signup_date: NaiveDate,
    /// Outcome as it appears in the source (e.g. "0"/"1" or "true"/"false")
    pub churn_label: String,
}

/// Web visit features for one member.
///
/// `Default` is the all-zero row used for members without visits.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WebVisitFeatures {
    pub diet_visits: u32,
    pub physical_activity_visits: u32,
    pub sleep_visits: u32,
    pub resilience_visits: u32,
    pub clinical_visits: u32,
    pub total_health_visits: u32,
    pub total_visits: u32,
    pub diet_visits_ratio: f64,
    pub physical_activity_visits_ratio: f64,
    pub sleep_visits_ratio: f64,
    pub resilience_visits_ratio: f64,
    pub clinical_visits_ratio: f64,
    pub total_health_visits_ratio: f64,
    pub non_relevant_visits: u32,
    pub health_engagement_ratio: f64,
    /// Number of the five categories with at least one visit (0-5)
    pub category_diversity: u32,
}

impl WebVisitFeatures {
    /// Column names in output order
    pub const COLUMNS: [&'static str; 16] = [
        "diet_visits",
        "physical_activity_visits",
        "sleep_visits",
        "resilience_visits",
        "clinical_visits",
        "total_health_visits",
        "total_visits",
        "diet_visits_ratio",
        "physical_activity_visits_ratio",
        "sleep_visits_ratio",
        "resilience_visits_ratio",
        "clinical_visits_ratio",
        "total_health_visits_ratio",
        "non_relevant_visits",
        "health_engagement_ratio",
        "category_diversity",
    ];

    /// Cell values in the order of [`Self::COLUMNS`]
    pub fn values(&self) -> Vec<String> {
        vec![
            self.diet_visits.to_string(),
            self.physical_activity_visits.to_string(),
            self.sleep_visits.to_string(),
            self.resilience_visits.to_string(),
            self.clinical_visits.to_string(),
            self.total_health_visits.to_string(),
            self.total_visits.to_string(),
            self.diet_visits_ratio.to_string(),
            self.physical_activity_visits_ratio.to_string(),
            self.sleep_visits_ratio.to_string(),
            self.resilience_visits_ratio.to_string(),
            self.clinical_visits_ratio.to_string(),
            self.total_health_visits_ratio.to_string(),
            self.non_relevant_visits.to_string(),
            self.health_engagement_ratio.to_string(),
            self.category_diversity.to_string(),
        ]
    }
}

/// App usage features for one member
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppUsageFeatures {
    pub app_usage: u32,
}

/// Claims features for one member
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimsFeatures {
    /// Count per diagnosis code; keys are the codes discovered in the input
    pub icd_codes: BTreeMap<String, u32>,
    pub code_count: u32,
    pub priority_condition_count: u32,
}

impl ClaimsFeatures {
    /// An all-zero row carrying one entry per known code
    pub fn zeroed(codes: &[String]) -> Self {
        Self {
            icd_codes: codes.iter().map(|c| (c.clone(), 0)).collect(),
            code_count: 0,
            priority_condition_count: 0,
        }
    }

    /// Count for a code, zero when the member never had it
    pub fn count_for(&self, code: &str) -> u32 {
        self.icd_codes.get(code).copied().unwrap_or(0)
    }
}

/// Claims features for all members, plus the code vocabulary discovered in the data
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimsFeatureSet {
    /// Distinct codes present in the input, sorted
    pub codes: Vec<String>,
    pub members: FeatureMap<ClaimsFeatures>,
}

/// Label row with derived tenure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChurnLabelFeatures {
    pub member_id: MemberId,
    pub signup_date: NaiveDate,
    pub churn_label: String,
    /// Calendar-month difference between signup and the reference date
    pub months_in_app: i32,
}

/// Final merged row: one per member in the churn-label source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberFeatureRecord {
    pub member_id: MemberId,
    pub churn_label: String,
    pub months_in_app: i32,
    #[serde(flatten)]
    pub web: WebVisitFeatures,
    #[serde(flatten)]
    pub app: AppUsageFeatures,
    #[serde(flatten)]
    pub claims: ClaimsFeatures,
}
