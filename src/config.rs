//! Pipeline configuration
//!
//! Holds the fixed reference data the extractors need (category vocabularies,
//! priority diagnosis codes, tenure reference date) and the input file paths.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::PathBuf;

/// Diagnosis codes counted toward `priority_condition_count`
pub const PRIORITY_ICD_CODES: [&str; 3] = ["E11.9", "I10", "Z71.3"];

/// Tenure reference date
pub const REFERENCE_DATE: NaiveDate = match NaiveDate::from_ymd_opt(2025, 5, 1) {
    Some(date) => date,
    None => panic!("invalid reference date"),
};

const DIET_TITLES: [&str; 5] = [
    "High-fiber meals",
    "Cholesterol friendly foods",
    "Mediterranean diet",
    "Healthy eating guide",
    "Weight management",
];

const PHYSICAL_ACTIVITY_TITLES: [&str; 4] = [
    "Aerobic exercise",
    "Exercise routines",
    "Strength training basics",
    "Cardio workouts",
];

const SLEEP_TITLES: [&str; 2] = ["Restorative sleep tips", "Sleep hygiene"];

const RESILIENCE_TITLES: [&str; 2] = ["Stress reduction", "Meditation guide"];

const CLINICAL_TITLES: [&str; 5] = [
    "Diabetes management",
    "Hypertension basics",
    "Lowering blood pressure",
    "Cardiometabolic health",
    "HbA1c targets",
];

/// Health content category of a web page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentCategory {
    Diet,
    PhysicalActivity,
    Sleep,
    Resilience,
    Clinical,
}

impl ContentCategory {
    pub const ALL: [ContentCategory; 5] = [
        ContentCategory::Diet,
        ContentCategory::PhysicalActivity,
        ContentCategory::Sleep,
        ContentCategory::Resilience,
        ContentCategory::Clinical,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ContentCategory::Diet => "diet",
            ContentCategory::PhysicalActivity => "physical_activity",
            ContentCategory::Sleep => "sleep",
            ContentCategory::Resilience => "resilience",
            ContentCategory::Clinical => "clinical",
        }
    }
}

/// The five title vocabularies used to categorize web visits.
///
/// Matching is exact and case-sensitive. The sets may overlap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryVocabularies {
    diet: HashSet<String>,
    physical_activity: HashSet<String>,
    sleep: HashSet<String>,
    resilience: HashSet<String>,
    clinical: HashSet<String>,
}

impl Default for CategoryVocabularies {
    fn default() -> Self {
        Self::new(
            DIET_TITLES,
            PHYSICAL_ACTIVITY_TITLES,
            SLEEP_TITLES,
            RESILIENCE_TITLES,
            CLINICAL_TITLES,
        )
    }
}

impl CategoryVocabularies {
    /// Build vocabularies from arbitrary title lists
    pub fn new<D, P, S, R, C>(diet: D, physical_activity: P, sleep: S, resilience: R, clinical: C) -> Self
    where
        D: IntoIterator,
        D::Item: Into<String>,
        P: IntoIterator,
        P::Item: Into<String>,
        S: IntoIterator,
        S::Item: Into<String>,
        R: IntoIterator,
        R::Item: Into<String>,
        C: IntoIterator,
        C::Item: Into<String>,
    {
        Self {
            diet: diet.into_iter().map(Into::into).collect(),
            physical_activity: physical_activity.into_iter().map(Into::into).collect(),
            sleep: sleep.into_iter().map(Into::into).collect(),
            resilience: resilience.into_iter().map(Into::into).collect(),
            clinical: clinical.into_iter().map(Into::into).collect(),
        }
    }

    /// Titles belonging to a category
    pub fn titles(&self, category: ContentCategory) -> &HashSet<String> {
        match category {
            ContentCategory::Diet => &self.diet,
            ContentCategory::PhysicalActivity => &self.physical_activity,
            ContentCategory::Sleep => &self.sleep,
            ContentCategory::Resilience => &self.resilience,
            ContentCategory::Clinical => &self.clinical,
        }
    }

    /// Whether `title` is in the given category
    pub fn matches(&self, category: ContentCategory, title: &str) -> bool {
        self.titles(category).contains(title)
    }
}

/// Locations of the four input files
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourcePaths {
    pub web_visits: PathBuf,
    pub app_usage: PathBuf,
    pub claims: PathBuf,
    pub churn_labels: PathBuf,
}

impl Default for SourcePaths {
    fn default() -> Self {
        Self {
            web_visits: PathBuf::from("data/web_visits.csv"),
            app_usage: PathBuf::from("data/app_usage.csv"),
            claims: PathBuf::from("data/claims.csv"),
            churn_labels: PathBuf::from("data/churn_labels.csv"),
        }
    }
}

/// Everything the pipeline needs for one batch run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub sources: SourcePaths,
    pub vocabularies: CategoryVocabularies,
    pub priority_codes: Vec<String>,
    pub reference_date: NaiveDate,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            sources: SourcePaths::default(),
            vocabularies: CategoryVocabularies::default(),
            priority_codes: PRIORITY_ICD_CODES.iter().map(|c| c.to_string()).collect(),
            reference_date: default_reference_date(),
        }
    }
}

impl PipelineConfig {
    /// Create a config with the default sources and reference data
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a specific set of input files
    pub fn with_sources(mut self, sources: SourcePaths) -> Self {
        self.sources = sources;
        self
    }

    /// Use synthetic category vocabularies
    pub fn with_vocabularies(mut self, vocabularies: CategoryVocabularies) -> Self {
        self.vocabularies = vocabularies;
        self
    }

    /// Use a different set of priority diagnosis codes
    pub fn with_priority_codes<I>(mut self, codes: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.priority_codes = codes.into_iter().map(Into::into).collect();
        self
    }

    /// Override the tenure reference date
    pub fn with_reference_date(mut self, reference_date: NaiveDate) -> Self {
        self.reference_date = reference_date;
        self
    }
}

/// The fixed tenure reference date, 2025-05-01
pub fn default_reference_date() -> NaiveDate {
    REFERENCE_DATE
}
