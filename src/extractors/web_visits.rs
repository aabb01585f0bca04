//! Web visit feature extraction
//!
//! Categorizes each visit title against the five health content vocabularies
//! and aggregates per member:
//! - Per-category visit counts and ratios
//! - Health vs. non-relevant visit split
//! - Category diversity

use super::ratio;
use crate::config::{CategoryVocabularies, ContentCategory};
use crate::types::{FeatureMap, WebVisitFeatures, WebVisitRecord};

/// Per-member running counts before ratios are derived
#[derive(Debug, Default)]
struct VisitCounts {
    diet: u32,
    physical_activity: u32,
    sleep: u32,
    resilience: u32,
    clinical: u32,
    health: u32,
    total: u32,
}

impl VisitCounts {
    fn category_mut(&mut self, category: ContentCategory) -> &mut u32 {
        match category {
            ContentCategory::Diet => &mut self.diet,
            ContentCategory::PhysicalActivity => &mut self.physical_activity,
            ContentCategory::Sleep => &mut self.sleep,
            ContentCategory::Resilience => &mut self.resilience,
            ContentCategory::Clinical => &mut self.clinical,
        }
    }
}

/// Feature extractor for web visit records
pub struct WebVisitFeatureExtractor {
    vocabularies: CategoryVocabularies,
}

impl Default for WebVisitFeatureExtractor {
    fn default() -> Self {
        Self::new(CategoryVocabularies::default())
    }
}

impl WebVisitFeatureExtractor {
    pub fn new(vocabularies: CategoryVocabularies) -> Self {
        Self { vocabularies }
    }

    /// Categories a title belongs to. Vocabularies may overlap, so this can
    /// return more than one.
    pub fn categorize(&self, title: &str) -> Vec<ContentCategory> {
        ContentCategory::ALL
            .into_iter()
            .filter(|c| self.vocabularies.matches(*c, title))
            .collect()
    }

    /// Aggregate visits into one feature row per member with at least one visit
    pub fn extract(&self, records: &[WebVisitRecord]) -> FeatureMap<WebVisitFeatures> {
        let mut counts: FeatureMap<VisitCounts> = FeatureMap::new();

        for record in records {
            let entry = counts.entry(record.member_id.clone()).or_default();
            let categories = self.categorize(&record.title);

            for category in &categories {
                *entry.category_mut(*category) += 1;
            }
            // A title in two vocabularies counts once toward health visits
            if !categories.is_empty() {
                entry.health += 1;
            }
            entry.total += 1;
        }

        tracing::debug!(
            records = records.len(),
            members = counts.len(),
            "extracted web visit features"
        );

        counts
            .into_iter()
            .map(|(member_id, c)| (member_id, derive_features(&c)))
            .collect()
    }
}

fn derive_features(c: &VisitCounts) -> WebVisitFeatures {
    let category_diversity = [c.diet, c.physical_activity, c.sleep, c.resilience, c.clinical]
        .iter()
        .filter(|count| **count > 0)
        .count() as u32;
    let health_ratio = ratio(c.health, c.total);

    WebVisitFeatures {
        diet_visits: c.diet,
        physical_activity_visits: c.physical_activity,
        sleep_visits: c.sleep,
        resilience_visits: c.resilience,
        clinical_visits: c.clinical,
        total_health_visits: c.health,
        total_visits: c.total,
        diet_visits_ratio: ratio(c.diet, c.total),
        physical_activity_visits_ratio: ratio(c.physical_activity, c.total),
        sleep_visits_ratio: ratio(c.sleep, c.total),
        resilience_visits_ratio: ratio(c.resilience, c.total),
        clinical_visits_ratio: ratio(c.clinical, c.total),
        total_health_visits_ratio: health_ratio,
        non_relevant_visits: c.total - c.health,
        health_engagement_ratio: health_ratio,
        category_diversity,
    }
}
