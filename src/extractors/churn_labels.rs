//! Churn label extraction and tenure derivation

use crate::config::default_reference_date;
use crate::types::{ChurnLabelFeatures, ChurnLabelRecord};
use chrono::{Datelike, NaiveDate};

/// Calendar-month difference `to - from`, ignoring day of month.
///
/// 2025-04-30 and 2025-04-01 are both one month before 2025-05-01.
pub fn months_between(from: NaiveDate, to: NaiveDate) -> i32 {
    (to.year() - from.year()) * 12 + (to.month() as i32 - from.month() as i32)
}

/// Loads labels and derives `months_in_app`
pub struct ChurnLabelExtractor {
    reference_date: NaiveDate,
}

impl Default for ChurnLabelExtractor {
    fn default() -> Self {
        Self::new(default_reference_date())
    }
}

impl ChurnLabelExtractor {
    pub fn new(reference_date: NaiveDate) -> Self {
        Self { reference_date }
    }

    pub fn reference_date(&self) -> NaiveDate {
        self.reference_date
    }

    /// Attach tenure to each label, preserving source order
    pub fn extract(&self, records: &[ChurnLabelRecord]) -> Vec<ChurnLabelFeatures> {
        let labels: Vec<ChurnLabelFeatures> = records
            .iter()
            .map(|r| ChurnLabelFeatures {
                member_id: r.member_id.clone(),
                signup_date: r.signup_date,
                churn_label: r.churn_label.clone(),
                months_in_app: months_between(r.signup_date, self.reference_date),
            })
            .collect();

        tracing::debug!(
            members = labels.len(),
            reference_date = %self.reference_date,
            "extracted churn labels"
        );
        labels
    }
}
