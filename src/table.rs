//! Feature table encoding
//!
//! The merged feature table has a data-dependent schema: one `icd_code_<CODE>`
//! column per diagnosis code seen in the claims source. This module owns the
//! column layout and the CSV, JSON and plain-text renderings.

use crate::error::FeatureError;
use crate::types::{MemberFeatureRecord, WebVisitFeatures};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::Write;

/// Prefix of the per-code claim count columns
pub const ICD_COLUMN_PREFIX: &str = "icd_code_";

/// Default number of rows shown by [`FeatureTable::head`]
pub const DEFAULT_HEAD_ROWS: usize = 5;

/// The final per-member feature table
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureTable {
    /// Diagnosis codes discovered in the claims source, sorted
    pub claim_codes: Vec<String>,
    /// One row per churn-labelled member, in label source order
    pub rows: Vec<MemberFeatureRecord>,
}

impl FeatureTable {
    pub fn new(claim_codes: Vec<String>, rows: Vec<MemberFeatureRecord>) -> Self {
        Self { claim_codes, rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Row for a member, if the member is in the label source
    pub fn get(&self, member_id: &str) -> Option<&MemberFeatureRecord> {
        self.rows.iter().find(|r| r.member_id == member_id)
    }

    /// Column names in output order
    pub fn columns(&self) -> Vec<String> {
        let mut columns: Vec<String> = vec![
            "member_id".to_string(),
            "churn_label".to_string(),
            "months_in_app".to_string(),
        ];
        columns.extend(WebVisitFeatures::COLUMNS.iter().map(|c| c.to_string()));
        columns.push("app_usage".to_string());
        columns.extend(
            self.claim_codes
                .iter()
                .map(|code| format!("{ICD_COLUMN_PREFIX}{code}")),
        );
        columns.push("code_count".to_string());
        columns.push("priority_condition_count".to_string());
        columns
    }

    /// Cell values of one row in the order of [`Self::columns`]
    pub fn row_values(&self, row: &MemberFeatureRecord) -> Vec<String> {
        let mut values = vec![
            row.member_id.clone(),
            row.churn_label.clone(),
            row.months_in_app.to_string(),
        ];
        values.extend(row.web.values());
        values.push(row.app.app_usage.to_string());
        values.extend(
            self.claim_codes
                .iter()
                .map(|code| row.claims.count_for(code).to_string()),
        );
        values.push(row.claims.code_count.to_string());
        values.push(row.claims.priority_condition_count.to_string());
        values
    }

    /// A table with only the first `n` rows
    pub fn head(&self, n: usize) -> FeatureTable {
        FeatureTable {
            claim_codes: self.claim_codes.clone(),
            rows: self.rows.iter().take(n).cloned().collect(),
        }
    }

    /// Write the table as CSV with a header row
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<(), FeatureError> {
        let mut csv_writer = csv::Writer::from_writer(writer);
        csv_writer.write_record(self.columns())?;
        for row in &self.rows {
            csv_writer.write_record(self.row_values(row))?;
        }
        csv_writer.flush().map_err(csv::Error::from)?;
        Ok(())
    }

    /// Rows as a JSON array of flat objects keyed by column name
    pub fn to_json_value(&self) -> serde_json::Value {
        let columns = self.columns();
        let rows = self
            .rows
            .iter()
            .map(|row| {
                let object = columns
                    .iter()
                    .zip(self.row_json_values(row))
                    .map(|(c, v)| (c.clone(), v))
                    .collect::<serde_json::Map<_, _>>();
                serde_json::Value::Object(object)
            })
            .collect();
        serde_json::Value::Array(rows)
    }

    /// Encode to a compact JSON string
    pub fn to_json(&self) -> Result<String, FeatureError> {
        Ok(serde_json::to_string(&self.to_json_value())?)
    }

    /// Encode to a pretty-printed JSON string
    pub fn to_json_pretty(&self) -> Result<String, FeatureError> {
        Ok(serde_json::to_string_pretty(&self.to_json_value())?)
    }

    fn row_json_values(&self, row: &MemberFeatureRecord) -> Vec<serde_json::Value> {
        let web = &row.web;
        let mut values = vec![
            row.member_id.clone().into(),
            label_json_value(&row.churn_label),
            row.months_in_app.into(),
            web.diet_visits.into(),
            web.physical_activity_visits.into(),
            web.sleep_visits.into(),
            web.resilience_visits.into(),
            web.clinical_visits.into(),
            web.total_health_visits.into(),
            web.total_visits.into(),
            web.diet_visits_ratio.into(),
            web.physical_activity_visits_ratio.into(),
            web.sleep_visits_ratio.into(),
            web.resilience_visits_ratio.into(),
            web.clinical_visits_ratio.into(),
            web.total_health_visits_ratio.into(),
            web.non_relevant_visits.into(),
            web.health_engagement_ratio.into(),
            web.category_diversity.into(),
            row.app.app_usage.into(),
        ];
        values.extend(
            self.claim_codes
                .iter()
                .map(|code| serde_json::Value::from(row.claims.count_for(code))),
        );
        values.push(row.claims.code_count.into());
        values.push(row.claims.priority_condition_count.into());
        values
    }
}

/// Plain-text grid, one line per row, columns right-aligned
impl fmt::Display for FeatureTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let columns = self.columns();
        let cells: Vec<Vec<String>> = self
            .rows
            .iter()
            .map(|row| {
                self.row_values(row)
                    .into_iter()
                    .zip(&columns)
                    .map(|(v, c)| if is_ratio_column(c) { short_ratio(&v) } else { v })
                    .collect()
            })
            .collect();

        let widths: Vec<usize> = columns
            .iter()
            .enumerate()
            .map(|(i, c)| {
                cells
                    .iter()
                    .map(|row| row[i].len())
                    .chain(std::iter::once(c.len()))
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        let header: Vec<String> = columns
            .iter()
            .zip(&widths)
            .map(|(c, &w)| format!("{c:>w$}"))
            .collect();
        writeln!(f, "{}", header.join("  "))?;

        for row in &cells {
            let line: Vec<String> = row
                .iter()
                .zip(&widths)
                .map(|(v, &w)| format!("{v:>w$}"))
                .collect();
            writeln!(f, "{}", line.join("  "))?;
        }

        writeln!(f)?;
        write!(f, "[{} rows x {} columns]", self.rows.len(), columns.len())
    }
}

fn is_ratio_column(column: &str) -> bool {
    column.ends_with("_ratio")
}

/// Ratios are shown with six decimals in the text grid
fn short_ratio(value: &str) -> String {
    match value.parse::<f64>() {
        Ok(v) => format!("{v:.6}"),
        Err(_) => value.to_string(),
    }
}

/// Integer labels are emitted as JSON numbers, anything else as a string
fn label_json_value(label: &str) -> serde_json::Value {
    match label.trim().parse::<i64>() {
        Ok(n) => n.into(),
        Err(_) => label.into(),
    }
}
