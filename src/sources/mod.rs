//! Source readers
//!
//! This module reads the four tabular CSV sources and maps each row to a typed
//! record. Every source declares the columns it requires; a missing column or
//! an unparseable value aborts the read.

mod records;

pub use records::{parse_signup_date, parse_timestamp};

use crate::error::FeatureError;
use csv::{ReaderBuilder, StringRecord};
use serde::de::DeserializeOwned;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// A record type that can be read from a CSV source
pub trait SourceRecord: Sized {
    /// Row shape as deserialized by header name
    type Raw: DeserializeOwned;

    /// Source name used in diagnostics
    const SOURCE: &'static str;

    /// Columns that must be present in the header row
    const REQUIRED_COLUMNS: &'static [&'static str];

    /// Convert a raw row into a typed record. `row` is 1-based, excluding the header.
    fn from_raw(raw: Self::Raw, row: usize) -> Result<Self, FeatureError>;
}

/// Read all records of a source from any reader
pub fn read_records<R, T>(reader: R) -> Result<Vec<T>, FeatureError>
where
    R: Read,
    T: SourceRecord,
{
    let mut csv_reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::Headers)
        .from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    check_required_columns::<T>(&headers)?;

    let mut records = Vec::new();
    for (index, result) in csv_reader.deserialize::<T::Raw>().enumerate() {
        let raw = result?;
        records.push(T::from_raw(raw, index + 1)?);
    }

    tracing::debug!(source = T::SOURCE, records = records.len(), "read source");
    Ok(records)
}

/// Read all records of a source from a file
pub fn load_records<T: SourceRecord>(path: &Path) -> Result<Vec<T>, FeatureError> {
    let file = File::open(path).map_err(|source| FeatureError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!(source = T::SOURCE, path = %path.display(), "opened source");
    read_records(file)
}

fn check_required_columns<T: SourceRecord>(headers: &StringRecord) -> Result<(), FeatureError> {
    for column in T::REQUIRED_COLUMNS {
        if !headers.iter().any(|h| h == *column) {
            return Err(FeatureError::MissingColumn {
                source_name: T::SOURCE,
                column: *column,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AppUsageRecord, ChurnLabelRecord, ClaimRecord, WebVisitRecord};
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_read_web_visits() {
        let csv = "member_id,title,url\nM1,Mediterranean diet,https://x\nM2,Sleep hygiene,https://y\n";
        let records: Vec<WebVisitRecord> = read_records(csv.as_bytes()).unwrap();

        assert_eq!(
            records,
            vec![
                WebVisitRecord {
                    member_id: "M1".to_string(),
                    title: "Mediterranean diet".to_string(),
                },
                WebVisitRecord {
                    member_id: "M2".to_string(),
                    title: "Sleep hygiene".to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_column_order_irrelevant() {
        let csv = "icd_code,member_id\nI10,M2\n";
        let records: Vec<ClaimRecord> = read_records(csv.as_bytes()).unwrap();

        assert_eq!(records[0].member_id, "M2");
        assert_eq!(records[0].icd_code, "I10");
    }

    #[test]
    fn test_missing_column() {
        let csv = "member_id,timestamp\nM1,2025-01-01 10:00:00\n";
        let result: Result<Vec<AppUsageRecord>, _> = read_records(csv.as_bytes());

        match result {
            Err(FeatureError::MissingColumn {
                source_name,
                column,
            }) => {
                assert_eq!(source_name, "app_usage");
                assert_eq!(column, "event_type");
            }
            other => panic!("expected missing column, got {:?}", other),
        }
    }

    #[test]
    fn test_bad_timestamp_is_fatal() {
        let csv = "member_id,event_type,timestamp\nM1,session,2025-01-01 10:00:00\nM1,session,yesterday\n";
        let result: Result<Vec<AppUsageRecord>, _> = read_records(csv.as_bytes());

        match result {
            Err(FeatureError::TimestampParse { row, value }) => {
                assert_eq!(row, 2);
                assert_eq!(value, "yesterday");
            }
            other => panic!("expected timestamp error, got {:?}", other),
        }
    }

    #[test]
    fn test_read_churn_labels() {
        let csv = "member_id,signup_date,churn_label\nM1,2024-05-01,1\n";
        let records: Vec<ChurnLabelRecord> = read_records(csv.as_bytes()).unwrap();

        assert_eq!(
            records[0].signup_date,
            NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()
        );
        assert_eq!(records[0].churn_label, "1");
    }

    #[test]
    fn test_bad_signup_date_is_fatal() {
        let csv = "member_id,signup_date,churn_label\nM1,garbage,1\nM2,2024-05-01,0\n";
        let result: Result<Vec<ChurnLabelRecord>, _> = read_records(csv.as_bytes());

        match result {
            Err(FeatureError::DateParse { row, value }) => {
                assert_eq!(row, 1);
                assert_eq!(value, "garbage");
            }
            other => panic!("expected date error, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_member_id_rejected() {
        let csv = "member_id,icd_code\n,I10\n";
        let result: Result<Vec<ClaimRecord>, _> = read_records(csv.as_bytes());

        assert!(matches!(
            result,
            Err(FeatureError::MissingValue { row: 1, column: "member_id", .. })
        ));
    }

    #[test]
    fn test_missing_file() {
        let result: Result<Vec<ClaimRecord>, _> =
            load_records(Path::new("does/not/exist/claims.csv"));

        match result {
            Err(FeatureError::Io { source, .. }) => {
                assert_eq!(source.kind(), std::io::ErrorKind::NotFound);
            }
            other => panic!("expected io error, got {:?}", other),
        }
    }

    #[test]
    fn test_header_only_source_is_empty() {
        let csv = "member_id,title\n";
        let records: Vec<WebVisitRecord> = read_records(csv.as_bytes()).unwrap();

        assert!(records.is_empty());
    }
}
