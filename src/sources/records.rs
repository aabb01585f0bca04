//! Row mappings for each source

use super::SourceRecord;
use crate::error::FeatureError;
use crate::types::{AppUsageRecord, ChurnLabelRecord, ClaimRecord, MemberId, WebVisitRecord};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::Deserialize;

const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Deserialize)]
pub struct RawWebVisit {
    member_id: String,
    title: String,
}

#[derive(Deserialize)]
pub struct RawAppUsage {
    member_id: String,
    event_type: String,
    timestamp: String,
}

#[derive(Deserialize)]
pub struct RawClaim {
    member_id: String,
    icd_code: String,
}

#[derive(Deserialize)]
pub struct RawChurnLabel {
    member_id: String,
    signup_date: String,
    churn_label: String,
}

impl SourceRecord for WebVisitRecord {
    type Raw = RawWebVisit;
    const SOURCE: &'static str = "web_visits";
    const REQUIRED_COLUMNS: &'static [&'static str] = &["member_id", "title"];

    fn from_raw(raw: RawWebVisit, row: usize) -> Result<Self, FeatureError> {
        Ok(Self {
            member_id: require_member_id(raw.member_id, Self::SOURCE, row)?,
            title: raw.title,
        })
    }
}

impl SourceRecord for AppUsageRecord {
    type Raw = RawAppUsage;
    const SOURCE: &'static str = "app_usage";
    const REQUIRED_COLUMNS: &'static [&'static str] = &["member_id", "event_type", "timestamp"];

    fn from_raw(raw: RawAppUsage, row: usize) -> Result<Self, FeatureError> {
        let timestamp = parse_timestamp(&raw.timestamp).ok_or_else(|| {
            FeatureError::TimestampParse {
                row,
                value: raw.timestamp.clone(),
            }
        })?;

        Ok(Self {
            member_id: require_member_id(raw.member_id, Self::SOURCE, row)?,
            event_type: raw.event_type,
            timestamp,
        })
    }
}

impl SourceRecord for ClaimRecord {
    type Raw = RawClaim;
    const SOURCE: &'static str = "claims";
    const REQUIRED_COLUMNS: &'static [&'static str] = &["member_id", "icd_code"];

    fn from_raw(raw: RawClaim, row: usize) -> Result<Self, FeatureError> {
        Ok(Self {
            member_id: require_member_id(raw.member_id, Self::SOURCE, row)?,
            icd_code: raw.icd_code,
        })
    }
}

impl SourceRecord for ChurnLabelRecord {
    type Raw = RawChurnLabel;
    const SOURCE: &'static str = "churn_labels";
    const REQUIRED_COLUMNS: &'static [&'static str] = &["member_id", "signup_date", "churn_label"];

    fn from_raw(raw: RawChurnLabel, row: usize) -> Result<Self, FeatureError> {
        let signup_date =
            parse_signup_date(&raw.signup_date).ok_or_else(|| FeatureError::DateParse {
                row,
                value: raw.signup_date.clone(),
            })?;

        Ok(Self {
            member_id: require_member_id(raw.member_id, Self::SOURCE, row)?,
            signup_date,
            churn_label: raw.churn_label,
        })
    }
}

fn require_member_id(
    value: String,
    source_name: &'static str,
    row: usize,
) -> Result<MemberId, FeatureError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(FeatureError::MissingValue {
            source_name,
            row,
            column: "member_id",
        });
    }
    Ok(trimmed.to_string())
}

/// Parse an event timestamp.
///
/// Accepts RFC 3339 (offset dropped after conversion to UTC), naive
/// `YYYY-MM-DD[ T]HH:MM[:SS[.f]]`, or a bare date at midnight.
pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.naive_utc());
    }

    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, format) {
            return Some(dt);
        }
    }

    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Parse a signup date; timestamp forms are accepted and truncated to the date
pub fn parse_signup_date(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    NaiveDate::parse_from_str(trimmed, DATE_FORMAT)
        .ok()
        .or_else(|| parse_timestamp(trimmed).map(|dt| dt.date()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, mo, d)
            .unwrap()
            .and_hms_opt(h, mi, s)
            .unwrap()
    }

    #[test]
    fn test_parse_timestamp_formats() {
        let expected = ts(2025, 3, 14, 9, 26, 53);

        assert_eq!(parse_timestamp("2025-03-14 09:26:53"), Some(expected));
        assert_eq!(parse_timestamp("2025-03-14T09:26:53"), Some(expected));
        assert_eq!(parse_timestamp("2025-03-14T09:26:53Z"), Some(expected));
        assert_eq!(parse_timestamp("2025-03-14T11:26:53+02:00"), Some(expected));
        assert_eq!(
            parse_timestamp("2025-03-14"),
            Some(ts(2025, 3, 14, 0, 0, 0))
        );
    }

    #[test]
    fn test_parse_timestamp_fractional_seconds() {
        let parsed = parse_timestamp("2025-03-14 09:26:53.250").unwrap();
        assert_eq!(parsed.date(), NaiveDate::from_ymd_opt(2025, 3, 14).unwrap());
    }

    #[test]
    fn test_parse_timestamp_rejects_garbage() {
        assert_eq!(parse_timestamp("not a time"), None);
        assert_eq!(parse_timestamp(""), None);
        assert_eq!(parse_timestamp("2025-13-01"), None);
    }

    #[test]
    fn test_parse_signup_date() {
        let expected = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();

        assert_eq!(parse_signup_date("2024-05-01"), Some(expected));
        assert_eq!(parse_signup_date("2024-05-01 13:45:00"), Some(expected));
        assert_eq!(parse_signup_date("05/01/2024"), None);
    }
}
