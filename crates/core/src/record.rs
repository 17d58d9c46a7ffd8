//! Medical record entries.
//!
//! A patient's history is an ordered list of [`MedicalRecordEntry`] snapshots. Entries are never
//! edited in place: a correction replaces the entry at an index with a newly built one.

use crate::constants::RECORD_TIMESTAMP_FORMAT;
use crate::{MediLinkError, MediLinkResult};
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// One snapshot of condition, medications and allergies at a point in time.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MedicalRecordEntry {
    pub condition: String,
    #[serde(default)]
    pub medications: Vec<String>,
    #[serde(default)]
    pub allergies: Vec<String>,
    pub recorded_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl MedicalRecordEntry {
    /// Builds an entry stamped with the current time.
    pub fn now(condition: impl Into<String>, medications: Vec<String>, allergies: Vec<String>) -> Self {
        Self {
            condition: condition.into(),
            medications,
            allergies,
            recorded_at: Utc::now(),
            url: None,
        }
    }

    /// Builds an entry from raw prompt answers.
    ///
    /// `medications` and `allergies` are comma-separated lists, `timestamp` is optional
    /// (blank means now) and `url` is optional.
    pub fn from_input(
        condition: &str,
        medications: &str,
        allergies: &str,
        timestamp: &str,
        url: &str,
    ) -> MediLinkResult<Self> {
        let url = url.trim();
        Ok(Self {
            condition: condition.trim().to_string(),
            medications: parse_list(medications),
            allergies: parse_list(allergies),
            recorded_at: parse_timestamp(timestamp)?,
            url: (!url.is_empty()).then(|| url.to_string()),
        })
    }

    /// The timestamp rendered the way it is entered and exported.
    pub fn formatted_timestamp(&self) -> String {
        self.recorded_at.format(RECORD_TIMESTAMP_FORMAT).to_string()
    }
}

/// Splits a comma-separated answer into trimmed, non-empty items.
pub fn parse_list(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

/// Parses a `YYYY-MM-DD HH:MM:SS` timestamp, treating blank input as now.
///
/// Entered timestamps carry no zone and are taken as UTC.
pub fn parse_timestamp(input: &str) -> MediLinkResult<DateTime<Utc>> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(Utc::now());
    }

    NaiveDateTime::parse_from_str(trimmed, RECORD_TIMESTAMP_FORMAT)
        .map(|naive| naive.and_utc())
        .map_err(|_| MediLinkError::InvalidTimestamp(trimmed.to_string()))
}
