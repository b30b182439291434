use crate::error::{Error, Result};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The validated input of one evaluation: the report's inspection date and
/// the instant it is evaluated at.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WarrantyBasis {
    pub start_date: DateTime<Utc>,
    pub now: DateTime<Utc>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    Pending,
    InProgress,
    Completed,
    Cancelled,
}

impl FromStr for ReportStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_ascii_lowercase().replace([' ', '-'], "_");
        match normalized.as_str() {
            "pending" => Ok(ReportStatus::Pending),
            "in_progress" => Ok(ReportStatus::InProgress),
            "completed" => Ok(ReportStatus::Completed),
            "cancelled" | "canceled" => Ok(ReportStatus::Cancelled),
            _ => Err(Error::InvalidReport(format!("unknown status '{}'", s))),
        }
    }
}

impl fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ReportStatus::Pending => "pending",
            ReportStatus::InProgress => "in_progress",
            ReportStatus::Completed => "completed",
            ReportStatus::Cancelled => "cancelled",
        })
    }
}

/// A report as the report store hands it over. Every field is optional and
/// stringly typed; [`WarrantyBasis::from_report`] is the only way in.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReportRecord {
    #[serde(default, alias = "inspection_date")]
    pub inspection_date: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

impl ReportRecord {
    pub fn from_json(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }
}

/// Parses an RFC 3339 instant, or a bare `YYYY-MM-DD` date as UTC midnight.
pub fn parse_instant(value: &str) -> Result<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(instant) = DateTime::parse_from_rfc3339(value) {
        return Ok(instant.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|midnight| midnight.and_utc())
        .ok_or_else(|| {
            Error::InvalidDate(format!(
                "'{}' is neither RFC 3339 nor YYYY-MM-DD",
                value
            ))
        })
}

impl WarrantyBasis {
    pub fn new(start_date: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        Self { start_date, now }
    }

    pub fn from_report(report: &ReportRecord, now: DateTime<Utc>) -> Result<Self> {
        let raw_date = report
            .inspection_date
            .as_deref()
            .filter(|d| !d.trim().is_empty())
            .ok_or_else(|| Error::InvalidReport("missing inspection date".to_string()))?;
        let start_date = parse_instant(raw_date)?;

        let status: ReportStatus = report
            .status
            .as_deref()
            .ok_or_else(|| Error::InvalidReport("missing status".to_string()))?
            .parse()?;
        if status != ReportStatus::Completed {
            return Err(Error::ReportNotCompleted(status.to_string()));
        }

        Ok(Self::new(start_date, now))
    }
}
