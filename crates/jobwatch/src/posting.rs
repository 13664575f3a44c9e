//! Job posting records and their application status.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, TimeZone, Utc};
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Where the user stands with a posting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApplicationStatus {
    #[default]
    NotApplied,
    Applied,
    Rejected,
    NotApplicable,
    InterviewScheduled,
    OfferReceived,
}

impl ApplicationStatus {
    pub const ALL: [ApplicationStatus; 6] = [
        ApplicationStatus::NotApplied,
        ApplicationStatus::Applied,
        ApplicationStatus::Rejected,
        ApplicationStatus::NotApplicable,
        ApplicationStatus::InterviewScheduled,
        ApplicationStatus::OfferReceived,
    ];

    /// Column value stored in the `application_status` column.
    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::NotApplied => "NOT_APPLIED",
            ApplicationStatus::Applied => "APPLIED",
            ApplicationStatus::Rejected => "REJECTED",
            ApplicationStatus::NotApplicable => "NOT_APPLICABLE",
            ApplicationStatus::InterviewScheduled => "INTERVIEW_SCHEDULED",
            ApplicationStatus::OfferReceived => "OFFER_RECEIVED",
        }
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApplicationStatus::NotApplied => write!(f, "Not applied"),
            ApplicationStatus::Applied => write!(f, "Applied"),
            ApplicationStatus::Rejected => write!(f, "Rejected"),
            ApplicationStatus::NotApplicable => write!(f, "Not applicable"),
            ApplicationStatus::InterviewScheduled => write!(f, "Interview scheduled"),
            ApplicationStatus::OfferReceived => write!(f, "Offer received"),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown application status '{0}'")]
pub struct ParseStatusError(pub String);

impl FromStr for ApplicationStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ApplicationStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| ParseStatusError(s.to_string()))
    }
}

impl ToSql for ApplicationStatus {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for ApplicationStatus {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|e| FromSqlError::Other(Box::new(e)))
    }
}

/// A persisted job posting captured from a notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobPosting {
    /// Row id, assigned by SQLite on insert.
    pub id: i64,
    /// Display name of the originating app, e.g. "WhatsApp".
    pub source: String,
    /// Notification title at capture time.
    pub title: String,
    /// Notification body at capture time.
    pub content: String,
    /// Capture time in epoch milliseconds.
    pub timestamp: i64,
    pub is_read: bool,
    pub application_status: ApplicationStatus,
    pub is_favorite: bool,
}

impl JobPosting {
    /// Capture time as a UTC datetime, if the stored millis are in range.
    pub fn captured_at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_millis_opt(self.timestamp).single()
    }
}

/// A posting that has not been inserted yet and therefore has no id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewJobPosting {
    pub source: String,
    pub title: String,
    pub content: String,
    pub timestamp: i64,
    pub is_read: bool,
    pub application_status: ApplicationStatus,
    pub is_favorite: bool,
}

impl NewJobPosting {
    /// Creates an unread, not-applied, non-favorite posting.
    pub fn new(source: &str, title: &str, content: &str, timestamp: i64) -> Self {
        Self {
            source: source.to_string(),
            title: title.to_string(),
            content: content.to_string(),
            timestamp,
            is_read: false,
            application_status: ApplicationStatus::default(),
            is_favorite: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trips_through_column_name() {
        for status in ApplicationStatus::ALL {
            assert_eq!(status.as_str().parse::<ApplicationStatus>(), Ok(status));
        }
    }

    #[test]
    fn test_unknown_status_is_rejected() {
        let err = "MAYBE".parse::<ApplicationStatus>().unwrap_err();
        assert_eq!(err, ParseStatusError("MAYBE".to_string()));
    }

    #[test]
    fn test_status_serializes_as_screaming_snake_case() {
        let json = serde_json::to_string(&ApplicationStatus::InterviewScheduled).unwrap();
        assert_eq!(json, "\"INTERVIEW_SCHEDULED\"");
    }

    #[test]
    fn test_new_posting_defaults() {
        let posting = NewJobPosting::new("WhatsApp", "Hiring", "Apply now", 42);
        assert!(!posting.is_read);
        assert!(!posting.is_favorite);
        assert_eq!(posting.application_status, ApplicationStatus::NotApplied);
        assert_eq!(posting.timestamp, 42);
    }

    #[test]
    fn test_posting_serializes_camel_case() {
        let posting = JobPosting {
            id: 1,
            source: "Telegram".to_string(),
            title: "t".to_string(),
            content: "c".to_string(),
            timestamp: 1_700_000_000_000,
            is_read: true,
            application_status: ApplicationStatus::Applied,
            is_favorite: false,
        };
        let value = serde_json::to_value(&posting).unwrap();
        assert_eq!(value["isRead"], true);
        assert_eq!(value["applicationStatus"], "APPLIED");
        assert_eq!(
            posting.captured_at().map(|dt| dt.timestamp_millis()),
            Some(1_700_000_000_000)
        );
    }
}
