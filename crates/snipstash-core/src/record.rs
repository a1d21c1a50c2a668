//! The saved snippet record and its document mapping.

use crate::error::ValidationError;
use chrono::{DateTime, SecondsFormat, Utc};
use snipstash_storage::{Document, FieldValue, StoredDocument};

/// Default collection name, shared with documents written by the web client.
pub const DEFAULT_COLLECTION: &str = "savedCodes";

/// Stored field names.
pub mod fields {
    pub const DATE: &str = "date";
    pub const CODE: &str = "code";
    /// Server-assigned creation time; the list is ordered by it.
    pub const TIMESTAMP: &str = "timestamp";
    /// Client-side ISO-8601 creation time, used when `timestamp` is absent.
    pub const CREATED: &str = "created";
}

/// A saved snippet as read back from the store.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub id: String,
    pub date: Option<String>,
    pub code: String,
    pub timestamp: Option<DateTime<Utc>>,
    pub created: Option<String>,
}

impl Record {
    /// Decode a stored document. Missing or mistyped fields are tolerated.
    pub fn from_stored(stored: StoredDocument) -> Self {
        let doc = &stored.document;
        Self {
            date: doc.get_str(fields::DATE).map(str::to_string),
            code: doc.get_str(fields::CODE).unwrap_or_default().to_string(),
            timestamp: doc.get_timestamp(fields::TIMESTAMP),
            created: doc.get_str(fields::CREATED).map(str::to_string),
            id: stored.id,
        }
    }
}

/// The two form inputs, read at submit time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SnippetInput {
    pub date: String,
    pub code: String,
}

impl SnippetInput {
    pub fn new(date: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            date: date.into(),
            code: code.into(),
        }
    }

    /// Check required fields in order: date first, then trimmed code.
    ///
    /// Returns the date and the trimmed code.
    pub fn validate(&self) -> Result<(&str, &str), ValidationError> {
        if self.date.is_empty() {
            return Err(ValidationError::MissingDate);
        }
        let code = self.code.trim();
        if code.is_empty() {
            return Err(ValidationError::MissingCode);
        }
        Ok((&self.date, code))
    }
}

/// Build the document for a new record.
///
/// The authoritative `timestamp` is left to the store; `created` records the
/// client clock as a fallback.
pub fn new_document(date: &str, code: &str, now: DateTime<Utc>) -> Document {
    Document::new()
        .with(fields::DATE, date)
        .with(fields::CODE, code)
        .with(fields::TIMESTAMP, FieldValue::ServerTimestamp)
        .with(fields::CREATED, iso_timestamp(now))
}

/// `2024-01-01T12:00:00.000Z`
pub fn iso_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Today's date as `YYYY-MM-DD` (UTC), the form's default.
pub fn default_date() -> String {
    Utc::now().date_naive().format("%Y-%m-%d").to_string()
}
