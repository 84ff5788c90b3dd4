//! Data models for notesync.
//!
//! These mirror the records exchanged with the Notes Store. Identity is
//! assigned by the store; the client never fabricates a note id.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Store-assigned note identifier.
pub type NoteId = i64;

/// A persisted text note.
///
/// `updated_at` equals `created_at` until the first edit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    /// Unique identifier, assigned by the store
    pub id: NoteId,
    /// The note text (non-empty after trimming)
    pub text: String,
    /// When the note was created
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    /// When the note was last updated
    #[serde(with = "timestamp")]
    pub updated_at: DateTime<Utc>,
}

impl Note {
    /// Whether the note has been edited since creation
    pub fn is_edited(&self) -> bool {
        self.updated_at > self.created_at
    }
}

/// Request body for create and update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteText {
    pub text: String,
}

impl NoteText {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// Response body of a successful delete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteReceipt {
    pub deleted: bool,
    pub id: NoteId,
}

/// ISO-8601 timestamps.
///
/// Stores without a timezone column emit naive datetimes; those are read as UTC.
pub(crate) mod timestamp {
    use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::AutoSi, true))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| de::Error::custom(format!("invalid timestamp: {}", raw)))
    }

    pub fn parse(raw: &str) -> Option<DateTime<Utc>> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(dt.with_timezone(&Utc));
        }
        ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
            .map(|naive| naive.and_utc())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_note_from_store_json() {
        let json = r#"{
            "id": 7,
            "text": "buy milk",
            "created_at": "2024-05-01T10:00:00+00:00",
            "updated_at": "2024-05-01T10:00:00+00:00"
        }"#;
        let note: Note = serde_json::from_str(json).unwrap();

        assert_eq!(note.id, 7);
        assert_eq!(note.text, "buy milk");
        assert_eq!(note.created_at, note.updated_at);
        assert!(!note.is_edited());
    }

    #[test]
    fn test_naive_timestamp_is_utc() {
        let json = r#"{
            "id": 1,
            "text": "x",
            "created_at": "2024-05-01T10:00:00.250000",
            "updated_at": "2024-05-02 08:30:00"
        }"#;
        let note: Note = serde_json::from_str(json).unwrap();

        assert_eq!(
            note.updated_at,
            Utc.with_ymd_and_hms(2024, 5, 2, 8, 30, 0).unwrap()
        );
        assert!(note.is_edited());
    }

    #[test]
    fn test_invalid_timestamp_rejected() {
        let json = r#"{"id": 1, "text": "x", "created_at": "yesterday", "updated_at": "today"}"#;
        assert!(serde_json::from_str::<Note>(json).is_err());
    }

    #[test]
    fn test_delete_receipt() {
        let receipt: DeleteReceipt = serde_json::from_str(r#"{"deleted": true, "id": 3}"#).unwrap();
        assert_eq!(receipt, DeleteReceipt { deleted: true, id: 3 });
    }
}
