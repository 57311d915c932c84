//! Data models for the reading tracker.
//!
//! Chapters come from the static catalog. Read records are the per-user
//! documents persisted in the store, and the read-status map is the
//! in-memory view of those records for one session.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ============================================================================
// Catalog Types
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chapter {
    pub id: String,
    pub section: String,
    pub chapter: String,
}

impl Chapter {
    /// Display label, e.g. "Éxodo 2".
    pub fn label(&self) -> String {
        format!("{} {}", self.section, self.chapter)
    }
}

// ============================================================================
// Persisted Records
// ============================================================================

/// One document per (user, chapter) once the chapter has been read.
///
/// `latest_read_timestamp` always equals `all_timestamps[0]`; the history is
/// kept newest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadRecord {
    pub id: String,
    pub section: String,
    pub chapter: String,
    pub latest_read_timestamp: String,
    #[serde(default)]
    pub all_timestamps: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl ReadRecord {
    /// A record for a chapter read for the first time at `now`.
    pub fn first_read(chapter: &Chapter, now: &str, notes: String) -> Self {
        Self {
            id: chapter.id.clone(),
            section: chapter.section.clone(),
            chapter: chapter.chapter.clone(),
            latest_read_timestamp: now.to_string(),
            all_timestamps: vec![now.to_string()],
            notes: Some(notes),
        }
    }

    /// Prepend a reading event.
    pub fn record_reading(&mut self, now: &str) {
        self.all_timestamps.insert(0, now.to_string());
        self.latest_read_timestamp = now.to_string();
    }

    pub fn notes_text(&self) -> &str {
        self.notes.as_deref().unwrap_or("")
    }
}

// ============================================================================
// Session Cache
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadStatusEntry {
    pub latest_read_timestamp: String,
    /// Key of the backing document in the user's namespace.
    pub record_id: String,
    #[serde(default)]
    pub notes: String,
}

impl From<&ReadRecord> for ReadStatusEntry {
    fn from(record: &ReadRecord) -> Self {
        Self {
            latest_read_timestamp: record.latest_read_timestamp.clone(),
            record_id: record.id.clone(),
            notes: record.notes_text().to_string(),
        }
    }
}

/// Chapter id -> status, for the signed-in user only.
pub type ReadStatus = HashMap<String, ReadStatusEntry>;

// ============================================================================
// Users
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAccount {
    pub uid: String,
    pub email: String,
    pub password_hash: String,
    pub created: DateTime<Utc>,
}

/// The authenticated caller, as recovered from a verified session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    pub uid: String,
    pub email: String,
    /// Per-login nonce; identifies the browser session.
    pub session_id: String,
}

// ============================================================================
// Timestamps
// ============================================================================

/// ISO-8601 in UTC with millisecond precision, e.g. `2025-03-04T09:15:00.000Z`.
pub fn iso_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Short display form used by the list and the detail view.
pub fn format_timestamp(iso: &str) -> String {
    if iso.is_empty() {
        return String::new();
    }
    match DateTime::parse_from_rfc3339(iso) {
        Ok(dt) => dt.with_timezone(&Utc).format("%b %d %y %H:%M").to_string(),
        Err(e) => {
            tracing::warn!(timestamp = iso, error = %e, "unparseable timestamp");
            "Invalid date".to_string()
        }
    }
}
