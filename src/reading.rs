//! Read-status synchronization.
//!
//! `ReadingLog` performs the remote half of every user action against the
//! store and reports what changed as a [`ReadChange`]. Folding that change into
//! the session's [`ReadStatus`] is a separate step, [`apply_change`], which the
//! caller runs only after the write succeeded.
//!
//! `mark_read` and `save_notes` read the current document and then write it
//! back. Two concurrent calls for the same chapter can interleave, in which
//! case the later write wins and a timestamp may be lost.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::error::{AppError, Result};
use crate::models::{iso_timestamp, Chapter, ReadRecord, ReadStatus, ReadStatusEntry, SessionUser};
use crate::store::ReadStore;

/// Outcome of a successful remote write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadChange {
    /// The document now has this content.
    Recorded(ReadRecord),
    /// The document for this chapter id no longer exists.
    Removed(String),
}

/// Fold a remote change into the session cache, returning the new cache.
pub fn apply_change(status: &ReadStatus, change: &ReadChange) -> ReadStatus {
    let mut next = status.clone();
    match change {
        ReadChange::Recorded(record) => {
            next.insert(record.id.clone(), ReadStatusEntry::from(record));
        }
        ReadChange::Removed(id) => {
            next.remove(id);
        }
    }
    next
}

fn require_user(user: Option<&SessionUser>) -> Result<&SessionUser> {
    user.ok_or(AppError::NotSignedIn)
}

#[derive(Clone)]
pub struct ReadingLog {
    store: Arc<dyn ReadStore>,
}

impl ReadingLog {
    pub fn new(store: Arc<dyn ReadStore>) -> Self {
        Self { store }
    }

    /// Every record in the user's namespace. Fails as a whole if any document
    /// cannot be read.
    pub async fn load_all(&self, user: Option<&SessionUser>) -> Result<ReadStatus> {
        let user = require_user(user)?;
        let records = self.store.list(&user.uid).await?;

        let mut status = ReadStatus::with_capacity(records.len());
        for (key, record) in records {
            if record.id.is_empty() {
                tracing::warn!(uid = %user.uid, key = %key, "skipping record without chapter id");
                continue;
            }
            status.insert(
                record.id.clone(),
                ReadStatusEntry {
                    record_id: key,
                    ..ReadStatusEntry::from(&record)
                },
            );
        }

        tracing::debug!(uid = %user.uid, count = status.len(), "loaded read status");
        Ok(status)
    }

    /// The full document for one chapter, if it has been read.
    pub async fn record(&self, user: Option<&SessionUser>, chapter: &Chapter) -> Result<Option<ReadRecord>> {
        let user = require_user(user)?;
        Ok(self.store.get(&user.uid, &chapter.id).await?)
    }

    /// Record a reading event at `now`, creating the document on first read.
    pub async fn mark_read(
        &self,
        user: Option<&SessionUser>,
        chapter: &Chapter,
        now: DateTime<Utc>,
    ) -> Result<ReadChange> {
        let user = require_user(user)?;
        let now = iso_timestamp(now);

        let record = match self.store.get(&user.uid, &chapter.id).await? {
            Some(mut existing) => {
                existing.record_reading(&now);
                existing
            }
            None => ReadRecord::first_read(chapter, &now, String::new()),
        };
        self.store.put(&user.uid, &record).await?;

        tracing::info!(
            uid = %user.uid,
            chapter = %chapter.id,
            readings = record.all_timestamps.len(),
            "marked chapter read"
        );
        Ok(ReadChange::Recorded(record))
    }

    /// Store notes for a chapter. A chapter that was never read is marked read
    /// at `now` as part of saving.
    pub async fn save_notes(
        &self,
        user: Option<&SessionUser>,
        chapter: &Chapter,
        text: &str,
        now: DateTime<Utc>,
    ) -> Result<ReadChange> {
        let user = require_user(user)?;

        let record = match self.store.get(&user.uid, &chapter.id).await? {
            Some(mut existing) => {
                existing.notes = Some(text.to_string());
                existing
            }
            None => ReadRecord::first_read(chapter, &iso_timestamp(now), text.to_string()),
        };
        self.store.put(&user.uid, &record).await?;

        tracing::info!(uid = %user.uid, chapter = %chapter.id, "saved notes");
        Ok(ReadChange::Recorded(record))
    }

    /// Delete the chapter's document, history and notes included. Callers go
    /// through [`crate::confirm::UnreadConfirmation`] first.
    pub async fn mark_unread(&self, user: Option<&SessionUser>, chapter: &Chapter) -> Result<ReadChange> {
        let user = require_user(user)?;
        let removed = self.store.delete(&user.uid, &chapter.id).await?;

        tracing::info!(uid = %user.uid, chapter = %chapter.id, removed, "marked chapter unread");
        Ok(ReadChange::Removed(chapter.id.clone()))
    }
}
