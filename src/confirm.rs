//! Two-phase confirmation for marking a chapter unread.
//!
//! Marking unread destroys the reading history and notes, so it is only
//! executed after an explicit request followed by a matching confirm.

use crate::error::ConfirmationError;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum UnreadConfirmation {
    #[default]
    Idle,
    PendingConfirmation {
        chapter_id: String,
    },
    Executing {
        chapter_id: String,
    },
}

impl UnreadConfirmation {
    /// Ask to mark `chapter_id` unread. Replaces any earlier pending request.
    pub fn request(&mut self, chapter_id: &str) -> Result<(), ConfirmationError> {
        if let UnreadConfirmation::Executing { .. } = self {
            return Err(ConfirmationError::Busy);
        }
        *self = UnreadConfirmation::PendingConfirmation {
            chapter_id: chapter_id.to_string(),
        };
        Ok(())
    }

    pub fn cancel(&mut self) {
        if let UnreadConfirmation::PendingConfirmation { .. } = self {
            *self = UnreadConfirmation::Idle;
        }
    }

    /// Move a matching pending request to `Executing`.
    pub fn confirm(&mut self, chapter_id: &str) -> Result<(), ConfirmationError> {
        match self {
            UnreadConfirmation::PendingConfirmation { chapter_id: pending } if pending == chapter_id => {
                *self = UnreadConfirmation::Executing {
                    chapter_id: chapter_id.to_string(),
                };
                Ok(())
            }
            UnreadConfirmation::Executing { .. } => Err(ConfirmationError::Busy),
            _ => Err(ConfirmationError::NotPending(chapter_id.to_string())),
        }
    }

    /// Return to `Idle` once the delete has completed or failed.
    pub fn finish(&mut self) {
        *self = UnreadConfirmation::Idle;
    }

    pub fn is_pending_for(&self, chapter_id: &str) -> bool {
        matches!(self, UnreadConfirmation::PendingConfirmation { chapter_id: pending } if pending == chapter_id)
    }
}
