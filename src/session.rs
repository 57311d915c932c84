//! Per-request session context.
//!
//! A request starts in [`AuthState::Unknown`] and resolves exactly once from
//! its cookie. [`ReadingSession`] owns the read-status cache for that
//! context: it loads the user's records when the session becomes
//! authenticated and drops them when it does not.

use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::models::{Chapter, ReadStatus, SessionUser};
use crate::reading::{apply_change, ReadingLog};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AuthState {
    #[default]
    Unknown,
    Authenticated(SessionUser),
    Unauthenticated,
}

impl AuthState {
    pub fn from_user(user: Option<SessionUser>) -> Self {
        match user {
            Some(user) => AuthState::Authenticated(user),
            None => AuthState::Unauthenticated,
        }
    }

    pub fn user(&self) -> Option<&SessionUser> {
        match self {
            AuthState::Authenticated(user) => Some(user),
            _ => None,
        }
    }
}

/// What the caller must do after an auth change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthEffect {
    Loaded,
    RedirectToLogin,
}

pub struct ReadingSession {
    log: ReadingLog,
    auth: AuthState,
    status: ReadStatus,
    load_failed: bool,
}

impl ReadingSession {
    pub fn new(log: ReadingLog) -> Self {
        Self {
            log,
            auth: AuthState::Unknown,
            status: ReadStatus::new(),
            load_failed: false,
        }
    }

    /// Resolve the session and run its effect. A failed load is logged and
    /// leaves the cache as it was.
    pub async fn on_auth_changed(&mut self, state: AuthState) -> AuthEffect {
        self.auth = state;
        match &self.auth {
            AuthState::Authenticated(user) => {
                match self.log.load_all(Some(user)).await {
                    Ok(status) => {
                        self.status = status;
                        self.load_failed = false;
                    }
                    Err(e) => {
                        tracing::error!(uid = %user.uid, error = %e, "failed to load read status");
                        self.load_failed = true;
                    }
                }
                AuthEffect::Loaded
            }
            AuthState::Unauthenticated | AuthState::Unknown => {
                self.status.clear();
                self.load_failed = false;
                AuthEffect::RedirectToLogin
            }
        }
    }

    pub fn auth(&self) -> &AuthState {
        &self.auth
    }

    pub fn user(&self) -> Option<&SessionUser> {
        self.auth.user()
    }

    pub fn status(&self) -> &ReadStatus {
        &self.status
    }

    pub fn load_failed(&self) -> bool {
        self.load_failed
    }

    pub async fn mark_read(&mut self, chapter: &Chapter, now: DateTime<Utc>) -> Result<()> {
        let change = self.log.mark_read(self.auth.user(), chapter, now).await?;
        self.status = apply_change(&self.status, &change);
        Ok(())
    }

    pub async fn save_notes(&mut self, chapter: &Chapter, text: &str, now: DateTime<Utc>) -> Result<()> {
        let change = self.log.save_notes(self.auth.user(), chapter, text, now).await?;
        self.status = apply_change(&self.status, &change);
        Ok(())
    }

    pub async fn mark_unread(&mut self, chapter: &Chapter) -> Result<()> {
        let change = self.log.mark_unread(self.auth.user(), chapter).await?;
        self.status = apply_change(&self.status, &change);
        Ok(())
    }
}
