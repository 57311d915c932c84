//! BibleCloud library - re-exports for testing and external use.
//!
//! A personal Bible-reading tracker: a chapter catalog, per-user reading
//! history with notes, and the web front end over both.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::Context as _;
use axum::{
    routing::{get, post},
    Router,
};
use chrono::{DateTime, Utc};
use tower_http::{services::ServeFile, trace::TraceLayer};

pub mod auth;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod confirm;
pub mod error;
pub mod handlers;
pub mod logging;
pub mod models;
pub mod normalize;
pub mod reading;
pub mod search;
pub mod session;
pub mod store;
pub mod templates;

use catalog::Catalog;
use config::Config;
use confirm::UnreadConfirmation;
use error::AppError;
use models::{Chapter, SessionUser, UserAccount};
use reading::ReadingLog;
use session::ReadingSession;
use store::SledReadStore;

// ============================================================================
// Rate Limiting
// ============================================================================

/// Tracks login failures for rate limiting with exponential backoff.
pub struct LoginRateLimit {
    pub failures: u32,
    pub locked_until: Option<DateTime<Utc>>,
}

impl LoginRateLimit {
    pub fn new() -> Self {
        Self {
            failures: 0,
            locked_until: None,
        }
    }

    /// Check if login attempts are currently locked out.
    pub fn is_locked(&self) -> bool {
        self.locked_until.is_some_and(|until| Utc::now() < until)
    }

    /// Record a failed login attempt. After 5 failures, apply exponential backoff capped at 64s.
    pub fn record_failure(&mut self) {
        self.failures += 1;
        if self.failures >= 5 {
            let delay_secs = std::cmp::min(1i64 << (self.failures - 5).min(6), 64);
            self.locked_until = Some(Utc::now() + chrono::Duration::seconds(delay_secs));
        }
    }

    /// Reset on successful login.
    pub fn reset(&mut self) {
        self.failures = 0;
        self.locked_until = None;
    }
}

impl Default for LoginRateLimit {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Application State
// ============================================================================

pub struct AppState {
    pub db: sled::Db,
    pub catalog: Catalog,
    pub catalog_path: PathBuf,
    pub reading: ReadingLog,
    pub secret: Vec<u8>,
    pub login_rate_limit: Mutex<LoginRateLimit>,
    /// Mark-unread confirmations, keyed by session id.
    pub confirmations: Mutex<HashMap<String, ConfirmationSlot>>,
}

/// A session's confirmation state and when that session last touched it.
#[derive(Debug, Clone)]
pub struct ConfirmationSlot {
    pub state: UnreadConfirmation,
    pub touched: DateTime<Utc>,
}

impl AppState {
    pub fn open(config: &Config) -> anyhow::Result<Self> {
        let db = sled::open(&config.db_path)
            .with_context(|| format!("open database: {}", config.db_path.display()))?;
        let catalog = Catalog::load(&config.catalog_path)
            .with_context(|| format!("load catalog: {}", config.catalog_path.display()))?;

        let secret = match &config.secret {
            Some(secret) => secret.clone(),
            None => {
                tracing::warn!("BIBLECLOUD_SECRET not set; sessions will not survive a restart");
                auth::generate_secret()
            }
        };

        Ok(Self::with_parts(db, catalog, config.catalog_path.clone(), secret))
    }

    pub fn with_parts(db: sled::Db, catalog: Catalog, catalog_path: PathBuf, secret: Vec<u8>) -> Self {
        let reading = ReadingLog::new(Arc::new(SledReadStore::new(db.clone())));
        Self {
            db,
            catalog,
            catalog_path,
            reading,
            secret,
            login_rate_limit: Mutex::new(LoginRateLimit::new()),
            confirmations: Mutex::new(HashMap::new()),
        }
    }

    pub fn chapter(&self, id: &str) -> Result<&Chapter, AppError> {
        self.catalog
            .get(id)
            .ok_or_else(|| AppError::UnknownChapter(id.to_string()))
    }

    pub fn reading_session(&self) -> ReadingSession {
        ReadingSession::new(self.reading.clone())
    }

    /// Run `f` against the session's confirmation state, creating it if absent.
    /// Slots untouched for longer than a session can live are dropped first.
    pub fn with_confirmation<R>(&self, session: &SessionUser, f: impl FnOnce(&mut UnreadConfirmation) -> R) -> R {
        let now = Utc::now();
        let mut confirmations = self
            .confirmations
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        prune_expired(&mut confirmations, now);

        let slot = confirmations
            .entry(session.session_id.clone())
            .or_insert_with(|| ConfirmationSlot {
                state: UnreadConfirmation::Idle,
                touched: now,
            });
        slot.touched = now;
        let result = f(&mut slot.state);
        if slot.state == UnreadConfirmation::Idle {
            confirmations.remove(&session.session_id);
        }
        result
    }

    pub fn clear_confirmation(&self, session: &SessionUser) {
        self.confirmations
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .remove(&session.session_id);
    }
}

/// Create an account in the database named by `config` and flush it to disk.
pub fn add_user(config: &Config, email: &str, password: &str) -> anyhow::Result<UserAccount> {
    let db = sled::open(&config.db_path)
        .with_context(|| format!("open database: {}", config.db_path.display()))?;

    let account = auth::create_user(&db, email, password)?;
    db.flush().context("flush database")?;
    Ok(account)
}

fn prune_expired(confirmations: &mut HashMap<String, ConfirmationSlot>, now: DateTime<Utc>) {
    let cutoff = now - chrono::Duration::hours(auth::SESSION_TTL_HOURS);
    confirmations.retain(|session_id, slot| {
        let live = slot.touched > cutoff;
        if !live {
            tracing::debug!(session_id = %session_id, "dropping confirmation for expired session");
        }
        live
    });
}

// ============================================================================
// Routes
// ============================================================================

pub fn router(state: Arc<AppState>) -> Router {
    let catalog_file = ServeFile::new(&state.catalog_path);

    Router::new()
        // Pages
        .route("/", get(handlers::index))
        .route("/menu", get(handlers::menu))
        .route("/login", get(handlers::login_page).post(handlers::login_submit))
        .route("/logout", get(handlers::logout))
        // Chapter actions
        .route("/chapter/{id}", get(handlers::chapter_detail))
        .route("/chapter/{id}/read", post(handlers::mark_read))
        .route("/chapter/{id}/notes", post(handlers::save_notes))
        .route("/chapter/{id}/unread", post(handlers::request_unread))
        .route("/chapter/{id}/unread/confirm", post(handlers::confirm_unread))
        .route("/chapter/{id}/unread/cancel", post(handlers::cancel_unread))
        // JSON API
        .route("/api/chapters", get(handlers::api_chapters))
        .route("/api/read-status", get(handlers::api_read_status))
        .route("/api/chapter/{id}/read", post(handlers::api_mark_read))
        .route("/api/chapter/{id}/notes", post(handlers::api_save_notes))
        .route("/api/chapter/{id}/unread", post(handlers::api_mark_unread))
        // Static catalog
        .route_service("/bible_chapters.json", catalog_file)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub use models::{ReadRecord, ReadStatus, ReadStatusEntry};
pub use normalize::normalize;
pub use reading::{apply_change, ReadChange};
pub use search::filter_chapters;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limit_locks_after_five_failures() {
        let mut limit = LoginRateLimit::new();
        for _ in 0..4 {
            limit.record_failure();
        }
        assert!(!limit.is_locked());

        limit.record_failure();
        assert!(limit.is_locked());

        limit.reset();
        assert!(!limit.is_locked());
        assert_eq!(limit.failures, 0);
    }

    #[test]
    fn test_rate_limit_backoff_is_capped() {
        let mut limit = LoginRateLimit::new();
        for _ in 0..100 {
            limit.record_failure();
        }
        let until = limit.locked_until.unwrap();
        assert!(until <= Utc::now() + chrono::Duration::seconds(64));
    }

    #[test]
    fn test_confirmation_state_is_per_session() {
        let db = sled::Config::new().temporary(true).open().unwrap();
        let catalog = Catalog::from_json(r#"[{"id":"rut-1","section":"Rut","chapter":"1"}]"#).unwrap();
        let state = AppState::with_parts(db, catalog, PathBuf::from("unused.json"), b"s".to_vec());

        let a = SessionUser {
            uid: "u".into(),
            email: "a@b.c".into(),
            session_id: "one".into(),
        };
        let b = SessionUser {
            session_id: "two".into(),
            ..a.clone()
        };

        state.with_confirmation(&a, |c| c.request("rut-1")).unwrap();
        assert!(state.with_confirmation(&a, |c| c.is_pending_for("rut-1")));
        assert!(!state.with_confirmation(&b, |c| c.is_pending_for("rut-1")));

        state.clear_confirmation(&a);
        assert!(!state.with_confirmation(&a, |c| c.is_pending_for("rut-1")));
        assert!(state.confirmations.lock().unwrap().is_empty());
    }

    #[test]
    fn test_confirmations_of_expired_sessions_are_pruned() {
        let db = sled::Config::new().temporary(true).open().unwrap();
        let catalog = Catalog::from_json(r#"[{"id":"rut-1","section":"Rut","chapter":"1"}]"#).unwrap();
        let state = AppState::with_parts(db, catalog, PathBuf::from("unused.json"), b"s".to_vec());

        state.confirmations.lock().unwrap().insert(
            "stale".to_string(),
            ConfirmationSlot {
                state: UnreadConfirmation::PendingConfirmation {
                    chapter_id: "rut-1".to_string(),
                },
                touched: Utc::now() - chrono::Duration::hours(auth::SESSION_TTL_HOURS + 1),
            },
        );

        let fresh = SessionUser {
            uid: "u".into(),
            email: "a@b.c".into(),
            session_id: "fresh".into(),
        };
        state.with_confirmation(&fresh, |c| c.request("rut-1")).unwrap();

        let confirmations = state.confirmations.lock().unwrap();
        assert!(!confirmations.contains_key("stale"));
        assert!(confirmations.contains_key("fresh"));
    }

    #[test]
    fn test_add_user_persists_account() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            addr: config::DEFAULT_ADDR.to_string(),
            db_path: dir.path().join("db"),
            catalog_path: PathBuf::from(config::DEFAULT_CATALOG_PATH),
            secret: None,
        };

        let created = add_user(&config, "Rut@Example.com", "moab").unwrap();
        assert_eq!(created.email, "rut@example.com");

        let err = add_user(&config, "rut@example.com", "otra").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<error::AuthError>(),
            Some(error::AuthError::AlreadyExists(_))
        ));

        let db = sled::open(&config.db_path).unwrap();
        let account = auth::authenticate(&db, "rut@example.com", "moab").unwrap();
        assert_eq!(account.uid, created.uid);
    }
}
