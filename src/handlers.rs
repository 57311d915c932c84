//! HTTP route handlers for the web application.
//!
//! Page handlers redirect to `/login` when there is no session; the JSON API
//! answers 401 instead.

use crate::auth::{self, SESSION_COOKIE, SESSION_TTL_HOURS};
use crate::error::{AppError, AuthError};
use crate::models::SessionUser;
use crate::search::filter_chapters;
use crate::session::{AuthEffect, AuthState, ReadingSession};
use crate::templates::{list_url, render_chapter_detail, render_chapter_list, render_login, render_menu};
use crate::{AppState, LoginRateLimit};
use axum::{
    extract::{Path, Query, State},
    http::{header::SET_COOKIE, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    Json,
};
use axum_extra::extract::CookieJar;
use chrono::Utc;
use serde::Deserialize;
use std::sync::{Arc, MutexGuard};

fn current_user(state: &AppState, jar: &CookieJar) -> Option<SessionUser> {
    auth::session_user(jar, &state.secret)
}

fn detail_url(id: &str, saved: bool) -> String {
    let url = format!("/chapter/{}", urlencoding::encode(id));
    if saved {
        format!("{}?saved=1", url)
    } else {
        url
    }
}

// ============================================================================
// Chapter List
// ============================================================================

#[derive(Deserialize)]
pub struct ListQuery {
    pub q: Option<String>,
}

pub async fn index(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Query(query): Query<ListQuery>,
) -> Response {
    let mut session = state.reading_session();
    let auth = AuthState::from_user(current_user(&state, &jar));
    if session.on_auth_changed(auth).await == AuthEffect::RedirectToLogin {
        return Redirect::to("/login").into_response();
    }

    let q = query.q.unwrap_or_default();
    let chapters = filter_chapters(state.catalog.chapters(), &q);
    let banner = session
        .load_failed()
        .then_some("No se pudo cargar tu historial de lectura. Por favor, recarga la página.");

    Html(render_chapter_list(&chapters, session.status(), &q, banner)).into_response()
}

// ============================================================================
// Chapter Detail
// ============================================================================

#[derive(Deserialize)]
pub struct DetailQuery {
    pub saved: Option<String>,
}

pub async fn chapter_detail(
    Path(id): Path<String>,
    Query(query): Query<DetailQuery>,
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
) -> Result<Response, AppError> {
    let user = current_user(&state, &jar).ok_or(AppError::NotSignedIn)?;
    let chapter = state.chapter(&id)?;

    let record = state.reading.record(Some(&user), chapter).await?;
    let pending = state.with_confirmation(&user, |c| c.is_pending_for(&chapter.id));

    Ok(Html(render_chapter_detail(
        chapter,
        record.as_ref(),
        pending && record.is_some(),
        query.saved.is_some(),
    ))
    .into_response())
}

// ============================================================================
// Chapter Actions
// ============================================================================

#[derive(Deserialize)]
pub struct MarkReadForm {
    #[serde(default)]
    pub q: String,
}

pub async fn mark_read(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    axum::Form(form): axum::Form<MarkReadForm>,
) -> Result<Response, AppError> {
    let user = current_user(&state, &jar).ok_or(AppError::NotSignedIn)?;
    let chapter = state.chapter(&id)?;

    state.reading.mark_read(Some(&user), chapter, Utc::now()).await?;

    Ok(Redirect::to(&list_url(&form.q, Some(&chapter.id))).into_response())
}

#[derive(Deserialize)]
pub struct NotesForm {
    #[serde(default)]
    pub notes: String,
}

pub async fn save_notes(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    axum::Form(form): axum::Form<NotesForm>,
) -> Result<Response, AppError> {
    let user = current_user(&state, &jar).ok_or(AppError::NotSignedIn)?;
    let chapter = state.chapter(&id)?;

    state
        .reading
        .save_notes(Some(&user), chapter, &form.notes, Utc::now())
        .await?;

    Ok(Redirect::to(&detail_url(&chapter.id, true)).into_response())
}

pub async fn request_unread(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
) -> Result<Response, AppError> {
    let user = current_user(&state, &jar).ok_or(AppError::NotSignedIn)?;
    let chapter = state.chapter(&id)?;

    state.with_confirmation(&user, |c| c.request(&chapter.id))?;

    Ok(Redirect::to(&detail_url(&chapter.id, false)).into_response())
}

pub async fn confirm_unread(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
) -> Result<Response, AppError> {
    let user = current_user(&state, &jar).ok_or(AppError::NotSignedIn)?;
    let chapter = state.chapter(&id)?;

    state.with_confirmation(&user, |c| c.confirm(&chapter.id))?;
    let result = state.reading.mark_unread(Some(&user), chapter).await;
    state.with_confirmation(&user, |c| c.finish());
    result?;

    Ok(Redirect::to(&list_url("", Some(&chapter.id))).into_response())
}

pub async fn cancel_unread(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
) -> Result<Response, AppError> {
    let user = current_user(&state, &jar).ok_or(AppError::NotSignedIn)?;
    let chapter = state.chapter(&id)?;

    state.with_confirmation(&user, |c| c.cancel());

    Ok(Redirect::to(&detail_url(&chapter.id, false)).into_response())
}

pub async fn menu(State(state): State<Arc<AppState>>, jar: CookieJar) -> Response {
    if current_user(&state, &jar).is_none() {
        return Redirect::to("/login").into_response();
    }
    Html(render_menu()).into_response()
}

// ============================================================================
// Authentication Handlers
// ============================================================================

fn rate_limit(state: &AppState) -> MutexGuard<'_, LoginRateLimit> {
    state
        .login_rate_limit
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

pub async fn login_page(State(state): State<Arc<AppState>>, jar: CookieJar) -> Response {
    if current_user(&state, &jar).is_some() {
        return Redirect::to("/").into_response();
    }
    Html(render_login(None, "")).into_response()
}

#[derive(Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

pub async fn login_submit(
    State(state): State<Arc<AppState>>,
    axum::Form(form): axum::Form<LoginForm>,
) -> Response {
    if rate_limit(&state).is_locked() {
        tracing::warn!(email = %form.email, "login rejected: rate limited");
        return (
            StatusCode::TOO_MANY_REQUESTS,
            Html(render_login(Some(AuthError::RateLimited.user_message()), &form.email)),
        )
            .into_response();
    }

    // Argon2 verification blocks for ~100ms.
    let db = state.db.clone();
    let email = form.email.clone();
    let password = form.password;
    let result = tokio::task::spawn_blocking(move || auth::authenticate(&db, &email, &password))
        .await
        .unwrap_or_else(|e| Err(AuthError::Internal(e.to_string())));

    let account = match result {
        Ok(account) => account,
        Err(e) => {
            if matches!(e, AuthError::UserNotFound(_) | AuthError::WrongPassword) {
                rate_limit(&state).record_failure();
            }
            tracing::warn!(email = %form.email, error = %e, "login failed");
            return Html(render_login(Some(e.user_message()), &form.email)).into_response();
        }
    };

    rate_limit(&state).reset();

    let session_token = match auth::create_session(&state.secret, &account) {
        Some(t) => t,
        None => {
            let e = AuthError::Internal("failed to create session".to_string());
            tracing::error!(uid = %account.uid, "failed to create session");
            return Html(render_login(Some(e.user_message()), &form.email)).into_response();
        }
    };

    tracing::info!(uid = %account.uid, "signed in");

    let cookie = format!(
        "{}={}; Path=/; HttpOnly; Secure; SameSite=Strict; Max-Age={}",
        SESSION_COOKIE,
        session_token,
        SESSION_TTL_HOURS * 3600
    );

    ([(SET_COOKIE, cookie)], Redirect::to("/")).into_response()
}

pub async fn logout(State(state): State<Arc<AppState>>, jar: CookieJar) -> Response {
    if let Some(user) = current_user(&state, &jar) {
        state.clear_confirmation(&user);
        tracing::info!(uid = %user.uid, "signed out");
    }

    let cookie = format!("{}=; Path=/; HttpOnly; Secure; Max-Age=0", SESSION_COOKIE);

    ([(SET_COOKIE, cookie)], Redirect::to("/login")).into_response()
}

// ============================================================================
// JSON API
// ============================================================================

fn api_error(e: AppError) -> Response {
    match e {
        AppError::NotSignedIn => (StatusCode::UNAUTHORIZED, "Not logged in").into_response(),
        AppError::UnknownChapter(_) => (StatusCode::NOT_FOUND, "Chapter not found").into_response(),
        AppError::Confirmation(e) => (StatusCode::CONFLICT, e.to_string()).into_response(),
        AppError::Auth(e) => (StatusCode::UNAUTHORIZED, e.user_message()).into_response(),
        AppError::Store(e) => {
            tracing::error!(error = %e, "store operation failed");
            (StatusCode::INTERNAL_SERVER_ERROR, "Store error").into_response()
        }
    }
}

/// A loaded session for an API call, or the error response to send instead.
async fn api_session(state: &AppState, jar: &CookieJar) -> Result<ReadingSession, Response> {
    let mut session = state.reading_session();
    let auth = AuthState::from_user(current_user(state, jar));
    if session.on_auth_changed(auth).await == AuthEffect::RedirectToLogin {
        return Err(api_error(AppError::NotSignedIn));
    }
    if session.load_failed() {
        return Err((StatusCode::INTERNAL_SERVER_ERROR, "Failed to load read status").into_response());
    }
    Ok(session)
}

pub async fn api_chapters(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> Response {
    let q = query.q.unwrap_or_default();
    Json(filter_chapters(state.catalog.chapters(), &q)).into_response()
}

pub async fn api_read_status(State(state): State<Arc<AppState>>, jar: CookieJar) -> Response {
    let user = current_user(&state, &jar);
    match state.reading.load_all(user.as_ref()).await {
        Ok(status) => Json(status).into_response(),
        Err(e) => api_error(e),
    }
}

pub async fn api_mark_read(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
) -> Response {
    let mut session = match api_session(&state, &jar).await {
        Ok(s) => s,
        Err(response) => return response,
    };
    let chapter = match state.chapter(&id) {
        Ok(c) => c,
        Err(e) => return api_error(e),
    };

    match session.mark_read(chapter, Utc::now()).await {
        Ok(()) => Json(session.status()).into_response(),
        Err(e) => api_error(e),
    }
}

#[derive(Deserialize)]
pub struct SaveNotesBody {
    pub notes: String,
}

pub async fn api_save_notes(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(body): Json<SaveNotesBody>,
) -> Response {
    let mut session = match api_session(&state, &jar).await {
        Ok(s) => s,
        Err(response) => return response,
    };
    let chapter = match state.chapter(&id) {
        Ok(c) => c,
        Err(e) => return api_error(e),
    };

    match session.save_notes(chapter, &body.notes, Utc::now()).await {
        Ok(()) => Json(session.status()).into_response(),
        Err(e) => api_error(e),
    }
}

#[derive(Deserialize)]
pub struct MarkUnreadBody {
    pub confirm: bool,
}

/// `{"confirm": false}` requests removal; a following `{"confirm": true}`
/// performs it.
pub async fn api_mark_unread(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(body): Json<MarkUnreadBody>,
) -> Response {
    let mut session = match api_session(&state, &jar).await {
        Ok(s) => s,
        Err(response) => return response,
    };
    let chapter = match state.chapter(&id) {
        Ok(c) => c,
        Err(e) => return api_error(e),
    };
    let Some(user) = session.user().cloned() else {
        return api_error(AppError::NotSignedIn);
    };

    if !body.confirm {
        return match state.with_confirmation(&user, |c| c.request(&chapter.id)) {
            Ok(()) => (StatusCode::ACCEPTED, "Confirmation required").into_response(),
            Err(e) => api_error(e.into()),
        };
    }

    if let Err(e) = state.with_confirmation(&user, |c| c.confirm(&chapter.id)) {
        return api_error(e.into());
    }
    let result = session.mark_unread(chapter).await;
    state.with_confirmation(&user, |c| c.finish());

    match result {
        Ok(()) => Json(session.status()).into_response(),
        Err(e) => api_error(e),
    }
}
