//! Error types.
//!
//! Every failure is terminal for the user action that caused it; nothing here
//! is retried.

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};

use crate::templates::{base_html, html_escape};

/// Failures from the auth collaborator. `user_message` gives the text shown
/// on the login form.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("invalid credential")]
    InvalidCredential,

    #[error("invalid email address: {0}")]
    InvalidEmail(String),

    #[error("no account for {0}")]
    UserNotFound(String),

    #[error("wrong password")]
    WrongPassword,

    #[error("account already exists: {0}")]
    AlreadyExists(String),

    #[error("too many failed attempts")]
    RateLimited,

    #[error("auth backend error: {0}")]
    Internal(String),
}

impl AuthError {
    pub fn user_message(&self) -> &'static str {
        match self {
            AuthError::InvalidCredential => {
                "Credenciales incorrectas. Por favor, verifica tu correo y contraseña."
            }
            AuthError::InvalidEmail(_) => "Formato de correo inválido",
            AuthError::UserNotFound(_) => "Usuario no encontrado. Verifica el correo electrónico.",
            AuthError::WrongPassword => "Contraseña incorrecta. Por favor, inténtalo de nuevo.",
            AuthError::AlreadyExists(_) => "Ya existe una cuenta con ese correo.",
            AuthError::RateLimited => {
                "Demasiados intentos fallidos. Espera un momento e inténtalo de nuevo."
            }
            AuthError::Internal(_) => {
                "Ocurrió un error de autenticación. Por favor, inténtalo de nuevo."
            }
        }
    }
}

impl From<sled::Error> for AuthError {
    fn from(e: sled::Error) -> Self {
        AuthError::Internal(e.to_string())
    }
}

/// Failures talking to the document store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Db(#[from] sled::Error),

    #[error("corrupt record {key}: {source}")]
    Decode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("JSON error: {0}")]
    Encode(#[from] serde_json::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("cannot read catalog: {0}")]
    Io(#[from] std::io::Error),

    #[error("cannot parse catalog: {0}")]
    Json(#[from] serde_json::Error),

    #[error("duplicate chapter id: {0}")]
    DuplicateId(String),

    #[error("catalog is empty")]
    Empty,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfirmationError {
    #[error("no pending confirmation for chapter {0}")]
    NotPending(String),

    #[error("another chapter is already being removed")]
    Busy,
}

/// Umbrella error for request handling.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("not signed in")]
    NotSignedIn,

    #[error("unknown chapter: {0}")]
    UnknownChapter(String),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Confirmation(#[from] ConfirmationError),
}

pub type Result<T> = std::result::Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::NotSignedIn => Redirect::to("/login").into_response(),
            AppError::UnknownChapter(id) => (
                StatusCode::NOT_FOUND,
                Html(base_html(
                    "No encontrado",
                    &format!(
                        r#"<div class="message error">Capítulo desconocido: {}</div>"#,
                        html_escape(&id)
                    ),
                    None,
                    true,
                )),
            )
                .into_response(),
            AppError::Confirmation(e) => {
                tracing::warn!(error = %e, "confirmation rejected");
                (
                    StatusCode::CONFLICT,
                    Html(base_html(
                        "Error",
                        r#"<div class="message error">Confirma la acción antes de continuar.</div>
                        <p><a href="/">Volver</a></p>"#,
                        None,
                        true,
                    )),
                )
                    .into_response()
            }
            AppError::Auth(e) => (
                StatusCode::UNAUTHORIZED,
                Html(base_html(
                    "Error",
                    &format!(r#"<div class="message error">{}</div>"#, e.user_message()),
                    None,
                    false,
                )),
            )
                .into_response(),
            AppError::Store(e) => {
                tracing::error!(error = %e, "store operation failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Html(base_html(
                        "Error",
                        r#"<div class="message error">Ocurrió un error. Por favor, inténtalo de nuevo.</div>
                        <p><a href="/">Volver</a></p>"#,
                        None,
                        true,
                    )),
                )
                    .into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_messages_are_localized() {
        assert_eq!(
            AuthError::InvalidCredential.user_message(),
            "Credenciales incorrectas. Por favor, verifica tu correo y contraseña."
        );
        assert_eq!(
            AuthError::InvalidEmail("x".into()).user_message(),
            "Formato de correo inválido"
        );
        assert!(AuthError::WrongPassword.user_message().starts_with("Contraseña incorrecta"));
        assert!(AuthError::Internal("boom".into())
            .user_message()
            .starts_with("Ocurrió un error de autenticación"));
    }

    #[test]
    fn test_not_signed_in_redirects() {
        let response = AppError::NotSignedIn.into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()["location"], "/login");
    }

    #[test]
    fn test_unknown_chapter_is_404() {
        let response = AppError::UnknownChapter("x-1".into()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_display() {
        let e = ConfirmationError::NotPending("genesis-1".into());
        assert_eq!(format!("{e}"), "no pending confirmation for chapter genesis-1");
    }
}
