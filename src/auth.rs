//! Authentication and session management.
//!
//! Accounts live in the `users` sled tree with Argon2id password hashes.
//! Sessions are HMAC-signed cookies carrying the user's uid; the signing
//! secret comes from `BIBLECLOUD_SECRET` or is generated per process.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use axum_extra::extract::CookieJar;
use base64::{engine::general_purpose::STANDARD, Engine};
use chrono::Utc;
use hmac::{Hmac, Mac};
use rand::Rng;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::error::AuthError;
use crate::models::{SessionUser, UserAccount};

type HmacSha256 = Hmac<Sha256>;

/// Session cookie name
pub const SESSION_COOKIE: &str = "biblecloud_session";

/// Session time-to-live in hours
pub const SESSION_TTL_HOURS: i64 = 24;

const USERS_TREE: &str = "users";

// ============================================================================
// Session Structure
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Session {
    uid: String,
    email: String,
    created: i64,
    expires: i64,
    nonce: String,
}

fn random_token(len: usize) -> String {
    rand::thread_rng()
        .sample_iter(&rand::distributions::Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

/// A fresh signing secret, used when none is configured.
pub fn generate_secret() -> Vec<u8> {
    random_token(48).into_bytes()
}

// ============================================================================
// Accounts
// ============================================================================

/// Loose shape check: `local@domain.tld`, no whitespace.
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        None => false,
    }
}

fn normalize_email(email: &str) -> Result<String, AuthError> {
    let email = email.trim().to_lowercase();
    if !is_valid_email(&email) {
        return Err(AuthError::InvalidEmail(email));
    }
    Ok(email)
}

pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| AuthError::Internal(e.to_string()))
}

/// A stored hash that does not parse is an unusable credential, not a
/// wrong password.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, AuthError> {
    let parsed = PasswordHash::new(hash).map_err(|e| {
        tracing::error!(error = %e, "stored password hash is malformed");
        AuthError::InvalidCredential
    })?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

fn find_user(db: &sled::Db, email: &str) -> Result<Option<UserAccount>, AuthError> {
    let users = db.open_tree(USERS_TREE)?;
    match users.get(email.as_bytes())? {
        Some(bytes) => serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|e| AuthError::Internal(format!("corrupt account {}: {}", email, e))),
        None => Ok(None),
    }
}

/// Register a new account.
pub fn create_user(db: &sled::Db, email: &str, password: &str) -> Result<UserAccount, AuthError> {
    let email = normalize_email(email)?;
    if find_user(db, &email)?.is_some() {
        return Err(AuthError::AlreadyExists(email));
    }

    let account = UserAccount {
        uid: random_token(20),
        email: email.clone(),
        password_hash: hash_password(password)?,
        created: Utc::now(),
    };
    let json = serde_json::to_vec(&account).map_err(|e| AuthError::Internal(e.to_string()))?;
    db.open_tree(USERS_TREE)?.insert(email.as_bytes(), json)?;

    tracing::info!(uid = %account.uid, email = %account.email, "created user");
    Ok(account)
}

/// Check credentials and return the account on success.
pub fn authenticate(db: &sled::Db, email: &str, password: &str) -> Result<UserAccount, AuthError> {
    let email = normalize_email(email)?;
    let account = find_user(db, &email)?.ok_or_else(|| AuthError::UserNotFound(email.clone()))?;

    if !verify_password(password, &account.password_hash)? {
        return Err(AuthError::WrongPassword);
    }
    Ok(account)
}

// ============================================================================
// Sessions
// ============================================================================

fn sign(secret: &[u8], payload: &str) -> Option<String> {
    let mut mac = HmacSha256::new_from_slice(secret).ok()?;
    mac.update(payload.as_bytes());
    Some(hex_encode(mac.finalize().into_bytes().as_slice()))
}

/// Create a new session token for the account
pub fn create_session(secret: &[u8], account: &UserAccount) -> Option<String> {
    let now = Utc::now().timestamp();
    let session = Session {
        uid: account.uid.clone(),
        email: account.email.clone(),
        created: now,
        expires: now + (SESSION_TTL_HOURS * 3600),
        nonce: random_token(16),
    };
    let session_json = serde_json::to_string(&session).ok()?;
    let signature = sign(secret, &session_json)?;

    Some(format!("{}.{}", base64_encode(&session_json), signature))
}

/// Verify a session token, returning the signed-in user
pub fn verify_session(token: &str, secret: &[u8]) -> Option<SessionUser> {
    let (payload, signature) = token.split_once('.')?;
    let session_json = base64_decode(payload)?;
    let expected_sig = sign(secret, &session_json)?;

    // Constant-time comparison to prevent timing attacks
    let sig_bytes = signature.as_bytes();
    let expected_bytes = expected_sig.as_bytes();
    if sig_bytes.len() != expected_bytes.len() || sig_bytes.ct_eq(expected_bytes).unwrap_u8() != 1 {
        return None;
    }

    let session: Session = serde_json::from_str(&session_json).ok()?;
    if Utc::now().timestamp() >= session.expires {
        return None;
    }

    Some(SessionUser {
        uid: session.uid,
        email: session.email,
        session_id: session.nonce,
    })
}

/// The user behind the request's session cookie, if any
pub fn session_user(jar: &CookieJar, secret: &[u8]) -> Option<SessionUser> {
    jar.get(SESSION_COOKIE)
        .and_then(|cookie| verify_session(cookie.value(), secret))
}

// ============================================================================
// Encoding Helpers
// ============================================================================

pub fn base64_encode(s: &str) -> String {
    STANDARD.encode(s.as_bytes())
}

pub fn base64_decode(s: &str) -> Option<String> {
    let bytes = STANDARD.decode(s).ok()?;
    String::from_utf8(bytes).ok()
}

pub fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}
