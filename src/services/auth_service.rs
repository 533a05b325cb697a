//! Login and registration flows.
//!
//! Registration enforces username uniqueness and never stores or returns a
//! raw password. Login deliberately collapses "unknown user" and "wrong
//! password" into one identical failure so the response cannot be used to
//! enumerate usernames; the distinction survives only in the logs.

use chrono::{DateTime, TimeDelta, Utc};

use crate::error::AppError;
use crate::models::user::{LoginResponse, ROLE_USER, User};
use crate::password;
use crate::store::{CredentialStore, StoreError};
use crate::token::validator::TokenValidator;

/// Register a new identity.
///
/// The password is hashed with argon2id before anything is persisted. A
/// second registration for the same username always fails with a conflict;
/// it never overwrites the first.
///
/// # Errors
///
/// - `InvalidRequest`: blank username or password
/// - `UsernameTaken`: the name already exists
pub async fn register(
    store: &dyn CredentialStore,
    username: &str,
    raw_password: &str,
) -> Result<User, AppError> {
    let username = username.trim();
    if username.is_empty() {
        return Err(AppError::InvalidRequest(
            "Username must not be empty".to_string(),
        ));
    }
    if raw_password.is_empty() {
        return Err(AppError::InvalidRequest(
            "Password must not be empty".to_string(),
        ));
    }

    let password_hash = password::hash_password(raw_password)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    let user = User {
        id: uuid::Uuid::new_v4(),
        username: username.to_string(),
        password_hash,
        role: ROLE_USER.to_string(),
        created_at: Utc::now(),
    };

    match store.insert_user(user.clone()).await {
        Ok(()) => {
            tracing::info!(username, "user registered");
            Ok(user)
        }
        Err(StoreError::DuplicateUsername) => Err(AppError::UsernameTaken),
        Err(err) => Err(AppError::Store(err)),
    }
}

/// Authenticate a user and issue a signed session token.
///
/// # Errors
///
/// `Unauthorized` for both an unknown username and a wrong password; the
/// two responses are byte-identical by design. The actual cause is logged
/// at debug level for diagnostics.
pub async fn login(
    store: &dyn CredentialStore,
    validator: &TokenValidator,
    username: &str,
    raw_password: &str,
    now: DateTime<Utc>,
    ttl: TimeDelta,
) -> Result<LoginResponse, AppError> {
    let Some(user) = store.find_user(username).await? else {
        tracing::debug!(username, "login rejected: unknown user");
        return Err(AppError::Unauthorized);
    };

    if !password::verify_password(raw_password, &user.password_hash) {
        tracing::debug!(username, "login rejected: password mismatch");
        return Err(AppError::Unauthorized);
    }

    let token = validator
        .signing_codec()
        .issue(&user.username, &[user.role.clone()], now, ttl)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    tracing::info!(username, "login succeeded");
    Ok(LoginResponse {
        token,
        token_type: "Bearer".to_string(),
        expires_at: now + ttl,
    })
}
