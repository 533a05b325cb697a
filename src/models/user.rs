//! User data models and API request/response types.
//!
//! This module defines:
//! - `User`: Persisted identity record
//! - Request types for registration and login
//! - Response types for login and token validation

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Role granted to every self-registered user.
pub const ROLE_USER: &str = "USER";

/// Represents a registered identity.
///
/// The username is unique and immutable once created. The password is only
/// ever stored as an argon2id hash; the raw password and the hash never
/// appear in any API response.
#[derive(Debug, Clone)]
pub struct User {
    /// Unique identifier for this user
    pub id: Uuid,

    /// Unique login name, immutable once created
    pub username: String,

    /// Argon2id PHC-format hash of the password
    pub password_hash: String,

    /// Role claim embedded into issued tokens
    pub role: String,

    /// Timestamp when the user registered
    pub created_at: DateTime<Utc>,
}

/// Request body for `POST /api/auth/register`.
///
/// # JSON Example
///
/// ```json
/// {
///   "username": "alice",
///   "password": "correct horse battery staple"
/// }
/// ```
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
}

/// Response body for a successful registration.
///
/// Contains only the public identity fields.
#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub id: Uuid,
    pub username: String,
    pub role: String,
}

impl From<User> for RegisterResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            role: user.role,
        }
    }
}

/// Request body for `POST /api/auth/login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Response body for a successful login.
///
/// # JSON Example
///
/// ```json
/// {
///   "token": "eyJhbGciOiJIUzI1NiIs...",
///   "token_type": "Bearer",
///   "expires_at": "2025-12-22T10:00:00Z"
/// }
/// ```
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub token_type: String,
    pub expires_at: DateTime<Utc>,
}

/// Response body for the gateway validation endpoint.
///
/// Mirrors the headers: a valid token also sets `X-User` and
/// `X-Auth-Status: valid` on the response.
#[derive(Debug, Serialize)]
pub struct ValidateResponse {
    pub valid: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_uri: Option<String>,
}

/// Optional body for `POST /api/auth/validate`.
#[derive(Debug, Deserialize)]
pub struct ValidateRequest {
    pub original_uri: Option<String>,
}

/// Response body for `GET /api/auth/user-info`.
#[derive(Debug, Serialize)]
pub struct UserInfoResponse {
    pub username: String,
    pub roles: Vec<String>,
    pub expires_at: DateTime<Utc>,
}
