//! Authentication HTTP handlers.
//!
//! This module implements the auth-related API endpoints:
//! - POST /api/auth/register - Create a new user
//! - POST /api/auth/login - Verify credentials, issue a token
//! - GET/POST /api/auth/validate - Gateway token validation
//! - GET /api/auth/user-info - Claims of a valid token

use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use chrono::Utc;

use crate::error::AppError;
use crate::middleware::auth::bearer_token;
use crate::models::user::{
    LoginRequest, LoginResponse, RegisterRequest, RegisterResponse, UserInfoResponse,
    ValidateRequest, ValidateResponse,
};
use crate::services::auth_service;
use crate::state::AppState;
use crate::token::validator::{AuthStatus, RejectReason, Verdict};

/// Register a new user.
///
/// # Request Body
///
/// ```json
/// {
///   "username": "alice",
///   "password": "correct horse battery staple"
/// }
/// ```
///
/// # Response
///
/// - **Success (201 Created)**: Public identity fields, never any password
///   material
/// - **Error (409)**: Username already taken
/// - **Error (429)**: Registration quota exhausted
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), AppError> {
    let user =
        auth_service::register(state.users.as_ref(), &request.username, &request.password).await?;
    Ok((StatusCode::CREATED, Json(user.into())))
}

/// Verify credentials and issue a signed session token.
///
/// # Response (200)
///
/// ```json
/// {
///   "token": "eyJhbGciOiJIUzI1NiIs...",
///   "token_type": "Bearer",
///   "expires_at": "2025-12-22T10:00:00Z"
/// }
/// ```
///
/// A wrong password and an unknown username return the same 401 payload.
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let response = auth_service::login(
        state.users.as_ref(),
        &state.validator,
        &request.username,
        &request.password,
        Utc::now(),
        state.token_ttl,
    )
    .await?;
    Ok(Json(response))
}

/// Gateway token validation (GET).
///
/// The reverse proxy delegates auth decisions here: it forwards the original
/// request's `Authorization` header (and optionally `X-Original-URI`) and
/// gets back the decision plus forwarding headers.
///
/// # Response headers
///
/// - `X-Auth-Status`: valid | missing_token | expired | invalid | error
/// - `X-User`: the validated username, only on success
pub async fn validate_token(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let original_uri = headers
        .get("X-Original-URI")
        .and_then(|h| h.to_str().ok())
        .map(str::to_string);
    decision_response(&state, &headers, original_uri)
}

/// Gateway token validation (POST variant).
///
/// Behaves exactly like the GET endpoint; an optional JSON body may carry
/// the original URI instead of the header.
pub async fn validate_token_post(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    // Body is optional; a missing or non-JSON body is simply ignored
    let original_uri = serde_json::from_slice::<ValidateRequest>(&body)
        .ok()
        .and_then(|r| r.original_uri);
    decision_response(&state, &headers, original_uri)
}

/// Extract user information from a valid token.
///
/// # Response (200)
///
/// ```json
/// {
///   "username": "alice",
///   "roles": ["USER"],
///   "expires_at": "2025-12-22T10:00:00Z"
/// }
/// ```
pub async fn user_info(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<UserInfoResponse>, AppError> {
    match state.validator.validate(bearer_token(&headers), Utc::now()) {
        Verdict::Valid { claims } => Ok(Json(UserInfoResponse {
            username: claims.sub.clone(),
            roles: claims.roles.clone(),
            expires_at: claims.expires_at(),
        })),
        Verdict::Invalid { reason } => {
            tracing::debug!(?reason, "user-info rejected");
            Err(AppError::Unauthorized)
        }
    }
}

/// Build the gateway decision response with its status headers.
fn decision_response(
    state: &AppState,
    headers: &HeaderMap,
    original_uri: Option<String>,
) -> Response {
    match state.validator.validate(bearer_token(headers), Utc::now()) {
        Verdict::Valid { claims } => {
            let username = claims.sub;
            let mut response = Json(ValidateResponse {
                valid: true,
                username: Some(username.clone()),
                error: None,
                original_uri,
            })
            .into_response();
            set_header(&mut response, "X-Auth-Status", AuthStatus::Valid.as_str());
            set_header(&mut response, "X-User", &username);
            response
        }
        Verdict::Invalid { reason } => {
            tracing::debug!(?reason, "gateway validation rejected");
            let status = AuthStatus::from(reason);
            let mut response = (
                StatusCode::UNAUTHORIZED,
                Json(ValidateResponse {
                    valid: false,
                    username: None,
                    error: Some(reject_message(reason).to_string()),
                    original_uri,
                }),
            )
                .into_response();
            set_header(&mut response, "X-Auth-Status", status.as_str());
            response
        }
    }
}

/// Human-readable reason for the gateway body.
///
/// The gateway endpoint is internal; unlike the login flow it may name the
/// reason, which the status header exposes anyway.
fn reject_message(reason: RejectReason) -> &'static str {
    match reason {
        RejectReason::MissingToken => "No valid Authorization header",
        RejectReason::Expired => "Token expired",
        RejectReason::Malformed | RejectReason::Unsupported | RejectReason::InvalidSignature => {
            "Invalid token"
        }
    }
}

fn set_header(response: &mut Response, name: &'static str, value: &str) {
    if let Ok(value) = HeaderValue::from_str(value) {
        response.headers_mut().insert(name, value);
    }
}
