//! Bearer token authentication middleware.
//!
//! This middleware intercepts every protected request to:
//! 1. Extract the token from the `Authorization: Bearer` header
//! 2. Validate it against the trusted key set and the current time
//! 3. Inject the caller's identity into the request
//! 4. Reject unauthorized requests with HTTP 401
//!
//! The 401 body is the same generic message for every rejection reason;
//! the specific reason only goes to the log.

use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use chrono::Utc;

use crate::error::AppError;
use crate::state::AppState;
use crate::token::validator::{RejectReason, Verdict};

/// Identity attached to authenticated requests.
///
/// Inserted into the request's extension map; route handlers extract it
/// with `Extension<AuthContext>` to know who made the request.
#[derive(Debug, Clone)]
pub struct AuthContext {
    /// Subject claim of the validated token
    pub username: String,

    /// Role claims granted at login
    pub roles: Vec<String>,
}

/// Pull the bearer token out of the `Authorization` header.
///
/// An absent header and a non-Bearer scheme both yield `None`, which the
/// validator classifies as `MissingToken`, distinct from signature or
/// expiry failures.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
}

/// Token authentication middleware function.
///
/// # Flow
///
/// 1. Extract `Authorization: Bearer <token>` header from request
/// 2. Validate signature and expiry against the injected clock
/// 3. If valid: inject `AuthContext` into request, call next handler
/// 4. If not: log the precise reason, return the flattened 401
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(request.headers());

    match state.validator.validate(token, Utc::now()) {
        Verdict::Valid { claims } => {
            let auth_context = AuthContext {
                username: claims.sub,
                roles: claims.roles,
            };
            request.extensions_mut().insert(auth_context);
            Ok(next.run(request).await)
        }
        Verdict::Invalid { reason } => {
            match reason {
                // Widespread signature failures usually mean the issuing and
                // validating key sets have drifted apart
                RejectReason::InvalidSignature => {
                    tracing::warn!(
                        path = %request.uri().path(),
                        "token signature rejected; verify TOKEN_SECRETS matches the issuer"
                    );
                }
                _ => {
                    tracing::debug!(path = %request.uri().path(), ?reason, "request rejected");
                }
            }
            Err(AppError::Unauthorized)
        }
    }
}
