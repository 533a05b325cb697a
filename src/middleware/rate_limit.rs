//! Rate limit middleware for the authentication endpoints.
//!
//! Classifies each request by path (the original portal's scheme: login and
//! registration are throttled hard, gateway validation barely at all),
//! checks the per-client counter, and shapes the response:
//!
//! - on allow: `X-RateLimit-Limit`, `X-RateLimit-Remaining`,
//!   `X-RateLimit-Reset` headers on the downstream response
//! - on deny: HTTP 429 with a machine-readable body and `Retry-After`

use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, Request, State},
    http::{HeaderMap, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
};
use chrono::Utc;

use crate::error::AppError;
use crate::rate_limit::{EndpointClass, RateDecision};
use crate::state::AppState;

/// Map a request path to its quota class.
fn classify(path: &str) -> EndpointClass {
    if path.ends_with("/login") {
        EndpointClass::Login
    } else if path.ends_with("/register") {
        EndpointClass::Register
    } else if path.contains("/validate") {
        EndpointClass::Validate
    } else {
        EndpointClass::Other
    }
}

/// Derive the client key the counters are scoped to.
///
/// Prefers the first `X-Forwarded-For` entry (the reverse proxy fills it),
/// then `X-Real-IP`, then the socket peer address.
fn client_key(headers: &HeaderMap, request: &Request) -> String {
    if let Some(forwarded) = headers.get("X-Forwarded-For").and_then(|h| h.to_str().ok()) {
        if let Some(first) = forwarded.split(',').next() {
            let first = first.trim();
            if !first.is_empty() {
                return first.to_string();
            }
        }
    }
    if let Some(real_ip) = headers.get("X-Real-IP").and_then(|h| h.to_str().ok()) {
        if !real_ip.is_empty() {
            return real_ip.to_string();
        }
    }
    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Attach the quota metadata headers to a response.
fn apply_headers(response: &mut Response, decision: &RateDecision) {
    let headers = response.headers_mut();
    headers.insert("X-RateLimit-Limit", header_value(decision.limit));
    headers.insert("X-RateLimit-Remaining", header_value(decision.remaining));
    headers.insert(
        "X-RateLimit-Reset",
        header_value(decision.reset_at_ms as u64),
    );
}

fn header_value(n: impl ToString) -> HeaderValue {
    // Numbers always render as valid header bytes
    HeaderValue::from_str(&n.to_string()).expect("numeric header value")
}

/// Rate limit middleware function.
///
/// Denied requests still consume quota, matching the original interceptor.
/// This is advisory shaping; the credential checks downstream stand on
/// their own.
pub async fn rate_limit_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let class = classify(request.uri().path());
    let key = client_key(request.headers(), &request);
    let decision = state.limiter.check(&key, class, Utc::now());

    if !decision.allowed {
        tracing::warn!(
            client = %key,
            path = %request.uri().path(),
            limit = decision.limit,
            "rate limit exceeded"
        );
        let mut response = AppError::RateLimited {
            limit: decision.limit,
            window_secs: decision.window_secs,
            retry_after_secs: decision.retry_after_secs,
        }
        .into_response();
        apply_headers(&mut response, &decision);
        response
            .headers_mut()
            .insert("Retry-After", header_value(decision.retry_after_secs));
        return response;
    }

    let mut response = next.run(request).await;
    apply_headers(&mut response, &decision);
    response
}
