//! HTTP route table and middleware wiring.

use axum::{
    Router, middleware as axum_middleware,
    routing::{get, post},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;
use crate::{handlers, middleware};

/// Build the application router.
///
/// Three route groups:
/// - public: health probe
/// - auth: registration, login, gateway validation (rate limited)
/// - accounts: balance operations (bearer token required)
pub fn build(state: AppState) -> Router {
    // Auth endpoints sit behind the rate limiter, not behind token auth:
    // they are how callers get a token in the first place
    let auth_routes = Router::new()
        .route("/api/auth/register", post(handlers::auth::register))
        .route("/api/auth/login", post(handlers::auth::login))
        .route(
            "/api/auth/validate",
            get(handlers::auth::validate_token).post(handlers::auth::validate_token_post),
        )
        .route("/api/auth/user-info", get(handlers::auth::user_info))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::rate_limit::rate_limit_middleware,
        ));

    // Account endpoints require a valid bearer token
    let account_routes = Router::new()
        .route(
            "/api/accounts",
            post(handlers::accounts::create_account).get(handlers::accounts::list_accounts),
        )
        .route("/api/accounts/transfer", post(handlers::accounts::transfer))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::auth_middleware,
        ));

    Router::new()
        .route("/health", get(handlers::health::health_check))
        .merge(auth_routes)
        .merge(account_routes)
        // Distributed tracing middleware for observability
        .layer(TraceLayer::new_for_http())
        // The browser frontend is served from a different origin
        .layer(CorsLayer::permissive())
        .with_state(state)
}
