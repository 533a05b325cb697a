//! Bank Portal - Main Application Entry Point
//!
//! REST API server for the bank portal: user registration and login with
//! signed session tokens, gateway token validation, and authenticated
//! account/transfer operations.
//!
//! # Startup Flow
//!
//! 1. Load configuration from environment variables
//! 2. Build the trusted signing key set and the in-memory stores
//! 3. Build HTTP router with routes and middleware
//! 4. Start server on configured port

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use chrono::{TimeDelta, Utc};
use tracing_subscriber::EnvFilter;

use bank_portal::config::Config;
use bank_portal::rate_limit::RateLimiter;
use bank_portal::router;
use bank_portal::state::AppState;
use bank_portal::store::memory::{MemoryLedger, MemoryUserStore};
use bank_portal::token::validator::TokenValidator;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging with tracing subscriber. Reads RUST_LOG environment variable (defaults to "info" level)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    // Load configuration
    let config = Config::from_env()?;
    tracing::info!("Configuration loaded");

    let secrets = config.secret_set();
    anyhow::ensure!(
        !secrets.is_empty(),
        "TOKEN_SECRETS must contain at least one key"
    );
    // The issuing and validating sides share this key set; if a deployment
    // lets them drift apart, every token is rejected with 401
    tracing::info!(trusted_keys = secrets.len(), "token key set loaded");

    let state = AppState {
        users: Arc::new(MemoryUserStore::new()),
        ledger: Arc::new(MemoryLedger::new()),
        validator: TokenValidator::new(&secrets),
        limiter: Arc::new(RateLimiter::new(
            Duration::from_secs(config.rate_window_secs),
            Utc::now(),
        )),
        token_ttl: TimeDelta::seconds(config.token_ttl_secs),
    };

    let app = router::build(state);

    // Bind to network address and start server
    let addr = format!("0.0.0.0:{}", config.server_port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    // ConnectInfo feeds the rate limiter's client keys when no proxy
    // headers are present
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
