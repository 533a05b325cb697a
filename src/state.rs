//! Shared application state.

use std::sync::Arc;

use chrono::TimeDelta;

use crate::rate_limit::RateLimiter;
use crate::store::{CredentialStore, Ledger};
use crate::token::validator::TokenValidator;

/// State shared with every handler via Axum's `State` extractor.
///
/// The stores are held behind their port traits, so the HTTP layer never
/// learns which backend it is talking to.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn CredentialStore>,
    pub ledger: Arc<dyn Ledger>,
    pub validator: TokenValidator,
    pub limiter: Arc<RateLimiter>,
    /// Lifetime of newly issued tokens
    pub token_ttl: TimeDelta,
}
