//! HTTP middleware components.
//!
//! Middleware are functions that run before route handlers. They can:
//! - Authenticate requests
//! - Throttle clients
//! - Short-circuit requests (reject unauthorized or over-quota)

/// Bearer token authentication middleware
pub mod auth;
/// Request quota enforcement for the auth endpoints
pub mod rate_limit;
