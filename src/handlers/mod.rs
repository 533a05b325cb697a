//! HTTP request handlers (route handlers).
//!
//! Each handler is an async function that:
//! 1. Receives HTTP request data (JSON body, headers, URL params)
//! 2. Performs business logic (store access, validation)
//! 3. Returns HTTP response (JSON, status code)

/// Account management and transfer endpoints
pub mod accounts;
/// Registration, login and token validation endpoints
pub mod auth;
/// Liveness probe
pub mod health;
