//! Bank portal backend.
//!
//! A REST API combining an authentication service (registration, login,
//! token validation for an API gateway) and an account service (accounts
//! and atomic transfers), sharing one signed-token trust protocol.
//!
//! # Architecture
//!
//! - **Web Framework**: Axum (async HTTP server)
//! - **Authentication**: HMAC-SHA256 signed session tokens, stateless
//! - **Passwords**: argon2id hashes, never stored or returned in the clear
//! - **Storage**: port traits (`store::CredentialStore`, `store::Ledger`)
//!   with in-memory adapters; the transfer engine owns atomicity via
//!   per-account ordered locking
//! - **Format**: JSON requests/responses

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod password;
pub mod rate_limit;
pub mod router;
pub mod services;
pub mod state;
pub mod store;
pub mod token;
