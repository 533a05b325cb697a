//! Data models representing persisted entities and API types.

/// Bank account model
pub mod account;
/// Registered user model
pub mod user;
