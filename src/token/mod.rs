//! Signed session tokens.
//!
//! Tokens are self-contained: validity is purely a function of the signature
//! against the trusted key set and the expiry claim against the caller's
//! clock. There is no server-side session or revocation store.

/// Claim encoding and HMAC signing
pub mod codec;
/// Verdict over a token against the trusted key set
pub mod validator;
