//! Business logic services.
//!
//! Services contain core business logic separated from HTTP handlers:
//! credential verification and token issuance, and the atomic transfer
//! protocol over the ledger port.

pub mod auth_service;
pub mod transfer_service;
