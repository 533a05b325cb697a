//! Account data models and API request/response types.
//!
//! This module defines:
//! - `Account`: Persisted balance record
//! - `CreateAccountRequest`: Request body for creating accounts
//! - `TransferRequest` / `TransferReceipt`: Transfer API types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Represents a bank account balance record.
///
/// # Balance Storage
///
/// Balances are stored as `i64` cents to avoid floating-point precision
/// issues. For example, 10.50 is stored as 1050 cents.
///
/// The balance is never negative at any observable point; the ledger refuses
/// any mutation set that would take it below zero.
#[derive(Debug, Clone, Serialize)]
pub struct Account {
    /// Unique identifier, assigned at creation and immutable
    pub id: Uuid,

    /// Display name of the account holder
    pub owner: String,

    /// Current balance in cents (not whole currency units)
    pub balance_cents: i64,

    /// Timestamp when account was created
    pub created_at: DateTime<Utc>,

    /// Timestamp of last balance update
    pub updated_at: DateTime<Utc>,
}

impl Account {
    /// Build a fresh account with both timestamps set to `now`.
    pub fn new(owner: String, balance_cents: i64, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner,
            balance_cents,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Request body for creating a new account.
///
/// # JSON Example
///
/// ```json
/// {
///   "owner": "Alice",
///   "initial_balance_cents": 100000
/// }
/// ```
#[derive(Debug, Deserialize)]
pub struct CreateAccountRequest {
    /// Name of the account holder
    pub owner: String,

    /// Opening balance in cents (defaults to 0, must not be negative)
    #[serde(default)]
    pub initial_balance_cents: i64,
}

/// Request to transfer money between two accounts.
///
/// # JSON Example
///
/// ```json
/// {
///   "from_account_id": "550e8400-e29b-41d4-a716-446655440000",
///   "to_account_id": "660e8400-e29b-41d4-a716-446655440001",
///   "amount_cents": 20000
/// }
/// ```
///
/// # Atomicity Guarantee
///
/// Both accounts are updated as one unit. Either both legs apply or neither
/// does; no reader ever observes the debit without the credit.
#[derive(Debug, Deserialize)]
pub struct TransferRequest {
    /// Account to transfer from (will decrease)
    pub from_account_id: Uuid,

    /// Account to transfer to (will increase)
    pub to_account_id: Uuid,

    /// Amount to transfer in cents, must be positive
    pub amount_cents: i64,
}

/// Response returned for an applied transfer.
///
/// # JSON Example
///
/// ```json
/// {
///   "status": "applied",
///   "from_account_id": "550e8400-...",
///   "to_account_id": "660e8400-...",
///   "amount_cents": 20000,
///   "from_balance_cents": 80000,
///   "to_balance_cents": 30000,
///   "applied_at": "2025-12-21T16:00:00Z"
/// }
/// ```
#[derive(Debug, Serialize)]
pub struct TransferReceipt {
    pub status: String,
    pub from_account_id: Uuid,
    pub to_account_id: Uuid,
    pub amount_cents: i64,
    pub from_balance_cents: i64,
    pub to_balance_cents: i64,
    pub applied_at: DateTime<Utc>,
}
