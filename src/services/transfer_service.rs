//! Transfer engine - the atomic debit/credit state machine.
//!
//! A transfer runs to exactly one terminal outcome: applied, or rejected
//! with a typed reason. Nothing in between is ever observable.
//!
//! # Validation order
//!
//! The checks run in a fixed order so error reporting is predictable:
//!
//! 1. amount must be positive
//! 2. sender and receiver must differ
//! 3. sender must exist
//! 4. receiver must exist
//! 5. sender balance must cover the amount (equality allowed, leaving zero)
//!
//! # Atomicity
//!
//! Application is a single `apply_atomic` call with both legs; the ledger
//! either lands both or neither. The balance check above is advisory (the
//! ledger re-checks under its row locks), so a concurrent debit between
//! check and apply surfaces as a ledger-level rejection, which is mapped
//! back to the same typed error. Transient contention is retried a bounded
//! number of times before surfacing as an internal error.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::account::TransferReceipt;
use crate::store::{AccountMutation, Ledger, StoreError};

/// Bounded retries for transient ledger contention.
const MAX_APPLY_ATTEMPTS: u32 = 3;

/// Execute an atomic transfer between two accounts.
///
/// # Errors
///
/// - `InvalidRequest`: non-positive amount, or sender equals receiver
/// - `SenderNotFound` / `ReceiverNotFound`: unknown account, reported in
///   lookup order
/// - `InsufficientBalance`: sender cannot cover the amount
/// - `Store`: contention retries exhausted or backend failure
pub async fn execute_transfer(
    ledger: &dyn Ledger,
    from_account_id: Uuid,
    to_account_id: Uuid,
    amount_cents: i64,
    now: DateTime<Utc>,
) -> Result<TransferReceipt, AppError> {
    if amount_cents <= 0 {
        return Err(AppError::InvalidRequest(
            "Amount must be positive".to_string(),
        ));
    }

    // Policy decision: self-transfers are rejected outright rather than
    // applied as a no-op, keeping the pair-locking path free of the
    // degenerate single-account case.
    if from_account_id == to_account_id {
        return Err(AppError::InvalidRequest(
            "Cannot transfer to same account".to_string(),
        ));
    }

    let sender = ledger
        .get_account(from_account_id)
        .await?
        .ok_or(AppError::SenderNotFound)?;

    ledger
        .get_account(to_account_id)
        .await?
        .ok_or(AppError::ReceiverNotFound)?;

    // Boundary: balance == amount is allowed and leaves a zero balance
    if sender.balance_cents < amount_cents {
        return Err(AppError::InsufficientBalance);
    }

    let mutations = [
        AccountMutation::Debit {
            account_id: from_account_id,
            amount_cents,
        },
        AccountMutation::Credit {
            account_id: to_account_id,
            amount_cents,
        },
    ];

    let mut attempt = 1;
    let snapshots = loop {
        match ledger.apply_atomic(&mutations).await {
            Ok(snapshots) => break snapshots,
            Err(StoreError::Contention) if attempt < MAX_APPLY_ATTEMPTS => {
                tracing::warn!(
                    %from_account_id,
                    %to_account_id,
                    attempt,
                    "ledger contention, retrying transfer"
                );
                attempt += 1;
            }
            // Races between the advisory checks and application map back to
            // the same typed rejections
            Err(StoreError::InsufficientBalance(_)) => {
                return Err(AppError::InsufficientBalance);
            }
            Err(StoreError::AccountNotFound(id)) if id == from_account_id => {
                return Err(AppError::SenderNotFound);
            }
            Err(StoreError::AccountNotFound(_)) => return Err(AppError::ReceiverNotFound),
            Err(err) => return Err(AppError::Store(err)),
        }
    };

    tracing::info!(
        %from_account_id,
        %to_account_id,
        amount_cents,
        "transfer applied"
    );

    Ok(TransferReceipt {
        status: "applied".to_string(),
        from_account_id,
        to_account_id,
        amount_cents,
        from_balance_cents: snapshots[0].balance_cents,
        to_balance_cents: snapshots[1].balance_cents,
        applied_at: now,
    })
}
