//! Account management HTTP handlers.
//!
//! This module implements the account-related API endpoints:
//! - POST /api/accounts - Create new account
//! - GET /api/accounts - List all accounts
//! - POST /api/accounts/transfer - Move money between accounts
//!
//! All of these sit behind the bearer token middleware; the authenticated
//! caller arrives as an `AuthContext` extension.

use axum::{Extension, Json, extract::State, http::StatusCode};
use chrono::Utc;

use crate::error::AppError;
use crate::middleware::auth::AuthContext;
use crate::models::account::{Account, CreateAccountRequest, TransferReceipt, TransferRequest};
use crate::services::transfer_service;
use crate::state::AppState;

/// Create a new account.
///
/// # Request Body
///
/// ```json
/// {
///   "owner": "Alice",
///   "initial_balance_cents": 100000
/// }
/// ```
///
/// # Response
///
/// - **Success (201 Created)**: The created account with its assigned id
/// - **Error (400)**: Blank owner or negative opening balance
pub async fn create_account(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(request): Json<CreateAccountRequest>,
) -> Result<(StatusCode, Json<Account>), AppError> {
    if request.owner.trim().is_empty() {
        return Err(AppError::InvalidRequest(
            "Owner must not be empty".to_string(),
        ));
    }
    if request.initial_balance_cents < 0 {
        return Err(AppError::InvalidRequest(
            "Opening balance must not be negative".to_string(),
        ));
    }

    let account = Account::new(
        request.owner.trim().to_string(),
        request.initial_balance_cents,
        Utc::now(),
    );
    state.ledger.insert_account(account.clone()).await?;

    tracing::info!(
        user = %auth.username,
        account_id = %account.id,
        owner = %account.owner,
        "account created"
    );
    Ok((StatusCode::CREATED, Json(account)))
}

/// List all accounts, newest first.
pub async fn list_accounts(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<Vec<Account>>, AppError> {
    let accounts = state.ledger.list_accounts().await?;
    tracing::debug!(user = %auth.username, count = accounts.len(), "accounts listed");
    Ok(Json(accounts))
}

/// Transfer money between accounts.
///
/// # Request Body
///
/// ```json
/// {
///   "from_account_id": "550e8400-...",
///   "to_account_id": "660e8400-...",
///   "amount_cents": 20000
/// }
/// ```
///
/// # Atomicity
///
/// Both balances move as one unit; a rejected transfer leaves both accounts
/// exactly as they were.
pub async fn transfer(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(request): Json<TransferRequest>,
) -> Result<Json<TransferReceipt>, AppError> {
    tracing::info!(
        user = %auth.username,
        from = %request.from_account_id,
        to = %request.to_account_id,
        amount_cents = request.amount_cents,
        "transfer requested"
    );

    let receipt = transfer_service::execute_transfer(
        state.ledger.as_ref(),
        request.from_account_id,
        request.to_account_id,
        request.amount_cents,
        Utc::now(),
    )
    .await?;

    Ok(Json(receipt))
}
