//! Storage ports for identities and account balances.
//!
//! The rest of the system only ever talks to these traits. The engine owns
//! the correctness of the transfer protocol; a backend owns durability and
//! the all-or-nothing application of a mutation set. The bundled
//! implementation is in-memory (see [`memory`]); a relational or
//! log-structured backend can be swapped in behind the same traits.

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::{account::Account, user::User};

/// In-memory adapter implementations
pub mod memory;

/// Storage-layer failures.
///
/// `Contention` is the only transient variant; callers may retry it a
/// bounded number of times before giving up.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// A user with this username already exists
    #[error("Username already exists")]
    DuplicateUsername,

    /// A mutation referenced an account the ledger does not hold
    #[error("Account not found: {0}")]
    AccountNotFound(Uuid),

    /// Applying a debit would take this account below zero
    #[error("Insufficient balance on account {0}")]
    InsufficientBalance(Uuid),

    /// Transient conflict with a concurrent writer; retryable
    #[error("Transient storage contention")]
    Contention,

    /// Non-transient backend failure
    #[error("Storage backend failure: {0}")]
    Backend(String),
}

/// One leg of an atomic balance mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountMutation {
    /// Decrease a balance; refused if it would go negative
    Debit { account_id: Uuid, amount_cents: i64 },
    /// Increase a balance
    Credit { account_id: Uuid, amount_cents: i64 },
}

impl AccountMutation {
    pub fn account_id(&self) -> Uuid {
        match self {
            AccountMutation::Debit { account_id, .. }
            | AccountMutation::Credit { account_id, .. } => *account_id,
        }
    }

    /// Signed balance delta of this leg.
    pub fn delta_cents(&self) -> i64 {
        match self {
            AccountMutation::Debit { amount_cents, .. } => -amount_cents,
            AccountMutation::Credit { amount_cents, .. } => *amount_cents,
        }
    }
}

/// Lookup and persistence of registered identities.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn find_user(&self, username: &str) -> Result<Option<User>, StoreError>;

    /// Persist a new identity. Fails with [`StoreError::DuplicateUsername`]
    /// if the name is taken; the existence check and the insert happen under
    /// one lock, so a retried registration can never overwrite.
    async fn insert_user(&self, user: User) -> Result<(), StoreError>;
}

/// Lookup and persistence of account balance records.
#[async_trait]
pub trait Ledger: Send + Sync {
    async fn get_account(&self, id: Uuid) -> Result<Option<Account>, StoreError>;

    async fn insert_account(&self, account: Account) -> Result<(), StoreError>;

    /// All accounts, newest first.
    async fn list_accounts(&self) -> Result<Vec<Account>, StoreError>;

    /// Apply a mutation set as one unit: either every leg lands or none
    /// does, and no concurrent reader observes an intermediate state.
    ///
    /// Returns the post-mutation snapshot for each mutation's account, in
    /// mutation order.
    async fn apply_atomic(
        &self,
        mutations: &[AccountMutation],
    ) -> Result<Vec<Account>, StoreError>;
}
