//! In-memory store adapters.
//!
//! These back the running service and the test suite. State lives for the
//! process lifetime only; durability is explicitly out of scope for the
//! ledger protocol, which is specified against the trait, not a backend.
//!
//! # Locking discipline
//!
//! Every account row sits behind its own async mutex inside a shared map.
//! `apply_atomic` acquires the involved rows in ascending-id order, a fixed
//! global order, so two transfers moving money in opposite directions
//! between the same pair can never deadlock. Debits are re-checked after the
//! locks are held; the check made earlier by the engine is only advisory.
//! All guards are released together after every leg has been applied, which
//! is what keeps half-applied transfers invisible to readers.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use crate::models::{account::Account, user::User};
use crate::store::{AccountMutation, CredentialStore, Ledger, StoreError};

/// In-memory credential store keyed by username.
#[derive(Default)]
pub struct MemoryUserStore {
    users: RwLock<HashMap<String, User>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CredentialStore for MemoryUserStore {
    async fn find_user(&self, username: &str) -> Result<Option<User>, StoreError> {
        Ok(self.users.read().await.get(username).cloned())
    }

    async fn insert_user(&self, user: User) -> Result<(), StoreError> {
        let mut users = self.users.write().await;
        if users.contains_key(&user.username) {
            return Err(StoreError::DuplicateUsername);
        }
        users.insert(user.username.clone(), user);
        Ok(())
    }
}

/// In-memory ledger with one mutex per account row.
#[derive(Default)]
pub struct MemoryLedger {
    accounts: RwLock<HashMap<Uuid, Arc<Mutex<Account>>>>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clone the row handles for `ids`, failing on the first unknown id.
    async fn handles(&self, ids: &[Uuid]) -> Result<Vec<(Uuid, Arc<Mutex<Account>>)>, StoreError> {
        let accounts = self.accounts.read().await;
        ids.iter()
            .map(|id| {
                accounts
                    .get(id)
                    .cloned()
                    .map(|h| (*id, h))
                    .ok_or(StoreError::AccountNotFound(*id))
            })
            .collect()
    }
}

#[async_trait]
impl Ledger for MemoryLedger {
    async fn get_account(&self, id: Uuid) -> Result<Option<Account>, StoreError> {
        let handle = self.accounts.read().await.get(&id).cloned();
        match handle {
            // Locking the row keeps reads ordered with in-flight transfers
            Some(handle) => Ok(Some(handle.lock().await.clone())),
            None => Ok(None),
        }
    }

    async fn insert_account(&self, account: Account) -> Result<(), StoreError> {
        self.accounts
            .write()
            .await
            .insert(account.id, Arc::new(Mutex::new(account)));
        Ok(())
    }

    async fn list_accounts(&self) -> Result<Vec<Account>, StoreError> {
        let handles: Vec<Arc<Mutex<Account>>> =
            self.accounts.read().await.values().cloned().collect();

        let mut accounts = Vec::with_capacity(handles.len());
        for handle in handles {
            accounts.push(handle.lock().await.clone());
        }
        // Newest first
        accounts.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
        Ok(accounts)
    }

    async fn apply_atomic(
        &self,
        mutations: &[AccountMutation],
    ) -> Result<Vec<Account>, StoreError> {
        // Fixed global lock order: ascending account id
        let mut ids: Vec<Uuid> = mutations.iter().map(AccountMutation::account_id).collect();
        ids.sort();
        ids.dedup();

        let handles = self.handles(&ids).await?;
        let mut guards = Vec::with_capacity(handles.len());
        for (id, handle) in &handles {
            guards.push((*id, handle.lock().await));
        }

        // Net effect per account, so the feasibility check covers mutation
        // sets with several legs against the same row
        let mut deltas: HashMap<Uuid, i64> = HashMap::new();
        for mutation in mutations {
            *deltas.entry(mutation.account_id()).or_insert(0) += mutation.delta_cents();
        }

        // Check every row before touching any
        for (id, guard) in &guards {
            let delta = deltas.get(id).copied().unwrap_or(0);
            if guard.balance_cents + delta < 0 {
                return Err(StoreError::InsufficientBalance(*id));
            }
        }

        let now = Utc::now();
        for (id, guard) in &mut guards {
            let delta = deltas.get(id).copied().unwrap_or(0);
            guard.balance_cents += delta;
            guard.updated_at = now;
        }

        let snapshots = mutations
            .iter()
            .map(|m| {
                let id = m.account_id();
                guards
                    .iter()
                    .find(|(gid, _)| *gid == id)
                    .map(|(_, guard)| Account::clone(guard))
                    // Every mutation id is in `guards` by construction
                    .expect("locked account for mutation")
            })
            .collect();

        // Guards drop here, releasing every row at once
        Ok(snapshots)
    }
}
