//! Loyalty accounts behind per-account locks.

use std::collections::HashMap;
use std::sync::Arc;

use common::LoyaltyAccountId;
use domain::{LoyaltyAccount, LoyaltyError};
use tokio::sync::{Mutex, RwLock};

/// Shared handle to one loyalty account.
///
/// Every read-modify-write of the account goes through its mutex, so two
/// checkouts against the same account run one after the other.
pub type LoyaltyHandle = Arc<Mutex<LoyaltyAccount>>;

/// Registry of loyalty accounts keyed by account id.
///
/// The registry lock only guards the map; account state is guarded by the
/// account's own mutex, so checkouts for different accounts never contend.
#[derive(Debug, Clone, Default)]
pub struct LoyaltyLedger {
    accounts: Arc<RwLock<HashMap<LoyaltyAccountId, LoyaltyHandle>>>,
}

impl LoyaltyLedger {
    /// Creates an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enrolls a new customer and returns the account id.
    pub async fn enroll(&self) -> LoyaltyAccountId {
        let id = LoyaltyAccountId::new();
        self.insert(LoyaltyAccount::enroll(id)).await;
        tracing::info!(account_id = %id, "loyalty account enrolled");
        id
    }

    /// Adds or replaces an account.
    pub async fn insert(&self, account: LoyaltyAccount) -> LoyaltyHandle {
        let handle = Arc::new(Mutex::new(account.clone()));
        self.accounts
            .write()
            .await
            .insert(account.id(), handle.clone());
        handle
    }

    /// Restores an account from stored values.
    pub async fn restore(
        &self,
        id: LoyaltyAccountId,
        free_drinks_available: u32,
        remaining_until_free_drink: u32,
    ) -> Result<LoyaltyHandle, LoyaltyError> {
        let account =
            LoyaltyAccount::restore(id, free_drinks_available, remaining_until_free_drink)?;
        Ok(self.insert(account).await)
    }

    /// Returns the handle for an account.
    pub async fn handle(&self, id: LoyaltyAccountId) -> Option<LoyaltyHandle> {
        self.accounts.read().await.get(&id).cloned()
    }

    /// Returns a copy of the account's current state.
    pub async fn snapshot(&self, id: LoyaltyAccountId) -> Option<LoyaltyAccount> {
        let handle = self.handle(id).await?;
        let account = handle.lock().await;
        Some(account.clone())
    }

    /// Returns the number of enrolled accounts.
    pub async fn len(&self) -> usize {
        self.accounts.read().await.len()
    }

    /// Returns true if no account is enrolled.
    pub async fn is_empty(&self) -> bool {
        self.accounts.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::STAMPS_PER_FREE_DRINK;

    #[tokio::test]
    async fn test_enroll_and_snapshot() {
        let ledger = LoyaltyLedger::new();
        let id = ledger.enroll().await;

        let account = ledger.snapshot(id).await.unwrap();
        assert_eq!(account.id(), id);
        assert_eq!(account.free_drinks_available(), 0);
        assert_eq!(account.remaining_until_free_drink(), STAMPS_PER_FREE_DRINK);
        assert_eq!(ledger.len().await, 1);
    }

    #[tokio::test]
    async fn test_unknown_account() {
        let ledger = LoyaltyLedger::new();
        assert!(ledger.is_empty().await);
        assert!(ledger.handle(LoyaltyAccountId::new()).await.is_none());
        assert!(ledger.snapshot(LoyaltyAccountId::new()).await.is_none());
    }

    #[tokio::test]
    async fn test_handles_share_state() {
        let ledger = LoyaltyLedger::new();
        let id = LoyaltyAccountId::new();
        ledger.restore(id, 0, 5).await.unwrap();

        let first = ledger.handle(id).await.unwrap();
        let second = ledger.handle(id).await.unwrap();
        first.lock().await.add_stamp();

        assert_eq!(second.lock().await.remaining_until_free_drink(), 4);
    }

    #[tokio::test]
    async fn test_restore_validates_counter() {
        let ledger = LoyaltyLedger::new();
        let result = ledger.restore(LoyaltyAccountId::new(), 0, 0).await;
        assert!(matches!(result, Err(LoyaltyError::InvalidRemaining { remaining: 0 })));
        assert!(ledger.is_empty().await);
    }

    #[tokio::test]
    async fn test_concurrent_stamps_are_not_lost() {
        let ledger = LoyaltyLedger::new();
        let id = ledger.enroll().await;

        let mut tasks = Vec::new();
        for _ in 0..25 {
            let handle = ledger.handle(id).await.unwrap();
            tasks.push(tokio::spawn(async move {
                handle.lock().await.add_stamp();
            }));
        }
        for task in tasks {
            task.await.unwrap();
        }

        let account = ledger.snapshot(id).await.unwrap();
        assert_eq!(account.free_drinks_available(), 2);
        assert_eq!(account.remaining_until_free_drink(), 5);
    }
}
