use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use domain::ValidatedPurchase;
use tokio::sync::RwLock;

use crate::{
    PurchaseId, RepositoryError, Result, StoreId,
    store::{PurchaseRepository, StoreOutcome},
};

/// In-memory purchase repository for testing and local runs.
///
/// Provides the same idempotency guarantees as the PostgreSQL implementation.
#[derive(Clone, Default)]
pub struct InMemoryPurchaseRepository {
    purchases: Arc<RwLock<HashMap<PurchaseId, ValidatedPurchase>>>,
    fail_on_store: Arc<AtomicBool>,
}

impl InMemoryPurchaseRepository {
    /// Creates a new empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the repository to reject writes.
    pub fn set_fail_on_store(&self, fail: bool) {
        self.fail_on_store.store(fail, Ordering::SeqCst);
    }

    /// Clears all stored purchases.
    pub async fn clear(&self) {
        self.purchases.write().await.clear();
    }
}

#[async_trait]
impl PurchaseRepository for InMemoryPurchaseRepository {
    async fn store(&self, purchase: &ValidatedPurchase) -> Result<StoreOutcome> {
        if self.fail_on_store.load(Ordering::SeqCst) {
            return Err(RepositoryError::Unavailable(
                "write rejected by repository".to_string(),
            ));
        }

        let mut purchases = self.purchases.write().await;
        if purchases.contains_key(&purchase.id()) {
            tracing::debug!(purchase_id = %purchase.id(), "purchase already stored");
            return Ok(StoreOutcome::AlreadyStored);
        }

        purchases.insert(purchase.id(), purchase.clone());
        metrics::counter!("purchases_stored_total").increment(1);
        Ok(StoreOutcome::Inserted)
    }

    async fn get(&self, id: PurchaseId) -> Result<Option<ValidatedPurchase>> {
        Ok(self.purchases.read().await.get(&id).cloned())
    }

    async fn list_for_store(&self, store_id: StoreId) -> Result<Vec<ValidatedPurchase>> {
        let purchases = self.purchases.read().await;
        let mut found: Vec<_> = purchases
            .values()
            .filter(|p| p.store_id() == store_id)
            .cloned()
            .collect();
        found.sort_by_key(|p| p.time_of_purchase());
        Ok(found)
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.purchases.read().await.len())
    }
}
