use async_trait::async_trait;
use domain::ValidatedPurchase;

use crate::{PurchaseId, Result, StoreId};

/// What a call to [`PurchaseRepository::store`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOutcome {
    /// The purchase was written for the first time.
    Inserted,

    /// A purchase with the same id already existed; nothing was written.
    AlreadyStored,
}

/// Core trait for purchase repositories.
///
/// Purchases are immutable once stored. Writes are idempotent on the
/// purchase id: storing the same id twice never creates a second record.
/// All implementations must be thread-safe (Send + Sync).
#[async_trait]
pub trait PurchaseRepository: Send + Sync {
    /// Durably stores a finalized purchase.
    async fn store(&self, purchase: &ValidatedPurchase) -> Result<StoreOutcome>;

    /// Loads a purchase by id.
    async fn get(&self, id: PurchaseId) -> Result<Option<ValidatedPurchase>>;

    /// Lists purchases made at a store, oldest first.
    async fn list_for_store(&self, store_id: StoreId) -> Result<Vec<ValidatedPurchase>>;

    /// Returns the number of stored purchases.
    async fn count(&self) -> Result<usize>;
}
