//! Store discount provider trait and in-memory implementation.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use common::StoreId;
use domain::DiscountPercent;
use thiserror::Error;

/// Outcomes of a discount lookup other than a percentage.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DiscountLookupError {
    /// The store runs no discount. Not a failure for the checkout.
    #[error("No discount available")]
    NoDiscount,

    /// The store is not known to the provider.
    #[error("Unknown store: {0}")]
    UnknownStore(StoreId),

    /// The provider could not be reached.
    #[error("Discount provider unavailable: {0}")]
    Unavailable(String),

    /// The provider did not answer in time.
    #[error("Discount provider timed out after {0:?}")]
    Timeout(Duration),
}

/// Trait for store-specific discount lookups.
#[async_trait]
pub trait StoreDiscountProvider: Send + Sync {
    /// Returns the discount currently applicable at `store_id`.
    async fn discount_for(&self, store_id: StoreId) -> Result<DiscountPercent, DiscountLookupError>;
}

#[derive(Debug, Default)]
struct InMemoryDiscountState {
    discounts: HashMap<StoreId, DiscountPercent>,
    lookups: usize,
    fail_on_lookup: bool,
    delay: Option<Duration>,
}

/// In-memory discount provider for testing.
///
/// Stores without a configured discount report [`DiscountLookupError::NoDiscount`].
#[derive(Debug, Clone, Default)]
pub struct InMemoryDiscountProvider {
    state: Arc<Mutex<InMemoryDiscountState>>,
}

impl InMemoryDiscountProvider {
    /// Creates a new in-memory discount provider.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the discount for a store.
    pub fn set_discount(&self, store_id: StoreId, discount: DiscountPercent) {
        self.lock().discounts.insert(store_id, discount);
    }

    /// Configures the provider to fail every lookup.
    pub fn set_fail_on_lookup(&self, fail: bool) {
        self.lock().fail_on_lookup = fail;
    }

    /// Makes every lookup wait before answering.
    pub fn set_delay(&self, delay: Option<Duration>) {
        self.lock().delay = delay;
    }

    /// Returns how many lookups were made.
    pub fn lookup_count(&self) -> usize {
        self.lock().lookups
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, InMemoryDiscountState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl StoreDiscountProvider for InMemoryDiscountProvider {
    async fn discount_for(&self, store_id: StoreId) -> Result<DiscountPercent, DiscountLookupError> {
        let delay = {
            let mut state = self.lock();
            state.lookups += 1;
            state.delay
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let state = self.lock();
        if state.fail_on_lookup {
            return Err(DiscountLookupError::Unavailable(
                "discount service down".to_string(),
            ));
        }

        state
            .discounts
            .get(&store_id)
            .copied()
            .ok_or(DiscountLookupError::NoDiscount)
    }
}
