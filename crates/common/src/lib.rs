//! Shared identifier types for the checkout system.

pub mod types;

pub use types::{LoyaltyAccountId, PurchaseId, StoreId};
