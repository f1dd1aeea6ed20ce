//! Purchase completion for the coffee shop till.
//!
//! A purchase is completed in five steps:
//! 1. Validate the purchase and fix its id, time and total
//! 2. Look up and apply the store discount
//! 3. Dispatch payment by means (card, cash, CoffeeBux)
//! 4. Persist the finalized purchase
//! 5. Stamp the customer's loyalty card
//!
//! Nothing is compensated. A failure after payment is surfaced as
//! [`CheckoutError::PersistenceFailed`] for reconciliation.

pub mod cancel;
pub mod config;
pub mod error;
pub mod ledger;
pub mod service;
pub mod services;
pub mod steps;

pub use cancel::{CancelSignal, Canceller};
pub use config::CheckoutConfig;
pub use error::{CheckoutError, Result};
pub use ledger::{LoyaltyHandle, LoyaltyLedger};
pub use service::PurchaseCompletionService;
pub use services::{
    CardChargeGateway, ChargeReceipt, DiscountLookupError, GatewayError, InMemoryCardGateway,
    InMemoryDiscountProvider, StoreDiscountProvider,
};
pub use steps::CheckoutStage;
