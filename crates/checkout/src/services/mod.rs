//! Collaborator traits and in-memory implementations for checkout steps.

pub mod card;
pub mod discount;

pub use card::{CardChargeGateway, ChargeReceipt, GatewayError, InMemoryCardGateway};
pub use discount::{DiscountLookupError, InMemoryDiscountProvider, StoreDiscountProvider};
