//! Domain layer for the coffee-shop checkout.
//!
//! This crate provides the pure business types:
//! - Money with currency and store discounts
//! - Catalog products as attached to a purchase
//! - CoffeeBux loyalty accounts (stamp accrual and free-drink redemption)
//! - The purchase aggregate with validation and enrichment

pub mod loyalty;
pub mod money;
pub mod product;
pub mod purchase;

pub use loyalty::{LoyaltyAccount, LoyaltyError, STAMPS_PER_FREE_DRINK, StampOutcome};
pub use money::{Currency, DiscountPercent, Money, MoneyError};
pub use product::{Product, ProductId};
pub use purchase::{PaymentMeans, Purchase, PurchaseError, ValidatedPurchase};
