//! Purchase aggregate and related types.

mod aggregate;
mod means;

pub use aggregate::{Purchase, ValidatedPurchase};
pub use means::PaymentMeans;

use thiserror::Error;

use crate::money::{Currency, Money};

/// Errors that can occur while validating a purchase.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PurchaseError {
    /// The purchase has no products.
    #[error("Purchase must consist of at least one product")]
    EmptyPurchase,

    /// The products add up to nothing.
    #[error("Likely mistake; purchase should never be 0. Please validate")]
    ZeroTotal,

    /// A product carries a negative price.
    #[error("Product {product_id} has a negative price: {price}")]
    NegativePrice { product_id: String, price: Money },

    /// The products add up to more than an amount can hold.
    #[error("Purchase total is too large")]
    TotalOverflow,

    /// A product is priced in a currency other than the purchase currency.
    #[error("Product {product_id} is priced in {found}, expected {expected}")]
    CurrencyMismatch {
        product_id: String,
        expected: Currency,
        found: Currency,
    },

    /// Payment means text from outside did not name a known means.
    #[error("Unknown payment means: {0}")]
    UnknownPaymentMeans(String),
}
