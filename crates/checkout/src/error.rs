//! Checkout error types.

use common::PurchaseId;
use domain::{Currency, LoyaltyError, Money, PurchaseError};
use purchase_store::RepositoryError;
use thiserror::Error;

use crate::services::{DiscountLookupError, GatewayError};
use crate::steps::CheckoutStage;

/// Errors that can end a purchase completion.
///
/// Every variant is terminal for the call; nothing is retried here.
#[derive(Debug, Error)]
pub enum CheckoutError {
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

    /// A product is priced in a different currency than the checkout.
    #[error("Product {product_id} is priced in {found}, expected {expected}")]
    CurrencyMismatch {
        product_id: String,
        expected: Currency,
        found: Currency,
    },

    /// Payment means text did not name a known means.
    #[error("Unknown payment type: {0}")]
    UnknownPaymentMeans(String),

    /// The discount provider failed for a reason other than "no discount".
    #[error("Failed to get discount: {0}")]
    DiscountLookupFailed(#[source] DiscountLookupError),

    /// A card purchase arrived without a card token.
    #[error("Card payment requires a card token")]
    MissingCardToken,

    /// The card gateway refused or failed the charge.
    #[error("Card charge failed, cancelling purchase: {0}")]
    ChargeFailed(#[source] GatewayError),

    /// A loyalty-currency purchase arrived without a loyalty account.
    #[error("Loyalty currency payment requires a loyalty account")]
    LoyaltyAccountRequired,

    /// Redeeming CoffeeBux failed.
    #[error("Failed to charge loyalty card: {0}")]
    LoyaltyChargeFailed(#[source] LoyaltyError),

    /// Payment was taken but the purchase could not be stored.
    ///
    /// No durable record exists for `purchase_id`; it must be reconciled.
    #[error("Failed to store purchase {purchase_id} after payment: {source}")]
    PersistenceFailed {
        purchase_id: PurchaseId,
        #[source]
        source: RepositoryError,
    },

    /// The caller gave up before payment was dispatched.
    #[error("Checkout cancelled before {stage}")]
    Cancelled { stage: CheckoutStage },
}

impl CheckoutError {
    /// Returns the workflow step that produced the error.
    pub fn stage(&self) -> CheckoutStage {
        match self {
            CheckoutError::EmptyPurchase
            | CheckoutError::ZeroTotal
            | CheckoutError::NegativePrice { .. }
            | CheckoutError::TotalOverflow
            | CheckoutError::CurrencyMismatch { .. }
            | CheckoutError::UnknownPaymentMeans(_) => CheckoutStage::Validate,
            CheckoutError::DiscountLookupFailed(_) => CheckoutStage::Discount,
            CheckoutError::MissingCardToken
            | CheckoutError::ChargeFailed(_)
            | CheckoutError::LoyaltyAccountRequired
            | CheckoutError::LoyaltyChargeFailed(_) => CheckoutStage::Charge,
            CheckoutError::PersistenceFailed { .. } => CheckoutStage::Persist,
            CheckoutError::Cancelled { stage } => *stage,
        }
    }

    /// Returns true if payment had already been taken when the error occurred.
    pub fn is_post_charge(&self) -> bool {
        matches!(self, CheckoutError::PersistenceFailed { .. })
    }
}

impl From<PurchaseError> for CheckoutError {
    fn from(e: PurchaseError) -> Self {
        match e {
            PurchaseError::EmptyPurchase => CheckoutError::EmptyPurchase,
            PurchaseError::ZeroTotal => CheckoutError::ZeroTotal,
            PurchaseError::NegativePrice { product_id, price } => {
                CheckoutError::NegativePrice { product_id, price }
            }
            PurchaseError::TotalOverflow => CheckoutError::TotalOverflow,
            PurchaseError::CurrencyMismatch {
                product_id,
                expected,
                found,
            } => CheckoutError::CurrencyMismatch {
                product_id,
                expected,
                found,
            },
            PurchaseError::UnknownPaymentMeans(means) => CheckoutError::UnknownPaymentMeans(means),
        }
    }
}

/// Convenience type alias for checkout results.
pub type Result<T> = std::result::Result<T, CheckoutError>;
