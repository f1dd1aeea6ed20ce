//! CoffeeBux loyalty accounts.

mod account;

pub use account::{LoyaltyAccount, STAMPS_PER_FREE_DRINK, StampOutcome};

use thiserror::Error;

/// Errors that can occur during loyalty operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoyaltyError {
    /// Nothing was offered for redemption.
    #[error("Nothing to buy")]
    EmptyPurchase,

    /// The account holds fewer free-drink credits than products requested.
    #[error("Not enough CoffeeBux to cover entire purchase: have {available}, need {required}")]
    InsufficientBalance { available: u32, required: u32 },

    /// A restored account carried a stamp counter outside `1..=10`.
    #[error("Invalid stamp counter: {remaining} (must be between 1 and 10)")]
    InvalidRemaining { remaining: u32 },
}
