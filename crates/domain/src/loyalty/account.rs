//! Loyalty account accrual and redemption.

use common::LoyaltyAccountId;
use serde::{Deserialize, Serialize};

use super::LoyaltyError;
use crate::product::Product;

/// Number of completed purchases that earn one free-drink credit.
pub const STAMPS_PER_FREE_DRINK: u32 = 10;

/// What a single stamp did to the account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StampOutcome {
    /// The card advanced; `remaining` purchases until the next free drink.
    Stamped { remaining: u32 },

    /// The card was completed and reset; `credits` is the new balance.
    FreeDrinkEarned { credits: u32 },
}

/// A customer's CoffeeBux card.
///
/// The state is the pair `(credits, remaining)`:
/// ```text
/// remaining: 10 ─► 9 ─► ... ─► 1 ─┐
///            ▲                    │ add_stamp
///            └────── credits += 1 ┘
/// ```
/// `remaining` always stays in `1..=10` and `credits` never goes negative.
/// The account does not synchronize itself; callers share it behind a lock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoyaltyAccount {
    id: LoyaltyAccountId,
    free_drinks_available: u32,
    remaining_until_free_drink: u32,
}

impl LoyaltyAccount {
    /// Creates a freshly enrolled account with an empty stamp card.
    pub fn enroll(id: LoyaltyAccountId) -> Self {
        Self {
            id,
            free_drinks_available: 0,
            remaining_until_free_drink: STAMPS_PER_FREE_DRINK,
        }
    }

    /// Rebuilds an account from stored values.
    pub fn restore(
        id: LoyaltyAccountId,
        free_drinks_available: u32,
        remaining_until_free_drink: u32,
    ) -> Result<Self, LoyaltyError> {
        if !(1..=STAMPS_PER_FREE_DRINK).contains(&remaining_until_free_drink) {
            return Err(LoyaltyError::InvalidRemaining {
                remaining: remaining_until_free_drink,
            });
        }

        Ok(Self {
            id,
            free_drinks_available,
            remaining_until_free_drink,
        })
    }

    pub fn id(&self) -> LoyaltyAccountId {
        self.id
    }

    /// Returns the redeemable free-drink credits.
    pub fn free_drinks_available(&self) -> u32 {
        self.free_drinks_available
    }

    /// Returns the purchases left until the next free-drink credit.
    pub fn remaining_until_free_drink(&self) -> u32 {
        self.remaining_until_free_drink
    }

    /// Records one completed purchase.
    pub fn add_stamp(&mut self) -> StampOutcome {
        if self.remaining_until_free_drink == 1 {
            self.remaining_until_free_drink = STAMPS_PER_FREE_DRINK;
            self.free_drinks_available += 1;
            StampOutcome::FreeDrinkEarned {
                credits: self.free_drinks_available,
            }
        } else {
            self.remaining_until_free_drink -= 1;
            StampOutcome::Stamped {
                remaining: self.remaining_until_free_drink,
            }
        }
    }

    /// Redeems one credit per product, regardless of price.
    ///
    /// On failure the balance is left untouched.
    pub fn pay(&mut self, products: &[Product]) -> Result<(), LoyaltyError> {
        if products.is_empty() {
            return Err(LoyaltyError::EmptyPurchase);
        }

        let required = u32::try_from(products.len()).unwrap_or(u32::MAX);
        if self.free_drinks_available < required {
            return Err(LoyaltyError::InsufficientBalance {
                available: self.free_drinks_available,
                required,
            });
        }

        self.free_drinks_available -= required;
        Ok(())
    }
}
