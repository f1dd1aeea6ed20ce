//! Payment means.

use serde::{Deserialize, Serialize};

use super::PurchaseError;

/// How a purchase is settled.
///
/// The set is closed. Arbitrary text from outside the process goes through
/// [`str::parse`], which is the only place an unknown means can show up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMeans {
    /// Charged to a tokenized card through the card gateway.
    Card,

    /// Settled physically at the register.
    Cash,

    /// Redeemed against the customer's CoffeeBux balance.
    LoyaltyCurrency,
}

impl PaymentMeans {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMeans::Card => "CARD",
            PaymentMeans::Cash => "CASH",
            PaymentMeans::LoyaltyCurrency => "LOYALTY_CURRENCY",
        }
    }

    /// Returns true if this means needs a card token.
    pub fn requires_card_token(&self) -> bool {
        matches!(self, PaymentMeans::Card)
    }
}

impl std::fmt::Display for PaymentMeans {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PaymentMeans {
    type Err = PurchaseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "CARD" => Ok(PaymentMeans::Card),
            "CASH" => Ok(PaymentMeans::Cash),
            "LOYALTY_CURRENCY" | "COFFEEBUX" => Ok(PaymentMeans::LoyaltyCurrency),
            _ => Err(PurchaseError::UnknownPaymentMeans(s.to_string())),
        }
    }
}
