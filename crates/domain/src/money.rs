//! Money value type.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised by money arithmetic.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoneyError {
    /// Two amounts in different currencies were combined.
    #[error("Currency mismatch: cannot combine {left} with {right}")]
    CurrencyMismatch { left: Currency, right: Currency },

    /// A discount outside `[0, 100)` was requested.
    #[error("Invalid discount: {percent}% (must be in 0..100)")]
    InvalidDiscount { percent: u8 },

    /// The result does not fit in 64-bit cents.
    #[error("Amount overflow")]
    Overflow,
}

/// ISO 4217 currency code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    Usd,
    Eur,
    Gbp,
    Cad,
    Aud,
    Jpy,
}

impl Currency {
    /// Returns the three-letter code.
    pub fn code(&self) -> &'static str {
        match self {
            Currency::Usd => "USD",
            Currency::Eur => "EUR",
            Currency::Gbp => "GBP",
            Currency::Cad => "CAD",
            Currency::Aud => "AUD",
            Currency::Jpy => "JPY",
        }
    }
}

impl std::fmt::Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

impl std::str::FromStr for Currency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "USD" => Ok(Currency::Usd),
            "EUR" => Ok(Currency::Eur),
            "GBP" => Ok(Currency::Gbp),
            "CAD" => Ok(Currency::Cad),
            "AUD" => Ok(Currency::Aud),
            "JPY" => Ok(Currency::Jpy),
            other => Err(format!("unsupported currency: {other}")),
        }
    }
}

/// Money amount in the smallest currency unit, tagged with its currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Money {
    /// Amount in cents (e.g., 1000 = $10.00)
    cents: i64,
    currency: Currency,
}

impl Money {
    /// Creates a USD amount from cents.
    pub fn from_cents(cents: i64) -> Self {
        Self::new(cents, Currency::Usd)
    }

    /// Creates an amount in the given currency.
    pub fn new(cents: i64, currency: Currency) -> Self {
        Self { cents, currency }
    }

    /// Creates a USD amount from a whole dollar value.
    pub fn from_dollars(dollars: i64) -> Result<Self, MoneyError> {
        dollars
            .checked_mul(100)
            .map(Self::from_cents)
            .ok_or(MoneyError::Overflow)
    }

    /// Returns zero in the given currency.
    pub fn zero(currency: Currency) -> Self {
        Self::new(0, currency)
    }

    /// Returns the amount in cents.
    pub fn cents(&self) -> i64 {
        self.cents
    }

    /// Returns the currency.
    pub fn currency(&self) -> Currency {
        self.currency
    }

    /// Returns the dollar portion (whole number).
    pub fn dollars(&self) -> i64 {
        self.cents / 100
    }

    /// Returns the cents portion (remainder after dollars).
    pub fn cents_part(&self) -> i64 {
        self.cents.abs() % 100
    }

    /// Returns true if the amount is positive.
    pub fn is_positive(&self) -> bool {
        self.cents > 0
    }

    /// Returns true if the amount is zero.
    pub fn is_zero(&self) -> bool {
        self.cents == 0
    }

    /// Returns true if the amount is negative.
    pub fn is_negative(&self) -> bool {
        self.cents < 0
    }

    /// Adds another amount of the same currency.
    pub fn checked_add(&self, other: Money) -> Result<Money, MoneyError> {
        if self.currency != other.currency {
            return Err(MoneyError::CurrencyMismatch {
                left: self.currency,
                right: other.currency,
            });
        }

        let cents = self
            .cents
            .checked_add(other.cents)
            .ok_or(MoneyError::Overflow)?;

        Ok(Money {
            cents,
            currency: self.currency,
        })
    }

    /// Scales the amount by `(100 - percent) / 100`, rounded to the nearest cent.
    pub fn apply_discount(&self, discount: DiscountPercent) -> Money {
        let keep = i128::from(100 - discount.value());
        let scaled = i128::from(self.cents) * keep;
        // Round half away from zero.
        let rounded = if scaled >= 0 {
            (scaled + 50) / 100
        } else {
            (scaled - 50) / 100
        };

        // |rounded| <= |cents|, so the result always fits back in i64.
        let cents = i64::try_from(rounded).unwrap_or(self.cents);
        Money {
            cents,
            currency: self.currency,
        }
    }
}

impl Default for Money {
    fn default() -> Self {
        Self::zero(Currency::default())
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sign = if self.cents < 0 { "-" } else { "" };
        match self.currency {
            Currency::Usd => write!(
                f,
                "{sign}${}.{:02}",
                self.dollars().abs(),
                self.cents_part()
            ),
            other => write!(
                f,
                "{sign}{}.{:02} {other}",
                self.dollars().abs(),
                self.cents_part()
            ),
        }
    }
}

/// Store-specific discount as a whole percentage in `[0, 100)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(try_from = "u8", into = "u8")]
pub struct DiscountPercent(u8);

impl DiscountPercent {
    /// No discount.
    pub const NONE: DiscountPercent = DiscountPercent(0);

    /// Creates a discount, rejecting values of 100 or more.
    pub fn new(percent: u8) -> Result<Self, MoneyError> {
        if percent >= 100 {
            return Err(MoneyError::InvalidDiscount { percent });
        }
        Ok(Self(percent))
    }

    /// Returns the percentage.
    pub fn value(&self) -> u8 {
        self.0
    }

    /// Returns true if the discount reduces the price.
    pub fn is_positive(&self) -> bool {
        self.0 > 0
    }
}

impl TryFrom<u8> for DiscountPercent {
    type Error = MoneyError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<DiscountPercent> for u8 {
    fn from(discount: DiscountPercent) -> Self {
        discount.0
    }
}

impl std::fmt::Display for DiscountPercent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}%", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_money_from_cents() {
        let money = Money::from_cents(1234);
        assert_eq!(money.cents(), 1234);
        assert_eq!(money.dollars(), 12);
        assert_eq!(money.cents_part(), 34);
        assert_eq!(money.currency(), Currency::Usd);
    }

    #[test]
    fn test_money_display() {
        assert_eq!(Money::from_cents(1234).to_string(), "$12.34");
        assert_eq!(Money::from_cents(5).to_string(), "$0.05");
        assert_eq!(Money::from_cents(-1234).to_string(), "-$12.34");
        assert_eq!(Money::new(350, Currency::Eur).to_string(), "3.50 EUR");
    }

    #[test]
    fn test_checked_add_same_currency() {
        let total = Money::from_dollars(3)
            .unwrap()
            .checked_add(Money::from_dollars(3).unwrap())
            .unwrap();
        assert_eq!(total, Money::from_cents(600));
    }

    #[test]
    fn test_checked_add_reports_overflow() {
        let result = Money::from_cents(i64::MAX).checked_add(Money::from_cents(1));
        assert_eq!(result, Err(MoneyError::Overflow));

        let result = Money::from_cents(i64::MIN).checked_add(Money::from_cents(-1));
        assert_eq!(result, Err(MoneyError::Overflow));
    }

    #[test]
    fn test_from_dollars_reports_overflow() {
        assert_eq!(Money::from_dollars(12), Ok(Money::from_cents(1200)));
        assert_eq!(Money::from_dollars(i64::MAX / 10), Err(MoneyError::Overflow));
    }

    #[test]
    fn test_apply_discount_on_largest_amount() {
        let max = Money::from_cents(i64::MAX);
        assert_eq!(max.apply_discount(DiscountPercent::NONE), max);

        let halved = max.apply_discount(DiscountPercent::new(50).unwrap());
        assert_eq!(halved.cents(), i64::MAX / 2 + 1);
    }

    #[test]
    fn test_checked_add_rejects_mixed_currencies() {
        let err = Money::from_cents(100)
            .checked_add(Money::new(100, Currency::Eur))
            .unwrap_err();
        assert_eq!(
            err,
            MoneyError::CurrencyMismatch {
                left: Currency::Usd,
                right: Currency::Eur,
            }
        );
    }

    #[test]
    fn test_apply_discount() {
        let price = Money::from_cents(600);
        assert_eq!(price.apply_discount(DiscountPercent::NONE), price);
        assert_eq!(
            price.apply_discount(DiscountPercent::new(10).unwrap()),
            Money::from_cents(540)
        );
        // 333 * 0.85 = 283.05 -> 283
        assert_eq!(
            Money::from_cents(333)
                .apply_discount(DiscountPercent::new(15).unwrap())
                .cents(),
            283
        );
        // 5 * 0.5 = 2.5 -> 3
        assert_eq!(
            Money::from_cents(5)
                .apply_discount(DiscountPercent::new(50).unwrap())
                .cents(),
            3
        );
    }

    #[test]
    fn test_apply_discount_keeps_currency() {
        let price = Money::new(1000, Currency::Gbp);
        let discounted = price.apply_discount(DiscountPercent::new(20).unwrap());
        assert_eq!(discounted.currency(), Currency::Gbp);
        assert_eq!(discounted.cents(), 800);
    }

    #[test]
    fn test_discount_percent_range() {
        assert!(DiscountPercent::new(0).is_ok());
        assert!(DiscountPercent::new(99).is_ok());
        assert_eq!(
            DiscountPercent::new(100),
            Err(MoneyError::InvalidDiscount { percent: 100 })
        );
    }

    #[test]
    fn test_discount_percent_deserialize_validates() {
        let ok: DiscountPercent = serde_json::from_str("25").unwrap();
        assert_eq!(ok.value(), 25);
        assert!(serde_json::from_str::<DiscountPercent>("150").is_err());
    }

    #[test]
    fn test_currency_parse() {
        assert_eq!("usd".parse::<Currency>(), Ok(Currency::Usd));
        assert_eq!("EUR".parse::<Currency>(), Ok(Currency::Eur));
        assert!("XYZ".parse::<Currency>().is_err());
    }

    #[test]
    fn test_money_serialization() {
        let money = Money::new(999, Currency::Cad);
        let json = serde_json::to_value(money).unwrap();
        assert_eq!(json["cents"], 999);
        assert_eq!(json["currency"], "CAD");
    }

    proptest! {
        #[test]
        fn discount_never_turns_non_negative_amount_negative(
            cents in 0i64..10_000_000,
            percent in 0u8..100,
        ) {
            let discounted = Money::from_cents(cents)
                .apply_discount(DiscountPercent::new(percent).unwrap());
            prop_assert!(!discounted.is_negative());
            prop_assert!(discounted.cents() <= cents);
        }

        #[test]
        fn sum_of_non_negative_amounts_is_non_negative(
            amounts in prop::collection::vec(0i64..1_000_000, 1..20)
        ) {
            let mut total = Money::zero(Currency::Usd);
            for cents in &amounts {
                total = total.checked_add(Money::from_cents(*cents)).unwrap();
            }
            prop_assert!(!total.is_negative());
            prop_assert_eq!(total.cents(), amounts.iter().sum::<i64>());
        }
    }
}
