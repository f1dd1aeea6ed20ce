//! Purchase aggregate implementation.

use chrono::{DateTime, Utc};
use common::{PurchaseId, StoreId};
use serde::{Deserialize, Serialize};

use super::{PaymentMeans, PurchaseError};
use crate::money::{Currency, DiscountPercent, Money, MoneyError};
use crate::product::Product;

/// A purchase as assembled at the register, before validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Purchase {
    /// Store the purchase happens at.
    pub store_id: StoreId,

    /// Products selected by the customer.
    pub products: Vec<Product>,

    /// How the customer pays.
    pub payment_means: PaymentMeans,

    /// Card token, only meaningful for [`PaymentMeans::Card`].
    pub card_token: Option<String>,
}

impl Purchase {
    /// Creates a new purchase.
    pub fn new(
        store_id: StoreId,
        products: Vec<Product>,
        payment_means: PaymentMeans,
        card_token: Option<String>,
    ) -> Self {
        Self {
            store_id,
            products,
            payment_means,
            card_token,
        }
    }

    /// Creates a purchase paid by card.
    pub fn card(store_id: StoreId, products: Vec<Product>, card_token: impl Into<String>) -> Self {
        Self::new(
            store_id,
            products,
            PaymentMeans::Card,
            Some(card_token.into()),
        )
    }

    /// Creates a purchase paid in cash.
    pub fn cash(store_id: StoreId, products: Vec<Product>) -> Self {
        Self::new(store_id, products, PaymentMeans::Cash, None)
    }

    /// Creates a purchase redeemed against CoffeeBux.
    pub fn loyalty(store_id: StoreId, products: Vec<Product>) -> Self {
        Self::new(store_id, products, PaymentMeans::LoyaltyCurrency, None)
    }

    /// Validates the purchase and fixes its identity, time and total.
    ///
    /// The product list is copied, so the validated purchase no longer
    /// depends on the catalog values it was built from.
    pub fn validate_and_enrich(&self, currency: Currency) -> Result<ValidatedPurchase, PurchaseError> {
        if self.products.is_empty() {
            return Err(PurchaseError::EmptyPurchase);
        }

        let mut total = Money::zero(currency);
        for product in &self.products {
            if product.base_price.is_negative() {
                return Err(PurchaseError::NegativePrice {
                    product_id: product.id.to_string(),
                    price: product.base_price,
                });
            }
            total = total
                .checked_add(product.base_price)
                .map_err(|e| match e {
                    MoneyError::Overflow => PurchaseError::TotalOverflow,
                    _ => PurchaseError::CurrencyMismatch {
                        product_id: product.id.to_string(),
                        expected: currency,
                        found: product.base_price.currency(),
                    },
                })?;
        }

        if !total.is_positive() {
            return Err(PurchaseError::ZeroTotal);
        }

        Ok(ValidatedPurchase {
            id: PurchaseId::new(),
            store_id: self.store_id,
            products: self.products.clone(),
            payment_means: self.payment_means,
            card_token: self.card_token.clone(),
            total,
            discount: DiscountPercent::NONE,
            amount_due: total,
            time_of_purchase: Utc::now(),
        })
    }
}

/// A purchase that passed validation.
///
/// Identity, timestamp and gross total are fixed at construction. Only the
/// store discount can still be applied before the purchase is charged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatedPurchase {
    id: PurchaseId,
    store_id: StoreId,
    products: Vec<Product>,
    payment_means: PaymentMeans,
    #[serde(skip)]
    card_token: Option<String>,
    total: Money,
    discount: DiscountPercent,
    amount_due: Money,
    time_of_purchase: DateTime<Utc>,
}

impl ValidatedPurchase {
    pub fn id(&self) -> PurchaseId {
        self.id
    }

    pub fn store_id(&self) -> StoreId {
        self.store_id
    }

    /// Returns the products snapshot.
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    /// Returns the number of product units.
    pub fn product_count(&self) -> usize {
        self.products.len()
    }

    pub fn payment_means(&self) -> PaymentMeans {
        self.payment_means
    }

    /// Returns the card token. Never persisted.
    pub fn card_token(&self) -> Option<&str> {
        self.card_token.as_deref()
    }

    /// Returns the sum of base prices before any discount.
    pub fn total(&self) -> Money {
        self.total
    }

    /// Returns the store discount applied to this purchase.
    pub fn discount(&self) -> DiscountPercent {
        self.discount
    }

    /// Returns the amount charged to the customer.
    pub fn amount_due(&self) -> Money {
        self.amount_due
    }

    pub fn time_of_purchase(&self) -> DateTime<Utc> {
        self.time_of_purchase
    }

    /// Applies a store discount to the amount due.
    ///
    /// The discount is always computed from the gross total, so applying
    /// a second discount replaces the first rather than compounding.
    pub fn apply_discount(&mut self, discount: DiscountPercent) {
        self.discount = discount;
        self.amount_due = self.total.apply_discount(discount);
    }
}
