//! Purchase completion steps.

/// A step of the purchase completion workflow, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CheckoutStage {
    /// Validate the purchase and fix its id, time and total.
    Validate,

    /// Look up and apply the store discount.
    Discount,

    /// Dispatch payment by means.
    Charge,

    /// Durably store the finalized purchase.
    Persist,

    /// Stamp the customer's loyalty card.
    Accrue,
}

impl CheckoutStage {
    /// Returns the stage name as used in logs and metric labels.
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckoutStage::Validate => "validate",
            CheckoutStage::Discount => "discount",
            CheckoutStage::Charge => "charge",
            CheckoutStage::Persist => "persist",
            CheckoutStage::Accrue => "accrue",
        }
    }
}

impl std::fmt::Display for CheckoutStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
