//! Checkout configuration loaded from environment variables.

use std::time::Duration;

use domain::Currency;

/// Checkout settings with sensible defaults.
///
/// Reads from environment variables:
/// - `CHECKOUT_CURRENCY` — currency every purchase is totalled in (default: `"USD"`)
/// - `CHECKOUT_TIMEOUT_MS` — upper bound for each collaborator call (default: `5000`)
#[derive(Debug, Clone)]
pub struct CheckoutConfig {
    pub currency: Currency,
    pub collaborator_timeout: Duration,
}

impl CheckoutConfig {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            currency: std::env::var("CHECKOUT_CURRENCY")
                .ok()
                .and_then(|c| c.parse().ok())
                .unwrap_or(defaults.currency),
            collaborator_timeout: std::env::var("CHECKOUT_TIMEOUT_MS")
                .ok()
                .and_then(|ms| ms.parse().ok())
                .map(Duration::from_millis)
                .unwrap_or(defaults.collaborator_timeout),
        }
    }

    /// Returns a copy with a different collaborator timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.collaborator_timeout = timeout;
        self
    }
}

impl Default for CheckoutConfig {
    fn default() -> Self {
        Self {
            currency: Currency::Usd,
            collaborator_timeout: Duration::from_secs(5),
        }
    }
}
