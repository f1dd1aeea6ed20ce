//! Card charge gateway trait and in-memory implementation.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use domain::Money;
use thiserror::Error;

/// Errors reported by a card gateway.
///
/// Any of these means no funds were moved.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    /// The issuer declined the charge.
    #[error("Card declined: {0}")]
    Declined(String),

    /// The gateway could not be reached.
    #[error("Card gateway unavailable: {0}")]
    Unavailable(String),

    /// The gateway did not answer in time.
    #[error("Card gateway timed out after {0:?}")]
    Timeout(Duration),
}

/// Result of a successful card charge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChargeReceipt {
    /// The charge ID assigned by the gateway.
    pub charge_id: String,

    /// The amount actually charged.
    pub amount: Money,
}

/// Trait for charging tokenized cards.
#[async_trait]
pub trait CardChargeGateway: Send + Sync {
    /// Charges `amount` to the card behind `card_token`.
    async fn charge(&self, amount: Money, card_token: &str) -> Result<ChargeReceipt, GatewayError>;
}

#[derive(Debug, Default)]
struct InMemoryCardState {
    charges: Vec<(String, Money, String)>,
    next_id: u32,
    fail_on_charge: bool,
    delay: Option<Duration>,
}

/// In-memory card gateway for testing.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCardGateway {
    state: Arc<Mutex<InMemoryCardState>>,
}

impl InMemoryCardGateway {
    /// Creates a new in-memory card gateway.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the gateway to decline charges.
    pub fn set_fail_on_charge(&self, fail: bool) {
        self.lock().fail_on_charge = fail;
    }

    /// Makes every charge wait before answering.
    pub fn set_delay(&self, delay: Option<Duration>) {
        self.lock().delay = delay;
    }

    /// Returns the number of successful charges.
    pub fn charge_count(&self) -> usize {
        self.lock().charges.len()
    }

    /// Returns the amounts charged, in order.
    pub fn charged_amounts(&self) -> Vec<Money> {
        self.lock().charges.iter().map(|(_, amount, _)| *amount).collect()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, InMemoryCardState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl CardChargeGateway for InMemoryCardGateway {
    async fn charge(&self, amount: Money, card_token: &str) -> Result<ChargeReceipt, GatewayError> {
        let delay = self.lock().delay;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let mut state = self.lock();

        if state.fail_on_charge {
            return Err(GatewayError::Declined("Insufficient funds".to_string()));
        }

        state.next_id += 1;
        let charge_id = format!("CH-{:04}", state.next_id);
        state
            .charges
            .push((charge_id.clone(), amount, card_token.to_string()));

        Ok(ChargeReceipt { charge_id, amount })
    }
}
