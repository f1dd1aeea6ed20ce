//! HTTP route handlers.

pub mod health;
pub mod loyalty;
pub mod metrics;
pub mod purchases;

use checkout::{
    InMemoryCardGateway, InMemoryDiscountProvider, LoyaltyLedger, PurchaseCompletionService,
};
use purchase_store::PurchaseRepository;

use crate::error::ApiError;

/// Shared application state accessible from all handlers.
pub struct AppState<R: PurchaseRepository> {
    pub checkout: PurchaseCompletionService<InMemoryCardGateway, InMemoryDiscountProvider, R>,
    pub card_gateway: InMemoryCardGateway,
    pub discounts: InMemoryDiscountProvider,
    pub ledger: LoyaltyLedger,
}

fn parse_uuid(field: &str, value: &str) -> Result<uuid::Uuid, ApiError> {
    uuid::Uuid::parse_str(value)
        .map_err(|e| ApiError::BadRequest(format!("Invalid {field} format: {e}")))
}
