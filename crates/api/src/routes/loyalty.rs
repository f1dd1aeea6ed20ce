//! Loyalty account endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use common::LoyaltyAccountId;
use domain::LoyaltyAccount;
use purchase_store::PurchaseRepository;
use serde::Serialize;

use super::{AppState, parse_uuid};
use crate::error::ApiError;

#[derive(Serialize)]
pub struct LoyaltyResponse {
    pub id: String,
    pub free_drinks_available: u32,
    pub remaining_until_free_drink: u32,
}

impl From<&LoyaltyAccount> for LoyaltyResponse {
    fn from(account: &LoyaltyAccount) -> Self {
        Self {
            id: account.id().to_string(),
            free_drinks_available: account.free_drinks_available(),
            remaining_until_free_drink: account.remaining_until_free_drink(),
        }
    }
}

/// POST /loyalty — enroll a new loyalty account.
#[tracing::instrument(skip(state))]
pub async fn enroll<R: PurchaseRepository + 'static>(
    State(state): State<Arc<AppState<R>>>,
) -> Result<(StatusCode, Json<LoyaltyResponse>), ApiError> {
    let id = state.ledger.enroll().await;
    metrics::counter!("loyalty_accounts_enrolled_total").increment(1);
    let account = state
        .ledger
        .snapshot(id)
        .await
        .ok_or_else(|| ApiError::Internal(format!("Loyalty account {id} vanished")))?;

    Ok((StatusCode::CREATED, Json(LoyaltyResponse::from(&account))))
}

/// GET /loyalty/:id — current balance of a loyalty account.
#[tracing::instrument(skip(state))]
pub async fn get<R: PurchaseRepository + 'static>(
    State(state): State<Arc<AppState<R>>>,
    Path(id): Path<String>,
) -> Result<Json<LoyaltyResponse>, ApiError> {
    let account_id = LoyaltyAccountId::from_uuid(parse_uuid("loyalty account ID", &id)?);
    let account = state
        .ledger
        .snapshot(account_id)
        .await
        .ok_or_else(|| ApiError::NotFound(format!("Loyalty account {id} not found")))?;

    Ok(Json(LoyaltyResponse::from(&account)))
}
