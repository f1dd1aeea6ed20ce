//! Purchase completion and lookup endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use checkout::{CancelSignal, Canceller, CheckoutError};
use common::{LoyaltyAccountId, PurchaseId, StoreId};
use domain::{Money, PaymentMeans, Product, Purchase, ValidatedPurchase};
use purchase_store::PurchaseRepository;
use serde::{Deserialize, Serialize};

use super::loyalty::LoyaltyResponse;
use super::{AppState, parse_uuid};
use crate::error::ApiError;

// -- Request types --

#[derive(Deserialize)]
pub struct CompletePurchaseRequest {
    pub store_id: String,
    pub products: Vec<ProductRequest>,
    pub payment_means: String,
    pub card_token: Option<String>,
    pub loyalty_account_id: Option<String>,
}

#[derive(Deserialize)]
pub struct ProductRequest {
    pub product_id: String,
    pub name: String,
    pub price_cents: i64,
}

// -- Response types --

#[derive(Serialize)]
pub struct PurchaseResponse {
    pub id: String,
    pub store_id: String,
    pub payment_means: String,
    pub products: Vec<ProductResponse>,
    pub currency: String,
    pub total_cents: i64,
    pub discount_percent: u8,
    pub amount_due_cents: i64,
    pub time_of_purchase: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loyalty: Option<LoyaltyResponse>,
}

#[derive(Serialize)]
pub struct ProductResponse {
    pub product_id: String,
    pub name: String,
    pub price_cents: i64,
}

impl From<&ValidatedPurchase> for PurchaseResponse {
    fn from(purchase: &ValidatedPurchase) -> Self {
        Self {
            id: purchase.id().to_string(),
            store_id: purchase.store_id().to_string(),
            payment_means: purchase.payment_means().to_string(),
            products: purchase
                .products()
                .iter()
                .map(|product| ProductResponse {
                    product_id: product.id.to_string(),
                    name: product.name.clone(),
                    price_cents: product.base_price.cents(),
                })
                .collect(),
            currency: purchase.total().currency().to_string(),
            total_cents: purchase.total().cents(),
            discount_percent: purchase.discount().value(),
            amount_due_cents: purchase.amount_due().cents(),
            time_of_purchase: purchase.time_of_purchase().to_rfc3339(),
            loyalty: None,
        }
    }
}

/// Cancels the checkout if the request is dropped before it finishes.
struct CancelOnDrop(Canceller);

impl Drop for CancelOnDrop {
    fn drop(&mut self) {
        self.0.cancel();
    }
}

// -- Handlers --

/// POST /purchases — complete a purchase.
///
/// The checkout runs on its own task so a client disconnect can only cancel
/// it before payment; once payment is dispatched it runs to completion.
#[tracing::instrument(skip(state, req))]
pub async fn complete<R: PurchaseRepository + 'static>(
    State(state): State<Arc<AppState<R>>>,
    Json(req): Json<CompletePurchaseRequest>,
) -> Result<(StatusCode, Json<PurchaseResponse>), ApiError> {
    let store_id = StoreId::from_uuid(parse_uuid("store_id", &req.store_id)?);
    let payment_means: PaymentMeans = req.payment_means.parse().map_err(CheckoutError::from)?;

    let currency = state.checkout.config().currency;
    let products = req
        .products
        .iter()
        .map(|p| {
            Product::new(
                p.product_id.as_str(),
                p.name.as_str(),
                Money::new(p.price_cents, currency),
            )
        })
        .collect();

    let loyalty = match req.loyalty_account_id.as_deref() {
        Some(id) => {
            let account_id = LoyaltyAccountId::from_uuid(parse_uuid("loyalty_account_id", id)?);
            let handle = state
                .ledger
                .handle(account_id)
                .await
                .ok_or_else(|| ApiError::NotFound(format!("Loyalty account {id} not found")))?;
            Some(handle)
        }
        None => None,
    };

    let purchase = Purchase::new(store_id, products, payment_means, req.card_token);

    let (canceller, signal) = CancelSignal::pair();
    let _cancel_on_drop = CancelOnDrop(canceller);
    let task_state = state.clone();
    let task_loyalty = loyalty.clone();
    let completed = tokio::spawn(async move {
        task_state
            .checkout
            .complete(&purchase, task_loyalty.as_ref(), &signal)
            .await
    })
    .await
    .map_err(|e| ApiError::Internal(format!("Checkout task failed: {e}")))??;

    let mut response = PurchaseResponse::from(&completed);
    if let Some(handle) = loyalty {
        let account = handle.lock().await;
        response.loyalty = Some(LoyaltyResponse::from(&*account));
    }

    Ok((StatusCode::CREATED, Json(response)))
}

/// GET /purchases/:id — load a stored purchase.
#[tracing::instrument(skip(state))]
pub async fn get<R: PurchaseRepository + 'static>(
    State(state): State<Arc<AppState<R>>>,
    Path(id): Path<String>,
) -> Result<Json<PurchaseResponse>, ApiError> {
    let purchase_id = PurchaseId::from_uuid(parse_uuid("purchase ID", &id)?);
    let purchase = state
        .checkout
        .repository()
        .get(purchase_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Purchase {id} not found")))?;

    Ok(Json(PurchaseResponse::from(&purchase)))
}

/// GET /stores/:id/purchases — purchases made at a store, oldest first.
#[tracing::instrument(skip(state))]
pub async fn list_for_store<R: PurchaseRepository + 'static>(
    State(state): State<Arc<AppState<R>>>,
    Path(id): Path<String>,
) -> Result<Json<Vec<PurchaseResponse>>, ApiError> {
    let store_id = StoreId::from_uuid(parse_uuid("store ID", &id)?);
    let purchases = state.checkout.repository().list_for_store(store_id).await?;

    Ok(Json(purchases.iter().map(PurchaseResponse::from).collect()))
}
