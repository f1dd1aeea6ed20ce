//! Health check endpoint.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use purchase_store::PurchaseRepository;
use serde::Serialize;

use super::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub purchase_store: &'static str,
}

/// GET /health — reports whether purchases can currently be stored.
///
/// Answers 503 when the purchase store is unreachable, since every checkout
/// would end in a reconcile-required failure.
pub async fn check<R: PurchaseRepository + 'static>(
    State(state): State<Arc<AppState<R>>>,
) -> (StatusCode, Json<HealthResponse>) {
    match state.checkout.repository().count().await {
        Ok(_) => (
            StatusCode::OK,
            Json(HealthResponse {
                status: "ok",
                purchase_store: "ok",
            }),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "purchase store health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthResponse {
                    status: "degraded",
                    purchase_store: "unavailable",
                }),
            )
        }
    }
}
