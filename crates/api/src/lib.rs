//! HTTP API for the coffee shop till.
//!
//! Provides REST endpoints for completing purchases and managing loyalty
//! accounts, with structured logging (tracing) and Prometheus metrics.

pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use checkout::{
    CheckoutConfig, InMemoryCardGateway, InMemoryDiscountProvider, LoyaltyLedger,
    PurchaseCompletionService,
};
use metrics_exporter_prometheus::PrometheusHandle;
use purchase_store::PurchaseRepository;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use routes::AppState;
use routes::metrics::MetricsState;

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<R: PurchaseRepository + 'static>(
    state: Arc<AppState<R>>,
    metrics_handle: PrometheusHandle,
) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(MetricsState {
            handle: metrics_handle,
            ledger: state.ledger.clone(),
        });

    Router::new()
        .route("/health", get(routes::health::check::<R>))
        .route("/purchases", post(routes::purchases::complete::<R>))
        .route("/purchases/{id}", get(routes::purchases::get::<R>))
        .route(
            "/stores/{id}/purchases",
            get(routes::purchases::list_for_store::<R>),
        )
        .route("/loyalty", post(routes::loyalty::enroll::<R>))
        .route("/loyalty/{id}", get(routes::loyalty::get::<R>))
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Creates the default application state around a purchase repository.
///
/// Card charging and discount lookup use the in-memory collaborators.
pub fn create_default_state<R: PurchaseRepository + 'static>(
    repository: R,
    config: CheckoutConfig,
) -> Arc<AppState<R>> {
    let card_gateway = InMemoryCardGateway::new();
    let discounts = InMemoryDiscountProvider::new();
    let checkout = PurchaseCompletionService::with_config(
        card_gateway.clone(),
        discounts.clone(),
        repository,
        config,
    );

    Arc::new(AppState {
        checkout,
        card_gateway,
        discounts,
        ledger: LoyaltyLedger::new(),
    })
}
