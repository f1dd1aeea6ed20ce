//! Prometheus metrics endpoint.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use checkout::LoyaltyLedger;
use metrics_exporter_prometheus::PrometheusHandle;

/// State for the metrics route.
#[derive(Clone)]
pub struct MetricsState {
    pub handle: PrometheusHandle,
    pub ledger: LoyaltyLedger,
}

/// GET /metrics — returns Prometheus-formatted metrics.
///
/// The enrolled account gauge is sampled on every scrape.
pub async fn get(State(state): State<MetricsState>) -> impl IntoResponse {
    metrics::gauge!("loyalty_accounts").set(state.ledger.len().await as f64);

    (
        StatusCode::OK,
        [(
            axum::http::header::CONTENT_TYPE,
            "text/plain; version=0.0.4; charset=utf-8",
        )],
        state.handle.render(),
    )
}
