//! API error types with HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use checkout::{CheckoutError, GatewayError};
use domain::LoyaltyError;
use purchase_store::RepositoryError;

/// API-level error type that maps to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    /// Resource not found.
    NotFound(String),
    /// Bad request from the client.
    BadRequest(String),
    /// Checkout did not complete.
    Checkout(CheckoutError),
    /// Purchase lookup failed.
    Repository(RepositoryError),
    /// Internal server error.
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, error_body(msg)),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, error_body(msg)),
            ApiError::Checkout(err) => checkout_error_to_response(err),
            ApiError::Repository(err) => {
                tracing::error!(error = %err, "purchase repository error");
                (StatusCode::INTERNAL_SERVER_ERROR, error_body(err.to_string()))
            }
            ApiError::Internal(msg) => {
                tracing::error!(error = %msg, "internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, error_body(msg))
            }
        };

        (status, axum::Json(body)).into_response()
    }
}

fn error_body(message: String) -> serde_json::Value {
    serde_json::json!({ "error": message })
}

fn checkout_error_to_response(err: CheckoutError) -> (StatusCode, serde_json::Value) {
    let status = match &err {
        CheckoutError::EmptyPurchase
        | CheckoutError::ZeroTotal
        | CheckoutError::NegativePrice { .. }
        | CheckoutError::TotalOverflow
        | CheckoutError::CurrencyMismatch { .. }
        | CheckoutError::UnknownPaymentMeans(_)
        | CheckoutError::MissingCardToken
        | CheckoutError::LoyaltyAccountRequired => StatusCode::BAD_REQUEST,
        CheckoutError::LoyaltyChargeFailed(LoyaltyError::InsufficientBalance { .. }) => {
            StatusCode::PAYMENT_REQUIRED
        }
        CheckoutError::LoyaltyChargeFailed(_) => StatusCode::BAD_REQUEST,
        CheckoutError::ChargeFailed(GatewayError::Declined(_)) => StatusCode::PAYMENT_REQUIRED,
        CheckoutError::ChargeFailed(_) | CheckoutError::DiscountLookupFailed(_) => {
            StatusCode::BAD_GATEWAY
        }
        CheckoutError::PersistenceFailed { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        CheckoutError::Cancelled { .. } => StatusCode::REQUEST_TIMEOUT,
    };

    let mut body = serde_json::json!({
        "error": err.to_string(),
        "stage": err.stage().as_str(),
    });
    if let CheckoutError::PersistenceFailed { purchase_id, .. } = &err {
        body["reconcile"] = serde_json::Value::Bool(true);
        body["purchase_id"] = serde_json::Value::String(purchase_id.to_string());
    }

    (status, body)
}

impl From<CheckoutError> for ApiError {
    fn from(err: CheckoutError) -> Self {
        ApiError::Checkout(err)
    }
}

impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        ApiError::Repository(err)
    }
}
