//! API error types with HTTP response mapping.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use booking::OrderError;
use inventory_store::StoreError;
use serde_json::{Map, Value, json};

/// API-level error type that maps to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    /// Order placement failed.
    Order(OrderError),
    /// A read against the store failed.
    Store(StoreError),
    /// The body could not be read as an order at all.
    InvalidBody(JsonRejection),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::Order(err) => order_error_to_response(&err),
            ApiError::Store(err) => {
                tracing::error!(error = %err, "store read failed");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    error_body(err.to_string(), "InfrastructureError"),
                )
            }
            ApiError::InvalidBody(rejection) => (
                StatusCode::BAD_REQUEST,
                error_body(
                    format!("Invalid order data: {}", rejection.body_text()),
                    "ValidationError",
                ),
            ),
        };

        (status, axum::Json(Value::Object(body))).into_response()
    }
}

fn error_body(message: String, kind: &str) -> Map<String, Value> {
    let mut body = Map::new();
    body.insert("error".into(), Value::String(message));
    body.insert("kind".into(), Value::String(kind.into()));
    body
}

fn order_error_to_response(err: &OrderError) -> (StatusCode, Map<String, Value>) {
    let mut body = error_body(err.to_string(), err.kind());
    let status = match err {
        OrderError::Validation(_) => StatusCode::BAD_REQUEST,
        OrderError::InsufficientInventory { shortfall, .. } => {
            body.insert("classId".into(), json!(shortfall.class_id));
            body.insert("classTitle".into(), json!(shortfall.title));
            body.insert("requested".into(), json!(shortfall.requested));
            body.insert("available".into(), json!(shortfall.available));
            StatusCode::CONFLICT
        }
        OrderError::Infrastructure { class_id, .. } => {
            body.insert("classId".into(), json!(class_id));
            StatusCode::SERVICE_UNAVAILABLE
        }
        OrderError::PersistenceInconsistency { granted, .. } => {
            body.insert("granted".into(), json!(granted));
            StatusCode::INTERNAL_SERVER_ERROR
        }
        OrderError::Interrupted => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, body)
}

impl From<OrderError> for ApiError {
    fn from(err: OrderError) -> Self {
        ApiError::Order(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::InvalidBody(rejection)
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        ApiError::Store(err)
    }
}
