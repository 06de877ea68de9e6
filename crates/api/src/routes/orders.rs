//! Order placement and listing endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use booking::{OrderWorkflow, PlaceOrder};
use inventory_store::{InventoryStore, OrderRecord};
use serde::Serialize;

use crate::error::ApiError;

/// Shared application state accessible from all handlers.
pub struct AppState<S: InventoryStore> {
    pub workflow: OrderWorkflow<S>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderResponse {
    pub id: String,
    pub name: String,
    pub phone: String,
    #[serde(rename = "lessonIDs")]
    pub lesson_ids: Vec<String>,
    pub spaces: Vec<u32>,
    pub created_at: String,
}

impl From<OrderRecord> for OrderResponse {
    fn from(record: OrderRecord) -> Self {
        Self {
            id: record.id.to_string(),
            lesson_ids: record
                .class_ids()
                .into_iter()
                .map(|id| id.as_str().to_string())
                .collect(),
            spaces: record.spaces(),
            created_at: record.created_at.to_rfc3339(),
            name: record.name,
            phone: record.phone,
        }
    }
}

/// POST /orders: reserve every requested class and record the order.
///
/// A body that is not a JSON object is rejected as invalid order data.
#[tracing::instrument(skip_all)]
pub async fn create<S: InventoryStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    payload: Result<Json<PlaceOrder>, JsonRejection>,
) -> Result<(StatusCode, Json<OrderResponse>), ApiError> {
    let Json(order) = payload?;
    let record = state.workflow.place_order(order).await?;

    Ok((StatusCode::CREATED, Json(record.into())))
}

/// GET /orders: list every recorded order, oldest first.
#[tracing::instrument(skip_all)]
pub async fn list<S: InventoryStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
) -> Result<Json<Vec<OrderResponse>>, ApiError> {
    let orders = state.workflow.list_orders().await?;
    Ok(Json(orders.into_iter().map(OrderResponse::from).collect()))
}
