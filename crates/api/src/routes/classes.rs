//! Class catalog endpoint.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use inventory_store::{ClassRecord, InventoryStore};
use serde::Serialize;

use super::orders::AppState;
use crate::error::ApiError;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassResponse {
    pub id: String,
    pub title: String,
    pub description: String,
    pub category: String,
    pub location: String,
    pub price_cents: i64,
    pub rating: u8,
    pub image: String,
    pub available_seats: u32,
}

impl From<ClassRecord> for ClassResponse {
    fn from(class: ClassRecord) -> Self {
        Self {
            id: class.id.as_str().to_string(),
            title: class.title,
            description: class.description,
            category: class.category,
            location: class.location,
            price_cents: class.price.cents(),
            rating: class.rating,
            image: class.image,
            available_seats: class.available_seats,
        }
    }
}

/// GET /classes: the catalog with current seat availability.
#[tracing::instrument(skip_all)]
pub async fn list<S: InventoryStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
) -> Result<Json<Vec<ClassResponse>>, ApiError> {
    let classes = state.workflow.store().list_classes().await?;
    Ok(Json(classes.into_iter().map(ClassResponse::from).collect()))
}
