//! Product JSON API handlers.

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
};
use serde::Serialize;
use tracing::instrument;

use barcode_catalog_core::{Product, ProductId, ProductUpdate};

use crate::error::{AppError, Result};
use crate::services::{IngestMode, IngestRequest};
use crate::state::AppState;

/// Confirmation body for operations without a resource to return.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Unwrap a JSON body, turning malformed input into a validation error.
fn body<T>(payload: std::result::Result<Json<T>, JsonRejection>) -> Result<T> {
    payload
        .map(|Json(value)| value)
        .map_err(|rejection| AppError::Validation(rejection.body_text()))
}

/// An id that cannot be parsed matches no product.
fn parse_id(raw: &str) -> Result<ProductId> {
    raw.parse()
        .map_err(|_| AppError::NotFound(format!("product {raw}")))
}

/// Ingest a product; quantity and price are optional.
///
/// POST /api/products
#[instrument(skip(state, payload))]
pub async fn create(
    State(state): State<AppState>,
    payload: std::result::Result<Json<IngestRequest>, JsonRejection>,
) -> Result<Json<Product>> {
    let request = body(payload)?;
    let product = state.ingestion().ingest(request, IngestMode::Catalog).await?;
    Ok(Json(product))
}

/// Ingest a product with required quantity and price.
///
/// POST /api/products/stocked
#[instrument(skip(state, payload))]
pub async fn create_stocked(
    State(state): State<AppState>,
    payload: std::result::Result<Json<IngestRequest>, JsonRejection>,
) -> Result<Json<Product>> {
    let request = body(payload)?;
    let product = state.ingestion().ingest(request, IngestMode::Stocked).await?;
    Ok(Json(product))
}

/// List every product.
///
/// GET /api/products
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> Result<Json<Vec<Product>>> {
    Ok(Json(state.catalog().list_all().await?))
}

/// Fetch one product.
///
/// GET /api/products/{id}
#[instrument(skip(state))]
pub async fn show(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<Product>> {
    let id = parse_id(&id)?;
    Ok(Json(state.catalog().get_by_id(id).await?))
}

/// Replace the supplied fields of a product.
///
/// PUT /api/products/{id}
#[instrument(skip(state, payload))]
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: std::result::Result<Json<ProductUpdate>, JsonRejection>,
) -> Result<Json<Product>> {
    let id = parse_id(&id)?;
    let update = body(payload)?;
    Ok(Json(state.catalog().update_by_id(id, &update).await?))
}

/// Delete a product.
///
/// DELETE /api/products/{id}
#[instrument(skip(state))]
pub async fn destroy(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>> {
    let id = parse_id(&id)?;
    state.catalog().delete_by_id(id).await?;
    Ok(Json(MessageResponse {
        message: "Product deleted successfully".to_string(),
    }))
}
