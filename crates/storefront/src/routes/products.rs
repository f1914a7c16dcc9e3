//! Product listing and detail handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
    response::IntoResponse,
};
use serde::Deserialize;
use tracing::instrument;

use bramble_core::ProductId;

use crate::error::Result;
use crate::state::AppState;

/// Query parameters for the product listing.
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    /// Restrict the listing to one category.
    pub category: Option<String>,
}

/// `GET /products` - the product listing, optionally filtered by category.
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse> {
    let products = match query.category {
        Some(category) => state.fakestore().get_products_in_category(&category).await?,
        None => state.fakestore().get_products().await?,
    };
    Ok(Json(products))
}

/// `GET /products/{id}` - product detail.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<impl IntoResponse> {
    let product = state.fakestore().get_product(id).await?;
    Ok(Json(product))
}
