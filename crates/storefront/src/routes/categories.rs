//! Category listing handlers.

use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use tracing::instrument;

use crate::error::Result;
use crate::state::AppState;

/// `GET /categories` - the category name list.
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let categories = state.fakestore().get_categories().await?;
    Ok(Json(categories))
}

/// `GET /categories/{name}` - the products in one category.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<impl IntoResponse> {
    let products = state.fakestore().get_products_in_category(&name).await?;
    Ok(Json(products))
}
