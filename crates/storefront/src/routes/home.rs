//! Home page handler.

use axum::{Json, extract::State, response::IntoResponse};
use serde::Serialize;
use tracing::instrument;

use crate::error::Result;
use crate::fakestore::Product;
use crate::state::AppState;

/// How many products the home page features.
const FEATURED_COUNT: usize = 4;

/// Home page payload: the category list plus a handful of featured products.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HomeView {
    pub categories: Vec<String>,
    pub featured: Vec<Product>,
}

/// `GET /` - home page data.
#[instrument(skip(state))]
pub async fn home(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let categories = state.fakestore().get_categories().await?;
    let mut featured = state.fakestore().get_products().await?;
    featured.truncate(FEATURED_COUNT);

    Ok(Json(HomeView {
        categories,
        featured,
    }))
}
