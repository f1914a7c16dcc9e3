//! Account route handlers.
//!
//! All handlers here require a logged-in user via [`RequireAuth`].

use axum::{Json, extract::State, response::IntoResponse};
use tracing::instrument;

use crate::error::Result;
use crate::middleware::RequireAuth;
use crate::models::OrderView;
use crate::state::AppState;

/// `GET /account` - the logged-in user's profile.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn index(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<impl IntoResponse> {
    // Refresh the profile from the directory rather than echoing the session
    let profile = state.fakestore().get_user(user.id).await?;
    Ok(Json(profile))
}

/// `GET /account/orders` - order history projected from remote cart snapshots.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn orders(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<impl IntoResponse> {
    let carts = state.fakestore().get_user_carts(user.id).await?;
    let orders: Vec<OrderView> = carts.iter().map(OrderView::from).collect();
    Ok(Json(orders))
}
