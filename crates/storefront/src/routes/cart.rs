//! Cart route handlers.
//!
//! Each request builds a [`CartStore`] over the request's session (guest)
//! or the session plus the user's remote cart mirror (logged in), hydrates
//! it, applies the mutation, and responds with the full cart view. Remote
//! sync failures never fail the request; they surface as `syncWarning` on
//! the response body.

use axum::{Json, extract::State, response::IntoResponse};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::{instrument, warn};

use bramble_core::ProductId;

use crate::cart::{
    CartStore, HydrateOutcome, MutationOutcome, RemoteCartMirror, SessionCartStorage,
};
use crate::error::Result;
use crate::middleware::OptionalAuth;
use crate::models::{CartView, CurrentUser};
use crate::state::AppState;

/// Message attached to responses when the advisory remote sync failed.
const SYNC_WARNING: &str = "Cart could not be synced to your account; changes are saved locally";

/// Add to cart request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddToCartBody {
    pub product_id: ProductId,
    pub quantity: Option<u32>,
}

/// Update quantity request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCartBody {
    pub product_id: ProductId,
    pub quantity: u32,
}

/// Remove from cart request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveFromCartBody {
    pub product_id: ProductId,
}

/// Cart count badge response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartCount {
    pub count: u32,
}

/// Build and hydrate the request's cart store.
///
/// Returns the store plus the advisory warning from hydration, if the
/// remote fetch failed. Placeholder lines left by reconciliation are
/// enriched from the catalog before the store is returned; products the
/// catalog no longer serves stay as placeholders.
async fn hydrated_store(
    state: &AppState,
    session: Session,
    user: Option<&CurrentUser>,
) -> (CartStore<SessionCartStorage, RemoteCartMirror>, Option<String>) {
    let storage = SessionCartStorage::new(session);
    let mirror = RemoteCartMirror::new(state.fakestore().clone());

    let mut store = match user {
        Some(user) => CartStore::with_mirror(storage, user.id, mirror),
        None => CartStore::new(storage),
    };

    let warning = match store.hydrate().await {
        HydrateOutcome::Ready => None,
        HydrateOutcome::RemoteUnavailable(_) => Some(SYNC_WARNING.to_string()),
    };

    let mut snapshots = Vec::new();
    for product_id in store.placeholder_ids() {
        match state.fakestore().get_product(product_id).await {
            Ok(product) => snapshots.push(product),
            Err(e) => {
                warn!(error = %e, product_id = %product_id, "Failed to enrich cart line from catalog");
            }
        }
    }
    store.enrich(snapshots).await;

    (store, warning)
}

/// Fold a mutation outcome into the response's advisory warning.
fn warning_for(outcome: &MutationOutcome, hydration_warning: Option<String>) -> Option<String> {
    match outcome {
        MutationOutcome::SyncFailed(_) => Some(SYNC_WARNING.to_string()),
        _ => hydration_warning,
    }
}

/// `GET /cart` - the full cart view.
#[instrument(skip(state, session, user))]
pub async fn show(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
    session: Session,
) -> Result<impl IntoResponse> {
    let (store, warning) = hydrated_store(&state, session, user.as_ref()).await;
    Ok(Json(CartView::from_store(&store, warning)))
}

/// `POST /cart/add` - add a product to the cart.
///
/// The catalog snapshot is captured here, at add time; later quantity
/// updates reuse it without re-querying the catalog.
#[instrument(skip(state, session, user), fields(product_id = %body.product_id))]
pub async fn add(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
    session: Session,
    Json(body): Json<AddToCartBody>,
) -> Result<impl IntoResponse> {
    let product = state.fakestore().get_product(body.product_id).await?;
    let (mut store, warning) = hydrated_store(&state, session, user.as_ref()).await;

    let outcome = store.add_item(product, body.quantity.unwrap_or(1)).await;
    let warning = warning_for(&outcome, warning);

    Ok(Json(CartView::from_store(&store, warning)))
}

/// `POST /cart/update` - set a line's quantity.
///
/// Quantities below 1 and unknown products are silent no-ops; the response
/// is the unchanged cart.
#[instrument(skip(state, session, user), fields(product_id = %body.product_id, quantity = body.quantity))]
pub async fn update(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
    session: Session,
    Json(body): Json<UpdateCartBody>,
) -> Result<impl IntoResponse> {
    let (mut store, warning) = hydrated_store(&state, session, user.as_ref()).await;

    let outcome = store.update_quantity(body.product_id, body.quantity).await;
    let warning = warning_for(&outcome, warning);

    Ok(Json(CartView::from_store(&store, warning)))
}

/// `POST /cart/remove` - remove a line.
#[instrument(skip(state, session, user), fields(product_id = %body.product_id))]
pub async fn remove(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
    session: Session,
    Json(body): Json<RemoveFromCartBody>,
) -> Result<impl IntoResponse> {
    let (mut store, warning) = hydrated_store(&state, session, user.as_ref()).await;

    let outcome = store.remove_item(body.product_id).await;
    let warning = warning_for(&outcome, warning);

    Ok(Json(CartView::from_store(&store, warning)))
}

/// `POST /cart/clear` - empty the cart.
#[instrument(skip(state, session, user))]
pub async fn clear(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
    session: Session,
) -> Result<impl IntoResponse> {
    let (mut store, warning) = hydrated_store(&state, session, user.as_ref()).await;

    let outcome = store.clear().await;
    let warning = warning_for(&outcome, warning);

    Ok(Json(CartView::from_store(&store, warning)))
}

/// `GET /cart/count` - total item count for the header badge.
#[instrument(skip(state, session, user))]
pub async fn count(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
    session: Session,
) -> Result<impl IntoResponse> {
    let (store, _) = hydrated_store(&state, session, user.as_ref()).await;
    Ok(Json(CartCount {
        count: store.total_items(),
    }))
}
