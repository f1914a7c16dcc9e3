//! End-to-end cart flow over the library API and the HTTP router.
//!
//! The store-level tests drive a full guest-to-login session against
//! in-memory storage and a scripted mirror. The router tests exercise
//! route wiring and the session layer for handlers that never touch the
//! network.

#![allow(clippy::unwrap_used)]

use std::net::IpAddr;
use std::sync::{Arc, Mutex};

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use tower::util::ServiceExt;
use url::Url;

use bramble_core::{Price, ProductId, Rating, UserId};
use bramble_storefront::cart::{CartMirror, CartStore, MemoryCartStorage, MutationOutcome};
use bramble_storefront::config::{FakeStoreConfig, StorefrontConfig};
use bramble_storefront::fakestore::{ApiError, Product, RemoteCartEntry};
use bramble_storefront::middleware::create_session_layer;
use bramble_storefront::routes;
use bramble_storefront::state::AppState;

fn product(id: i64, price_cents: i64) -> Product {
    Product {
        id: ProductId::new(id),
        title: format!("Product {id}"),
        price: Price::from_cents(price_cents),
        description: String::new(),
        category: "electronics".to_string(),
        image: format!("https://example.com/{id}.jpg"),
        rating: Rating::default(),
    }
}

/// Mirror whose remote side is a shared in-memory entry list.
///
/// The test keeps a clone of the handle to seed and inspect the remote
/// state after the mirror has moved into the store.
#[derive(Clone, Default)]
struct ScriptedMirror {
    remote: Arc<Mutex<Vec<RemoteCartEntry>>>,
}

impl CartMirror for ScriptedMirror {
    async fn fetch(&self, _user_id: UserId) -> Result<Vec<RemoteCartEntry>, ApiError> {
        Ok(self.remote.lock().unwrap().clone())
    }

    async fn push(
        &self,
        _user_id: UserId,
        entries: Vec<RemoteCartEntry>,
    ) -> Result<(), ApiError> {
        *self.remote.lock().unwrap() = entries;
        Ok(())
    }
}

#[tokio::test]
async fn guest_cart_survives_rehydration_and_login_reconciles() {
    // A guest fills a cart; the blob outlives the store
    let mut guest = CartStore::new(MemoryCartStorage::new());
    guest.hydrate().await;
    guest.add_item(product(1, 1000), 2).await;
    guest.add_item(product(2, 550), 1).await;
    assert_eq!(guest.total_price(), Price::from_cents(2550));

    let blob = guest.lines().to_vec();

    // Login: the remote side already has an older cart for this user
    let mirror = ScriptedMirror::default();
    *mirror.remote.lock().unwrap() = vec![
        RemoteCartEntry {
            product_id: ProductId::new(1),
            quantity: 9,
        },
        RemoteCartEntry {
            product_id: ProductId::new(7),
            quantity: 1,
        },
    ];

    let mut store = CartStore::with_mirror(
        MemoryCartStorage::seeded(blob),
        UserId::new(3),
        mirror.clone(),
    );
    store.hydrate().await;

    // Local line for product 1 wins wholesale; product 7 is a placeholder;
    // the local-only product 2 is dropped in favor of the remote list
    assert_eq!(store.lines().len(), 2);
    assert_eq!(store.lines()[0].product_id, ProductId::new(1));
    assert_eq!(store.lines()[0].quantity, 2);
    assert_eq!(store.placeholder_ids(), vec![ProductId::new(7)]);

    // Catalog enrichment fills the placeholder and fixes the totals
    store.enrich([product(7, 300)]).await;
    assert!(store.placeholder_ids().is_empty());
    assert_eq!(store.total_price(), Price::from_cents(2300));

    // A mutation now syncs the projection back to the remote side
    let outcome = store.add_item(product(4, 100), 1).await;
    assert!(matches!(outcome, MutationOutcome::Applied));
    let remote = mirror.remote.lock().unwrap().clone();
    assert_eq!(remote.len(), 3);
    assert!(remote.contains(&RemoteCartEntry {
        product_id: ProductId::new(4),
        quantity: 1
    }));
}

#[tokio::test]
async fn cleared_cart_stays_empty_across_sessions() {
    let mut store = CartStore::new(MemoryCartStorage::new());
    store.hydrate().await;
    store.add_item(product(1, 1000), 3).await;
    store.clear().await;

    assert!(store.is_empty());
    assert_eq!(store.total_items(), 0);
    assert_eq!(store.total_price(), Price::ZERO);
}

// =============================================================================
// Router wiring
// =============================================================================

fn test_app() -> Router {
    let config = StorefrontConfig {
        host: "127.0.0.1".parse::<IpAddr>().unwrap(),
        port: 0,
        base_url: "http://localhost:3000".to_string(),
        fakestore: FakeStoreConfig {
            base_url: Url::parse("http://127.0.0.1:9").unwrap(),
            cache_ttl_secs: 60,
        },
        sentry_dsn: None,
    };
    let state = AppState::new(config.clone());
    let session_layer = create_session_layer(&config);

    routes::routes().layer(session_layer).with_state(state)
}

#[tokio::test]
async fn empty_guest_cart_renders_zero_totals() {
    let app = test_app();

    let response = app
        .oneshot(Request::get("/cart").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .unwrap();
    let view: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(view["totalItems"], 0);
    assert_eq!(view["totalPrice"], "$0.00");
    assert_eq!(view["lines"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn invalid_quantity_update_is_a_silent_no_op() {
    let app = test_app();

    let response = app
        .oneshot(
            Request::post("/cart/update")
                .header("content-type", "application/json")
                .body(Body::from(r#"{"productId": 1, "quantity": 0}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    // The mutation is ignored, not an error; the unchanged cart comes back
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .unwrap();
    let view: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(view["totalItems"], 0);
}

#[tokio::test]
async fn account_routes_require_authentication() {
    let app = test_app();

    let response = app
        .oneshot(Request::get("/account").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let bytes = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
    assert_eq!(&bytes[..], b"Unauthorized: Authentication required");
}
