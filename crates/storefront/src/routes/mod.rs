//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Home page data
//! GET  /health                 - Liveness check
//! GET  /health/ready           - Readiness check (pings the store API)
//!
//! # Catalog
//! GET  /products               - Product listing (?category= to filter)
//! GET  /products/{id}          - Product detail
//! GET  /categories             - Category list
//! GET  /categories/{name}      - Products in a category
//!
//! # Cart
//! GET  /cart                   - Full cart view
//! POST /cart/add               - Add a product (merges by product ID)
//! POST /cart/update            - Set a line's quantity (min 1)
//! POST /cart/remove            - Remove a line
//! POST /cart/clear             - Empty the cart
//! GET  /cart/count             - Item count badge
//!
//! # Auth
//! POST /auth/login             - Login action
//! POST /auth/logout            - Logout action
//!
//! # Account (requires auth)
//! GET  /account                - Profile
//! GET  /account/orders         - Order history
//! ```

pub mod account;
pub mod auth;
pub mod cart;
pub mod categories;
pub mod home;
pub mod products;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index))
        .route("/{id}", get(products::show))
}

/// Create the category routes router.
pub fn category_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(categories::index))
        .route("/{name}", get(categories::show))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .route("/clear", post(cart::clear))
        .route("/count", get(cart::count))
}

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
}

/// Create the account routes router.
pub fn account_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(account::index))
        .route("/orders", get(account::orders))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        .nest("/products", product_routes())
        .nest("/categories", category_routes())
        .nest("/cart", cart_routes())
        .nest("/auth", auth_routes())
        .nest("/account", account_routes())
}
