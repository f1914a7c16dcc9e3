//! Domain models for the storefront.

pub mod session;
pub mod views;

pub use session::{CurrentUser, session_keys};
pub use views::{CartLineView, CartView, OrderLineView, OrderView};
