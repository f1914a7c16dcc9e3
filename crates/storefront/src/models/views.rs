//! Response view models.
//!
//! JSON projections of the domain types, with prices pre-formatted as
//! display strings.

use chrono::{DateTime, Utc};
use serde::Serialize;

use bramble_core::ProductId;

use crate::cart::{CartLine, CartMirror, CartStorage, CartStore};
use crate::fakestore::RemoteCart;

/// One cart line as rendered to the client.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineView {
    pub product_id: ProductId,
    pub quantity: u32,
    /// `None` while the line is a placeholder awaiting catalog data.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit_price: Option<String>,
    pub subtotal: String,
}

impl From<&CartLine> for CartLineView {
    fn from(line: &CartLine) -> Self {
        Self {
            product_id: line.product_id,
            quantity: line.quantity,
            title: line.product.as_ref().map(|p| p.title.clone()),
            image: line.product.as_ref().map(|p| p.image.clone()),
            unit_price: line.product.as_ref().map(|p| p.price.display()),
            subtotal: line.subtotal.display(),
        }
    }
}

/// The cart as rendered to the client.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartView {
    pub lines: Vec<CartLineView>,
    pub total_items: u32,
    pub total_price: String,
    /// Set when the advisory remote sync failed for this request.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sync_warning: Option<String>,
}

impl CartView {
    /// Project a store's current state, attaching an advisory warning if any.
    pub fn from_store<S: CartStorage, M: CartMirror>(
        store: &CartStore<S, M>,
        sync_warning: Option<String>,
    ) -> Self {
        Self {
            lines: store.lines().iter().map(CartLineView::from).collect(),
            total_items: store.total_items(),
            total_price: store.total_price().display(),
            sync_warning,
        }
    }
}

/// One line of a past order.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLineView {
    pub product_id: ProductId,
    pub quantity: u32,
}

/// A past order, projected from a remote cart snapshot.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderView {
    pub date: DateTime<Utc>,
    pub total_items: u32,
    pub lines: Vec<OrderLineView>,
}

impl From<&RemoteCart> for OrderView {
    fn from(cart: &RemoteCart) -> Self {
        Self {
            date: cart.date,
            total_items: cart.products.iter().map(|p| p.quantity).sum(),
            lines: cart
                .products
                .iter()
                .map(|p| OrderLineView {
                    product_id: p.product_id,
                    quantity: p.quantity,
                })
                .collect(),
        }
    }
}
