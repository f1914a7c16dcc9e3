//! Types for the FakeStore REST API.
//!
//! The API serves plain JSON with camelCase keys; everything here derives
//! serde with `rename_all = "camelCase"` where the Rust field names differ.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use bramble_core::{CartId, Price, ProductId, Rating, UserId};

/// A catalog product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub title: String,
    pub price: Price,
    #[serde(default)]
    pub description: String,
    pub category: String,
    pub image: String,
    #[serde(default)]
    pub rating: Rating,
}

/// One `{productId, quantity}` entry in a remote cart body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteCartEntry {
    pub product_id: ProductId,
    pub quantity: u32,
}

/// A remote cart resource, scoped by user identity.
///
/// The id is absent on create/replace request bodies and assigned by the
/// server on the response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteCart {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<CartId>,
    pub user_id: UserId,
    pub date: DateTime<Utc>,
    pub products: Vec<RemoteCartEntry>,
}

/// Login request body for `/auth/login`.
#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Login response body: an opaque bearer token.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub token: String,
}

/// A user's name as served by the user directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct UserName {
    pub firstname: String,
    pub lastname: String,
}

/// A user record from the user directory.
///
/// The directory serves more fields (address, phone); only what the
/// storefront consumes is deserialized here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiUser {
    pub id: UserId,
    pub email: String,
    pub username: String,
    #[serde(default)]
    pub name: UserName,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_product_deserializes_from_api_shape() {
        let json = r#"{
            "id": 1,
            "title": "Fjallraven Backpack",
            "price": 109.95,
            "description": "Fits 15 inch laptops",
            "category": "men's clothing",
            "image": "https://example.com/1.jpg",
            "rating": {"rate": 3.9, "count": 120}
        }"#;

        let product: Product = serde_json::from_str(json).expect("parse product");
        assert_eq!(product.id, ProductId::new(1));
        assert_eq!(product.price, Price::from_cents(10995));
        assert_eq!(product.rating.count, 120);
    }

    #[test]
    fn test_remote_cart_round_trips_camel_case() {
        let json = r#"{
            "id": 5,
            "userId": 2,
            "date": "2020-03-01T00:00:00.000Z",
            "products": [{"productId": 1, "quantity": 4}]
        }"#;

        let cart: RemoteCart = serde_json::from_str(json).expect("parse cart");
        assert_eq!(cart.user_id, UserId::new(2));
        assert_eq!(
            cart.products,
            vec![RemoteCartEntry {
                product_id: ProductId::new(1),
                quantity: 4
            }]
        );

        let body = serde_json::to_value(&cart).expect("serialize cart");
        assert!(body.get("userId").is_some());
        assert!(body["products"][0].get("productId").is_some());
    }

    #[test]
    fn test_remote_cart_request_body_omits_id() {
        let cart = RemoteCart {
            id: None,
            user_id: UserId::new(2),
            date: Utc::now(),
            products: vec![],
        };
        let body = serde_json::to_value(&cart).expect("serialize cart");
        assert!(body.get("id").is_none());
    }
}
