//! Product rating as served by the catalog.

use serde::{Deserialize, Serialize};

/// Aggregate customer rating for a product.
///
/// Captured as part of the product snapshot at add-to-cart time; never used
/// in any arithmetic, so the rate stays a plain float.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct Rating {
    /// Average rating, 0.0 to 5.0.
    pub rate: f64,
    /// Number of ratings the average is computed over.
    pub count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rating_round_trips() {
        let rating: Rating = serde_json::from_str(r#"{"rate":3.9,"count":120}"#).expect("parse");
        assert!((rating.rate - 3.9).abs() < f64::EPSILON);
        assert_eq!(rating.count, 120);
    }
}
