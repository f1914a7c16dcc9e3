//! Core types for Bramble.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod id;
pub mod price;
pub mod rating;

pub use id::*;
pub use price::Price;
pub use rating::Rating;
