//! Core types for Go Marketplace.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod cart;
pub mod id;
pub mod price;
pub mod quantity;

pub use cart::{CartEntry, CartItem};
pub use id::*;
pub use price::{Price, PriceError};
pub use quantity::Quantity;
