//! Go Marketplace Core - Shared types library.
//!
//! This crate provides common types used across all Go Marketplace components:
//! - `cart` - Cart state container with write-behind persistence
//! - `cli` - Command-line tools for inspecting and editing a persisted cart
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no storage access, no async
//! runtime. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for product IDs, prices, quantities, and cart lines

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
