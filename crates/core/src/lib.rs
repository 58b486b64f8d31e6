//! Shopcart Core - Shared types library.
//!
//! This crate provides the domain types used across all shopcart components:
//! - `widget` - Cart store, catalog loader and checkout flow
//! - `dev-server` - Development backend serving the product and order API
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no storage access, no HTTP
//! clients. The JSON shapes of these types are the wire format shared by the
//! widget and the backend.
//!
//! # Modules
//!
//! - [`types`] - Product, cart line, order and value types

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
