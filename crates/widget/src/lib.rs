//! Shopcart Widget - embeddable shopping cart.
//!
//! Loads a product catalog from the backend (or a built-in fallback), keeps
//! a persisted cart, and runs a checkout form that submits orders.
//!
//! # Architecture
//!
//! [`widget::Widget`] is the controller. It talks to the outside world only
//! through three ports:
//!
//! - [`backend::ShopBackend`] - catalog fetch and order submission
//!   ([`backend::HttpBackend`] over `reqwest`)
//! - [`storage::CartStorage`] - cart persistence
//!   ([`storage::JsonCartStorage`] over a [`storage::KeyValueStore`])
//! - [`render::RenderSurface`] - display output
//!   ([`render::HtmlSurface`] renders Askama templates)
//!
//! # Modules
//!
//! - [`cart`] - Cart store and its invariants
//! - [`catalog`] - Catalog loading and fallback products
//! - [`checkout`] - Checkout form validation and messages
//! - [`notify`] - Expiring notifications
//! - [`config`] - Environment configuration
//! - [`telemetry`] - Tracing and Sentry setup

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod backend;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod config;
pub mod error;
pub mod notify;
pub mod render;
pub mod storage;
pub mod telemetry;
pub mod widget;

#[cfg(test)]
mod test_support;

pub use error::{Result, WidgetError};
pub use widget::{ConfiguredWidget, Widget, WidgetEvent};
