//! Unified error handling for the widget.
//!
//! Component errors (`StorageError`, `CartError`, `BackendError`,
//! `CheckoutError`) stay with their modules; `WidgetError` wraps them for
//! the event dispatcher.
//! None of these are fatal: the dispatcher logs them and the widget stays
//! interactive.

use shopcart_core::ProductId;
use thiserror::Error;

use crate::backend::BackendError;
use crate::cart::CartError;
use crate::checkout::CheckoutError;
use crate::config::ConfigError;
use crate::storage::StorageError;

/// Widget-level error type.
#[derive(Debug, Error)]
pub enum WidgetError {
    /// Persisting the cart failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// A cart mutation was refused.
    #[error("Cart error: {0}")]
    Cart(#[from] CartError),

    /// A backend call failed.
    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    /// Checkout was rejected or failed.
    #[error("Checkout error: {0}")]
    Checkout(#[from] CheckoutError),

    /// Configuration could not be loaded.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// An add control referenced a product that is not in the catalog.
    #[error("Unknown product: {0}")]
    UnknownProduct(ProductId),

    /// A rendered control carried an action or id the widget does not know.
    #[error("Unknown control: {0}")]
    UnknownControl(String),
}

/// Result type alias for `WidgetError`.
pub type Result<T> = std::result::Result<T, WidgetError>;
