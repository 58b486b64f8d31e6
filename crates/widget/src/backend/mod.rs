//! Backend API port and its HTTP implementation.
//!
//! # Endpoints
//!
//! ```text
//! GET  /api/products  - JSON array of products
//! POST /api/orders    - create an order, answers {"orderId": ...}
//! ```
//!
//! The widget only depends on [`ShopBackend`]; [`HttpBackend`] is the
//! `reqwest` implementation used against a real server.

mod http;

pub use http::HttpBackend;

use std::future::Future;

use reqwest::StatusCode;
use shopcart_core::{OrderConfirmation, OrderRequest, Product};
use thiserror::Error;

/// Errors that can occur when calling the backend.
///
/// `Transport` and `Decode` are transport failures (the backend could not be
/// reached or answered with something unreadable); `Status` is an
/// application failure (a non-2xx answer).
#[derive(Debug, Error)]
pub enum BackendError {
    /// HTTP request failed before a response arrived.
    #[error("HTTP error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The backend answered with a non-success status.
    #[error("HTTP {status}: {body}")]
    Status {
        /// Response status.
        status: StatusCode,
        /// First part of the response body.
        body: String,
    },

    /// The response body was not the expected JSON.
    #[error("JSON parse error: {0}")]
    Decode(#[from] serde_json::Error),

    /// An endpoint path could not be resolved against the base URL.
    #[error("Invalid endpoint URL: {0}")]
    Url(#[from] url::ParseError),
}

impl BackendError {
    /// Whether the backend answered at all (non-2xx) as opposed to being
    /// unreachable or unreadable.
    #[must_use]
    pub const fn is_application_failure(&self) -> bool {
        matches!(self, Self::Status { .. })
    }
}

/// The two backend operations the widget needs.
pub trait ShopBackend {
    /// Fetch the product catalog.
    fn fetch_products(&self) -> impl Future<Output = Result<Vec<Product>, BackendError>> + Send;

    /// Submit an order.
    fn place_order(
        &self,
        order: &OrderRequest,
    ) -> impl Future<Output = Result<OrderConfirmation, BackendError>> + Send;
}
