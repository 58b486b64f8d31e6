//! In-process fakes shared by the unit tests.

#![allow(clippy::unwrap_used)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use reqwest::StatusCode;
use shopcart_core::{OrderConfirmation, OrderReference, OrderRequest, Product};

use crate::backend::{BackendError, ShopBackend};

/// How the fake answers `place_order`.
#[derive(Debug, Clone)]
pub enum OrderOutcome {
    Accept(String),
    Reject(StatusCode),
    /// Never answers.
    Pending,
}

/// Scriptable [`ShopBackend`] that records what it was asked.
#[derive(Debug, Clone)]
pub struct FakeBackend {
    products: Option<Vec<Product>>,
    outcome: OrderOutcome,
    orders: Arc<Mutex<Vec<OrderRequest>>>,
    catalog_calls: Arc<AtomicUsize>,
}

impl FakeBackend {
    pub fn with_products(products: Vec<Product>) -> Self {
        Self {
            products: Some(products),
            outcome: OrderOutcome::Accept("ORD-TEST0001".to_string()),
            orders: Arc::default(),
            catalog_calls: Arc::default(),
        }
    }

    /// A backend whose catalog endpoint always fails.
    pub fn failing_catalog() -> Self {
        Self {
            products: None,
            ..Self::with_products(Vec::new())
        }
    }

    #[must_use]
    pub fn answering(mut self, outcome: OrderOutcome) -> Self {
        self.outcome = outcome;
        self
    }

    /// Orders received so far.
    pub fn orders(&self) -> Vec<OrderRequest> {
        self.orders.lock().unwrap().clone()
    }

    pub fn catalog_calls(&self) -> usize {
        self.catalog_calls.load(Ordering::SeqCst)
    }
}

impl ShopBackend for FakeBackend {
    async fn fetch_products(&self) -> Result<Vec<Product>, BackendError> {
        self.catalog_calls.fetch_add(1, Ordering::SeqCst);
        match &self.products {
            Some(products) => Ok(products.clone()),
            None => Err(BackendError::Decode(
                serde_json::from_str::<Vec<Product>>("<html>").unwrap_err(),
            )),
        }
    }

    async fn place_order(&self, order: &OrderRequest) -> Result<OrderConfirmation, BackendError> {
        self.orders.lock().unwrap().push(order.clone());
        match &self.outcome {
            OrderOutcome::Accept(id) => Ok(OrderConfirmation {
                order_id: OrderReference::new(id.clone()),
            }),
            OrderOutcome::Reject(status) => Err(BackendError::Status {
                status: *status,
                body: "rejected".to_string(),
            }),
            OrderOutcome::Pending => std::future::pending().await,
        }
    }
}
