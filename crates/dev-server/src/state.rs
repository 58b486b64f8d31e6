//! Application state shared across handlers.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use shopcart_core::{OrderRequest, Product};
use tokio::sync::RwLock;

/// Seed catalog served by `GET /api/products`.
const SEED_PRODUCTS: &str = include_str!("../data/products.json");

/// An accepted order, kept in memory for the life of the process.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredOrder {
    pub order_id: String,
    pub placed_at: DateTime<Utc>,
    #[serde(flatten)]
    pub request: OrderRequest,
}

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`. Orders live only in memory.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    products: Vec<Product>,
    orders: RwLock<Vec<StoredOrder>>,
}

impl AppState {
    /// Create state serving `products`.
    #[must_use]
    pub fn new(products: Vec<Product>) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                products,
                orders: RwLock::new(Vec::new()),
            }),
        }
    }

    /// Create state serving the bundled seed catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if the bundled catalog does not parse.
    pub fn with_seed_products() -> Result<Self, serde_json::Error> {
        Ok(Self::new(serde_json::from_str(SEED_PRODUCTS)?))
    }

    /// The catalog.
    #[must_use]
    pub fn products(&self) -> &[Product] {
        &self.inner.products
    }

    /// Record an accepted order and return its stored form.
    pub async fn record_order(&self, order_id: String, request: OrderRequest) -> StoredOrder {
        let stored = StoredOrder {
            order_id,
            placed_at: Utc::now(),
            request,
        };
        self.inner.orders.write().await.push(stored.clone());
        stored
    }

    /// All accepted orders, oldest first.
    pub async fn orders(&self) -> Vec<StoredOrder> {
        self.inner.orders.read().await.clone()
    }

    /// Look up an accepted order.
    pub async fn order(&self, order_id: &str) -> Option<StoredOrder> {
        self.inner
            .orders
            .read()
            .await
            .iter()
            .find(|order| order.order_id == order_id)
            .cloned()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_products() {
        let state = AppState::with_seed_products().unwrap();
        let names: Vec<&str> = state.products().iter().map(|p| p.name.as_str()).collect();
        assert_eq!(
            names,
            ["Ear Pods", "Smart Watch", "Bluetooth Speaker", "Laptop Backpack"]
        );
        assert_eq!(state.products()[2].price.to_string(), "599.00");
    }
}
