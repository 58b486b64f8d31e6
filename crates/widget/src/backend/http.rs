//! `reqwest` implementation of [`ShopBackend`].

use std::sync::Arc;

use serde::de::DeserializeOwned;
use shopcart_core::{OrderConfirmation, OrderRequest, Product};
use tracing::instrument;
use url::Url;

use super::{BackendError, ShopBackend};

const PRODUCTS_PATH: &str = "api/products";
const ORDERS_PATH: &str = "api/orders";

/// Characters of a failed response body kept for logs and errors.
const BODY_EXCERPT_CHARS: usize = 200;

/// HTTP client for the product and order endpoints.
///
/// Cheap to clone; clones share one connection pool. No timeouts and no
/// retries: a call either completes or fails once.
#[derive(Clone, Debug)]
pub struct HttpBackend {
    inner: Arc<HttpBackendInner>,
}

#[derive(Debug)]
struct HttpBackendInner {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpBackend {
    /// Create a client for the backend at `base_url`.
    #[must_use]
    pub fn new(base_url: Url) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    /// Create a client reusing an existing `reqwest::Client`.
    #[must_use]
    pub fn with_client(client: reqwest::Client, base_url: Url) -> Self {
        Self {
            inner: Arc::new(HttpBackendInner { client, base_url }),
        }
    }

    /// The base URL endpoints are resolved against.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, BackendError> {
        Ok(self.inner.base_url.join(path)?)
    }

    /// Turn a response into `T`, mapping non-2xx and bad bodies to errors.
    async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, BackendError> {
        let status = response.status();

        // Get response body as text first for better error diagnostics
        let body = response.text().await?;

        if !status.is_success() {
            let excerpt: String = body.chars().take(BODY_EXCERPT_CHARS).collect();
            tracing::warn!(status = %status, body = %excerpt, "backend returned non-success status");
            return Err(BackendError::Status {
                status,
                body: excerpt,
            });
        }

        serde_json::from_str(&body).map_err(|e| {
            tracing::warn!(
                error = %e,
                body = %body.chars().take(BODY_EXCERPT_CHARS).collect::<String>(),
                "failed to parse backend response"
            );
            BackendError::Decode(e)
        })
    }
}

impl ShopBackend for HttpBackend {
    #[instrument(skip(self), fields(base_url = %self.inner.base_url))]
    async fn fetch_products(&self) -> Result<Vec<Product>, BackendError> {
        let url = self.endpoint(PRODUCTS_PATH)?;
        let response = self
            .inner
            .client
            .get(url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;

        let products: Vec<Product> = Self::read_json(response).await?;
        tracing::debug!(count = products.len(), "fetched products");
        Ok(products)
    }

    #[instrument(skip(self, order), fields(base_url = %self.inner.base_url, items = order.items.len()))]
    async fn place_order(&self, order: &OrderRequest) -> Result<OrderConfirmation, BackendError> {
        let url = self.endpoint(ORDERS_PATH)?;
        let response = self.inner.client.post(url).json(order).send().await?;

        let confirmation: OrderConfirmation = Self::read_json(response).await?;
        tracing::info!(order_id = %confirmation.order_id, "order placed");
        Ok(confirmation)
    }
}
