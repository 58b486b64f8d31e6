//! Catalog loading with a built-in fallback.
//!
//! The catalog is fetched once per widget. Any failure (unreachable backend,
//! non-2xx status, malformed body) is logged and replaced by the four
//! products below so the storefront is never empty. A backend catalog with
//! any negative or implausibly large price counts as malformed.

use std::collections::HashMap;

use shopcart_core::{Price, Product, ProductId};
use tracing::instrument;

use crate::backend::ShopBackend;

/// Where a loaded catalog came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogSource {
    Backend,
    Fallback,
}

/// Products available for this session, kept as structured data so add
/// controls only need to carry an id.
#[derive(Debug, Clone)]
pub struct Catalog {
    products: Vec<Product>,
    index: HashMap<ProductId, usize>,
    source: CatalogSource,
}

impl Catalog {
    /// Build a catalog. When ids repeat, the first product wins the lookup.
    #[must_use]
    pub fn new(products: Vec<Product>, source: CatalogSource) -> Self {
        let mut index = HashMap::with_capacity(products.len());
        for (pos, product) in products.iter().enumerate() {
            index.entry(product.id).or_insert(pos);
        }
        Self {
            products,
            index,
            source,
        }
    }

    /// The built-in fallback catalog.
    #[must_use]
    pub fn fallback() -> Self {
        Self::new(fallback_products(), CatalogSource::Fallback)
    }

    /// Products in display order.
    #[must_use]
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    /// Look up a product by id.
    #[must_use]
    pub fn get(&self, id: ProductId) -> Option<&Product> {
        self.index.get(&id).and_then(|&pos| self.products.get(pos))
    }

    #[must_use]
    pub const fn source(&self) -> CatalogSource {
        self.source
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.products.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

/// Fetch the catalog from `backend`, falling back on any failure.
#[instrument(skip(backend))]
pub async fn load_catalog<B: ShopBackend>(backend: &B) -> Catalog {
    match backend.fetch_products().await {
        Ok(products) if products.iter().any(|p| !p.price.is_valid_unit_price()) => {
            let bad: Vec<ProductId> = products
                .iter()
                .filter(|p| !p.price.is_valid_unit_price())
                .map(|p| p.id)
                .collect();
            tracing::warn!(?bad, "catalog has invalid prices, using fallback products");
            Catalog::fallback()
        }
        Ok(products) => {
            tracing::info!(count = products.len(), "catalog loaded from backend");
            Catalog::new(products, CatalogSource::Backend)
        }
        Err(e) => {
            tracing::warn!(error = %e, "catalog fetch failed, using fallback products");
            Catalog::fallback()
        }
    }
}

/// The four products shown when the backend cannot be used.
#[must_use]
pub fn fallback_products() -> Vec<Product> {
    vec![
        Product::new(
            ProductId::new(1),
            "Ear Pods",
            Price::from_major(999),
            "High-quality wireless headphones.",
            "https://assets.myntassets.com/dpr_1.5,q_30,w_400,c_limit,fl_progressive/assets/images/26979154/2024/1/22/bf61e27c-4632-4d07-a84b-6996aad7ace71705918420818-OnePlus-Unisex-Headphones-7001705918420624-1.jpg",
        ),
        Product::new(
            ProductId::new(2),
            "Smart Watch",
            Price::from_major(1999),
            "Feature-rich smartwatch with health monitoring.",
            "https://m.media-amazon.com/images/I/51pipGoHHFL._SR290,290_.jpg",
        ),
        Product::new(
            ProductId::new(3),
            "Bluetooth Speaker",
            Price::from_major(599),
            "Portable speaker with 20-hour battery life.",
            "https://encrypted-tbn0.gstatic.com/images?q=tbn:ANd9GcQtq4xRg2NCxfEirXsxcfPA5NNjGGkjnNzEKA&s",
        ),
        Product::new(
            ProductId::new(4),
            "Laptop Backpack",
            Price::from_major(1599),
            "Durable backpack with USB charging port.",
            "https://m.media-amazon.com/images/I/71mM5CQjEhL._UY1100_.jpg",
        ),
    ]
}
