//! Catalog product type.

use serde::{Deserialize, Serialize};

use super::{Price, ProductId};

/// A product as served by `GET /api/products`.
///
/// Products are read-only on the client. The widget keeps the structured
/// value around so "Add to Cart" never has to recover a name or price from
/// rendered markup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub price: Price,
    pub description: String,
    /// Image URL, passed through to `<img src>` unchanged.
    pub image: String,
}

impl Product {
    /// Create a product.
    #[must_use]
    pub fn new(
        id: ProductId,
        name: impl Into<String>,
        price: Price,
        description: impl Into<String>,
        image: impl Into<String>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            price,
            description: description.into(),
            image: image.into(),
        }
    }
}
