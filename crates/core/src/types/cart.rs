//! Cart line items and derived totals.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{Price, Product, ProductId};

/// One line of the cart.
///
/// A cart holds at most one line per product id; adding the same product
/// again bumps `quantity` instead. This is also the persisted and submitted
/// representation, so field names are part of the wire format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLineItem {
    pub id: ProductId,
    pub name: String,
    pub price: Price,
    pub image: String,
    /// Always at least 1 for lines held by a cart.
    pub quantity: u32,
}

impl CartLineItem {
    /// A new line for one unit of `product`.
    #[must_use]
    pub fn from_product(product: &Product) -> Self {
        Self {
            id: product.id,
            name: product.name.clone(),
            price: product.price,
            image: product.image.clone(),
            quantity: 1,
        }
    }

    /// `price * quantity`, or `None` if that does not fit a [`Price`].
    #[must_use]
    pub fn line_price(&self) -> Option<Price> {
        self.price.checked_times(self.quantity)
    }
}

/// Cart totals cannot be represented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("cart totals overflowed")]
pub struct TotalsOverflow;

/// Values derived from a sequence of cart lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CartTotals {
    /// Sum of quantities; shown on the cart badge.
    pub total_items: u32,
    /// Sum of line prices, unrounded.
    pub total_price: Price,
}

impl CartTotals {
    /// Compute totals for `items`.
    ///
    /// # Errors
    ///
    /// Returns [`TotalsOverflow`] if the quantity or price sum overflows.
    pub fn from_items(items: &[CartLineItem]) -> Result<Self, TotalsOverflow> {
        items.iter().try_fold(Self::default(), |totals, item| {
            let total_items = totals
                .total_items
                .checked_add(item.quantity)
                .ok_or(TotalsOverflow)?;
            let total_price = item
                .line_price()
                .and_then(|line| totals.total_price.checked_add(line))
                .ok_or(TotalsOverflow)?;
            Ok(Self {
                total_items,
                total_price,
            })
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn line(id: i32, price: i64, quantity: u32) -> CartLineItem {
        CartLineItem {
            id: ProductId::new(id),
            name: format!("Product {id}"),
            price: Price::from_major(price),
            image: String::new(),
            quantity,
        }
    }

    #[test]
    fn test_totals() {
        let totals = CartTotals::from_items(&[line(1, 999, 2), line(3, 599, 1)]).unwrap();
        assert_eq!(totals.total_items, 3);
        assert_eq!(totals.total_price, Price::from_major(2597));
    }

    #[test]
    fn test_totals_of_empty_cart() {
        assert_eq!(CartTotals::from_items(&[]), Ok(CartTotals::default()));
    }

    #[test]
    fn test_totals_overflow() {
        let mut huge = line(1, 0, 2);
        huge.price = serde_json::from_str("40000000000000000000000000000").unwrap();
        assert_eq!(huge.line_price(), None);
        assert_eq!(CartTotals::from_items(&[huge]), Err(TotalsOverflow));

        let many = line(2, 1, u32::MAX);
        assert_eq!(CartTotals::from_items(&[many.clone(), many]), Err(TotalsOverflow));
    }

    #[test]
    fn test_wire_shape() {
        let json = serde_json::to_value(line(1, 999, 2)).unwrap();
        assert_eq!(json["id"], 1);
        assert_eq!(json["quantity"], 2);
        assert_eq!(json["price"].as_f64(), Some(999.0));
        assert_eq!(json["name"], "Product 1");
    }
}
