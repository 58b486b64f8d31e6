//! Order submission types for `POST /api/orders`.

use core::fmt;

use serde::{Deserialize, Deserializer, Serialize};

use super::{CartLineItem, CartTotals, Email, Price, TotalsOverflow};

/// Customer details collected by the checkout form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub name: String,
    pub email: Email,
    pub address: String,
}

/// Request body for order creation.
///
/// `total` is the displayed total, i.e. the line sum rounded to two decimals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRequest {
    pub customer: Customer,
    pub payment_method: String,
    pub items: Vec<CartLineItem>,
    pub total: Price,
}

impl OrderRequest {
    /// Build a request from a cart snapshot, deriving the total from `items`.
    ///
    /// # Errors
    ///
    /// Returns [`TotalsOverflow`] if the items cannot be totalled.
    pub fn new(
        customer: Customer,
        payment_method: impl Into<String>,
        items: Vec<CartLineItem>,
    ) -> Result<Self, TotalsOverflow> {
        let total = CartTotals::from_items(&items)?.total_price.to_cents();
        Ok(Self {
            customer,
            payment_method: payment_method.into(),
            items,
            total,
        })
    }
}

/// Successful order creation response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderConfirmation {
    pub order_id: OrderReference,
}

/// Backend-assigned order identifier.
///
/// Backends answer with either a string or a number; both are kept as text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct OrderReference(String);

impl OrderReference {
    /// Create an order reference.
    #[must_use]
    pub fn new(reference: impl Into<String>) -> Self {
        Self(reference.into())
    }

    /// The reference as shown to the customer.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OrderReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for OrderReference {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Integer(i64),
            Unsigned(u64),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Text(s) => Self(s),
            Raw::Integer(n) => Self(n.to_string()),
            Raw::Unsigned(n) => Self(n.to_string()),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::ProductId;

    fn customer() -> Customer {
        Customer {
            name: "Asha Rao".to_string(),
            email: Email::parse("asha@example.in").unwrap(),
            address: "12 MG Road, Bengaluru".to_string(),
        }
    }

    #[test]
    fn test_request_wire_shape() {
        let items = vec![CartLineItem {
            id: ProductId::new(1),
            name: "Ear Pods".to_string(),
            price: Price::from_major(999),
            image: "https://img.example/1.jpg".to_string(),
            quantity: 2,
        }];
        let request = OrderRequest::new(customer(), "cod", items).unwrap();
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["customer"]["email"], "asha@example.in");
        assert_eq!(json["paymentMethod"], "cod");
        assert_eq!(json["items"][0]["quantity"], 2);
        assert_eq!(json["total"].as_f64(), Some(1998.0));
    }

    #[test]
    fn test_total_is_rounded_to_cents() {
        let items = vec![CartLineItem {
            id: ProductId::new(9),
            name: "Sticker".to_string(),
            price: Price::new(rust_decimal::Decimal::new(3335, 3)), // 3.335
            image: String::new(),
            quantity: 1,
        }];
        let request = OrderRequest::new(customer(), "card", items).unwrap();
        assert_eq!(request.total, Price::from_minor(334));
    }

    #[test]
    fn test_confirmation_accepts_string_or_number() {
        let text: OrderConfirmation = serde_json::from_str(r#"{"orderId":"X"}"#).unwrap();
        assert_eq!(text.order_id.as_str(), "X");

        let number: OrderConfirmation = serde_json::from_str(r#"{"orderId":1042}"#).unwrap();
        assert_eq!(number.order_id.to_string(), "1042");

        assert!(serde_json::from_str::<OrderConfirmation>(r#"{"id":"X"}"#).is_err());
    }
}
