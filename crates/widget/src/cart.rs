//! Client-side cart store.
//!
//! The store is an owned value constructed once per session and handed to
//! the widget controller. It is the only writer of the persisted cart: every
//! mutation is followed by a `save` through the [`CartStorage`] port.
//!
//! Invariants: at most one line per product id, every line has
//! `quantity >= 1` and a valid unit price, and the totals fit a [`Price`].

use shopcart_core::{CartLineItem, CartTotals, Price, Product, ProductId, TotalsOverflow};
use thiserror::Error;
use tracing::instrument;

use crate::storage::{CartStorage, StorageError};

/// Errors from cart mutations.
#[derive(Debug, Error)]
pub enum CartError {
    /// The mutation was applied but could not be persisted.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// The mutation would make the totals unrepresentable; nothing changed.
    #[error("Cart total too large: {0}")]
    Overflow(#[from] TotalsOverflow),

    /// The product's price is negative or implausibly large; nothing changed.
    #[error("Product {0} has an invalid price")]
    InvalidPrice(ProductId),
}

/// Ordered cart lines mirrored to persistent storage.
#[derive(Debug)]
pub struct CartStore<S> {
    items: Vec<CartLineItem>,
    totals: CartTotals,
    storage: S,
}

impl<S: CartStorage> CartStore<S> {
    /// Open the store, restoring whatever `storage` holds.
    ///
    /// Missing or unreadable data yields an empty cart, and so does a cart
    /// whose totals overflow. The problem is logged and never surfaced to the
    /// customer.
    pub fn open(storage: S) -> Self {
        let items = match storage.load() {
            Ok(Some(items)) => normalize(items),
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::warn!(error = %e, "discarding unreadable persisted cart");
                Vec::new()
            }
        };

        let (items, totals) = match CartTotals::from_items(&items) {
            Ok(totals) => (items, totals),
            Err(e) => {
                tracing::warn!(error = %e, lines = items.len(), "discarding persisted cart");
                (Vec::new(), CartTotals::default())
            }
        };

        tracing::debug!(lines = items.len(), "cart restored");
        Self {
            items,
            totals,
            storage,
        }
    }

    /// Add one unit of `product`.
    ///
    /// Bumps the quantity of an existing line or appends a new line with
    /// quantity 1, then persists.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::InvalidPrice`] or [`CartError::Overflow`] without
    /// changing anything, or [`CartError::Storage`] if persisting fails (the
    /// in-memory cart keeps the change in that case).
    #[instrument(skip(self, product), fields(product_id = %product.id))]
    pub fn add(&mut self, product: &Product) -> Result<(), CartError> {
        if !product.price.is_valid_unit_price() {
            return Err(CartError::InvalidPrice(product.id));
        }

        let mut items = self.items.clone();
        if let Some(line) = items.iter_mut().find(|line| line.id == product.id) {
            line.quantity = line.quantity.checked_add(1).ok_or(TotalsOverflow)?;
        } else {
            items.push(CartLineItem::from_product(product));
        }

        self.totals = CartTotals::from_items(&items)?;
        self.items = items;
        Ok(self.persist()?)
    }

    /// Remove the line for `id`. Returns whether a line was removed.
    ///
    /// Persists even when nothing matched, so the stored value always
    /// reflects the last mutation request.
    ///
    /// # Errors
    ///
    /// Returns an error if persisting fails.
    #[instrument(skip(self))]
    pub fn remove(&mut self, id: ProductId) -> Result<bool, CartError> {
        let before = self.items.len();
        let items: Vec<CartLineItem> = self
            .items
            .iter()
            .filter(|line| line.id != id)
            .cloned()
            .collect();
        let removed = items.len() != before;

        self.totals = CartTotals::from_items(&items)?;
        self.items = items;
        self.persist()?;
        Ok(removed)
    }

    /// Empty the cart. Only used after an order is placed.
    ///
    /// # Errors
    ///
    /// Returns an error if persisting fails.
    #[instrument(skip(self))]
    pub fn clear(&mut self) -> Result<(), StorageError> {
        self.items.clear();
        self.totals = CartTotals::default();
        self.persist()
    }

    /// Write the current lines through the storage port.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage write fails.
    pub fn persist(&mut self) -> Result<(), StorageError> {
        self.storage.save(&self.items)
    }

    /// An owned copy of the current lines.
    #[must_use]
    pub fn snapshot(&self) -> Vec<CartLineItem> {
        self.items.clone()
    }

    /// The current lines, in insertion order.
    #[must_use]
    pub fn items(&self) -> &[CartLineItem] {
        &self.items
    }

    /// Quantity held for `id` (0 when absent).
    #[must_use]
    pub fn quantity_of(&self, id: ProductId) -> u32 {
        self.items
            .iter()
            .find(|line| line.id == id)
            .map_or(0, |line| line.quantity)
    }

    /// Derived item count and price.
    #[must_use]
    pub const fn totals(&self) -> CartTotals {
        self.totals
    }

    /// Sum of quantities.
    #[must_use]
    pub const fn total_items(&self) -> u32 {
        self.totals.total_items
    }

    /// Sum of line prices.
    #[must_use]
    pub const fn total_price(&self) -> Price {
        self.totals.total_price
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The storage port.
    #[must_use]
    pub const fn storage(&self) -> &S {
        &self.storage
    }
}

/// Restore the invariants on data written by someone else: drop lines with
/// zero quantity or an invalid price, and merge repeated ids (first position
/// wins).
fn normalize(items: Vec<CartLineItem>) -> Vec<CartLineItem> {
    let mut merged: Vec<CartLineItem> = Vec::with_capacity(items.len());
    for item in items {
        if item.quantity == 0 {
            continue;
        }
        if !item.price.is_valid_unit_price() {
            tracing::warn!(product_id = %item.id, price = %item.price, "dropping persisted line with invalid price");
            continue;
        }
        match merged.iter_mut().find(|line| line.id == item.id) {
            Some(line) => line.quantity = line.quantity.saturating_add(item.quantity),
            None => merged.push(item),
        }
    }
    merged
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::storage::{JsonCartStorage, KeyValueStore, MemoryStore};

    fn product(id: i32, price: i64) -> Product {
        Product::new(
            ProductId::new(id),
            format!("Product {id}"),
            Price::from_major(price),
            "desc",
            format!("https://img.example/{id}.jpg"),
        )
    }

    fn store() -> (CartStore<JsonCartStorage<MemoryStore>>, MemoryStore) {
        let kv = MemoryStore::new();
        (CartStore::open(JsonCartStorage::new(kv.clone(), "cart")), kv)
    }

    fn persisted(kv: &MemoryStore) -> Vec<CartLineItem> {
        serde_json::from_str(&kv.get_item("cart").unwrap().unwrap()).unwrap()
    }

    /// Deterministic generator for the mutation sequence.
    struct Lcg(u64);

    impl Lcg {
        fn next(&mut self) -> u64 {
            self.0 = self
                .0
                .wrapping_mul(6_364_136_223_846_793_005)
                .wrapping_add(1_442_695_040_888_963_407);
            self.0 >> 33
        }
    }

    #[test]
    fn test_add_twice_increments_quantity() {
        let (mut cart, kv) = store();
        let ear_pods = product(1, 999);

        cart.add(&ear_pods).unwrap();
        cart.add(&ear_pods).unwrap();

        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.quantity_of(ProductId::new(1)), 2);
        assert_eq!(cart.total_items(), 2);
        assert_eq!(cart.total_price().to_string(), "1998.00");
        assert_eq!(persisted(&kv), cart.snapshot());
    }

    #[test]
    fn test_add_appends_in_insertion_order() {
        let (mut cart, _) = store();
        cart.add(&product(3, 599)).unwrap();
        cart.add(&product(1, 999)).unwrap();
        cart.add(&product(3, 599)).unwrap();

        let ids: Vec<i32> = cart.items().iter().map(|l| l.id.as_i32()).collect();
        assert_eq!(ids, vec![3, 1]);
        assert_eq!(cart.quantity_of(ProductId::new(1)), 1);
    }

    #[test]
    fn test_remove() {
        let (mut cart, kv) = store();
        cart.add(&product(1, 999)).unwrap();
        cart.add(&product(2, 1999)).unwrap();

        assert!(cart.remove(ProductId::new(1)).unwrap());
        assert!(!cart.remove(ProductId::new(1)).unwrap());
        assert_eq!(cart.quantity_of(ProductId::new(2)), 1);
        assert_eq!(persisted(&kv), cart.snapshot());
    }

    #[test]
    fn test_clear_persists_empty_sequence() {
        let (mut cart, kv) = store();
        cart.add(&product(1, 999)).unwrap();
        cart.clear().unwrap();

        assert!(cart.is_empty());
        assert_eq!(kv.get_item("cart").unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn test_open_restores_persisted_cart() {
        let kv = MemoryStore::with_item(
            "cart",
            r#"[{"id":2,"name":"Smart Watch","price":1999,"image":"w.jpg","quantity":3}]"#,
        );
        let cart = CartStore::open(JsonCartStorage::new(kv, "cart"));
        assert_eq!(cart.total_items(), 3);
        assert_eq!(cart.total_price(), Price::from_major(5997));
    }

    #[test]
    fn test_open_treats_corrupt_data_as_empty() {
        let kv = MemoryStore::with_item("cart", "[{\"id\":");
        let cart = CartStore::open(JsonCartStorage::new(kv, "cart"));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_open_merges_duplicates_and_drops_empty_lines() {
        let kv = MemoryStore::with_item(
            "cart",
            r#"[{"id":1,"name":"A","price":10,"image":"","quantity":1},
                {"id":2,"name":"B","price":20,"image":"","quantity":0},
                {"id":1,"name":"A","price":10,"image":"","quantity":2}]"#,
        );
        let cart = CartStore::open(JsonCartStorage::new(kv, "cart"));
        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.quantity_of(ProductId::new(1)), 3);
    }

    #[test]
    fn test_open_discards_cart_whose_totals_overflow() {
        let kv = MemoryStore::with_item(
            "cart",
            r#"[{"id":1,"name":"A","price":900000000000,"image":"","quantity":4294967295},
                {"id":2,"name":"B","price":900000000000,"image":"","quantity":4294967295}]"#,
        );
        let cart = CartStore::open(JsonCartStorage::new(kv, "cart"));
        assert!(cart.is_empty());
        assert_eq!(cart.total_price(), Price::ZERO);
    }

    #[test]
    fn test_open_drops_lines_with_invalid_prices() {
        let kv = MemoryStore::with_item(
            "cart",
            r#"[{"id":1,"name":"A","price":40000000000000000000000000000,"image":"","quantity":2},
                {"id":2,"name":"B","price":-5,"image":"","quantity":1},
                {"id":3,"name":"C","price":10,"image":"","quantity":1}]"#,
        );
        let cart = CartStore::open(JsonCartStorage::new(kv, "cart"));
        let ids: Vec<i32> = cart.items().iter().map(|l| l.id.as_i32()).collect();
        assert_eq!(ids, vec![3]);
        assert_eq!(cart.total_price(), Price::from_major(10));
    }

    #[test]
    fn test_add_rejects_invalid_price() {
        let (mut cart, kv) = store();
        let refund = product(5, -100);

        let err = cart.add(&refund).unwrap_err();

        assert!(matches!(err, CartError::InvalidPrice(id) if id == ProductId::new(5)));
        assert!(cart.is_empty());
        assert!(kv.get_item("cart").unwrap().is_none());
    }

    #[test]
    fn test_add_rejects_quantity_overflow() {
        let kv = MemoryStore::with_item(
            "cart",
            r#"[{"id":1,"name":"Product 1","price":1,"image":"","quantity":4294967295}]"#,
        );
        let mut cart = CartStore::open(JsonCartStorage::new(kv, "cart"));

        let err = cart.add(&product(1, 1)).unwrap_err();

        assert!(matches!(err, CartError::Overflow(_)));
        assert_eq!(cart.quantity_of(ProductId::new(1)), u32::MAX);
        assert_eq!(cart.total_items(), u32::MAX);
    }

    #[test]
    fn test_random_mutations_keep_invariants() {
        let (mut cart, kv) = store();
        let catalog: Vec<Product> = (1..=5).map(|id| product(id, i64::from(id) * 100)).collect();
        let mut rng = Lcg(0x5eed);

        for _ in 0..500 {
            let pick = usize::try_from(rng.next() % 5).unwrap();
            let target = &catalog[pick];
            if rng.next() % 3 == 0 {
                cart.remove(target.id).unwrap();
            } else {
                cart.add(target).unwrap();
            }

            let mut ids: Vec<ProductId> = cart.items().iter().map(|l| l.id).collect();
            ids.sort();
            ids.dedup();
            assert_eq!(ids.len(), cart.items().len(), "duplicate line ids");
            assert!(cart.items().iter().all(|l| l.quantity >= 1));

            let quantity_sum: u32 = cart.items().iter().map(|l| l.quantity).sum();
            assert_eq!(cart.total_items(), quantity_sum);
            let price_sum = cart.items().iter().fold(Price::ZERO, |acc, l| {
                acc.checked_add(l.line_price().unwrap()).unwrap()
            });
            assert_eq!(cart.total_price(), price_sum);

            assert_eq!(persisted(&kv), cart.snapshot());
        }
    }
}
