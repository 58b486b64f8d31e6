//! Rendering surface port and the view models it consumes.
//!
//! The widget never patches a display incrementally: every call hands the
//! surface a complete view (catalog, cart, notifications) to replace what it
//! showed before. Controls in the rendered output carry an action name and an
//! item id; the host feeds those back through
//! [`WidgetEvent::from_control`](crate::widget::WidgetEvent::from_control).

mod html;

pub use html::HtmlSurface;

use shopcart_core::{CartLineItem, CartTotals};

use crate::catalog::Catalog;
use crate::notify::Notice;

/// Which overlay panel is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Panel {
    #[default]
    Closed,
    Cart,
    Checkout,
}

/// Output side of the widget.
pub trait RenderSurface {
    /// Replace the product list.
    fn render_catalog(&mut self, catalog: &CatalogView);

    /// Replace the cart lines, total and badge.
    fn render_cart(&mut self, cart: &CartView);

    /// Replace the notification stack.
    fn render_notifications(&mut self, notices: &[NoticeView]);

    /// Show one panel (or none).
    fn show_panel(&mut self, panel: Panel);

    /// Show a blocking message.
    fn alert(&mut self, message: &str);

    /// Clear the checkout form fields.
    fn reset_checkout_form(&mut self);
}

// =============================================================================
// View Models
// =============================================================================

/// Product card display data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductView {
    pub id: i32,
    pub name: String,
    pub description: String,
    /// Formatted with currency symbol, e.g. `Rs999.00`.
    pub price: String,
    pub image: String,
}

/// Catalog display data.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CatalogView {
    pub products: Vec<ProductView>,
}

impl CatalogView {
    #[must_use]
    pub fn new(catalog: &Catalog, currency_symbol: &str) -> Self {
        Self {
            products: catalog
                .products()
                .iter()
                .map(|p| ProductView {
                    id: p.id.as_i32(),
                    name: p.name.clone(),
                    description: p.description.clone(),
                    price: p.price.display_with(currency_symbol),
                    image: p.image.clone(),
                })
                .collect(),
        }
    }
}

/// Cart line display data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartItemView {
    pub id: i32,
    pub name: String,
    pub image: String,
    /// Unit price with symbol.
    pub price: String,
    pub quantity: u32,
    /// `price * quantity` with symbol.
    pub line_price: String,
}

/// Cart display data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartView {
    pub items: Vec<CartItemView>,
    /// Grand total, two decimals, no symbol (e.g. `1998.00`).
    pub total: String,
    /// Badge count: sum of quantities.
    pub item_count: u32,
}

impl CartView {
    /// Build the view from the cart lines and the totals already derived
    /// from them.
    #[must_use]
    pub fn new(items: &[CartLineItem], totals: CartTotals, currency_symbol: &str) -> Self {
        Self {
            items: items
                .iter()
                .map(|line| CartItemView {
                    id: line.id.as_i32(),
                    name: line.name.clone(),
                    image: line.image.clone(),
                    price: line.price.display_with(currency_symbol),
                    quantity: line.quantity,
                    line_price: line
                        .line_price()
                        .map_or_else(String::new, |price| price.display_with(currency_symbol)),
                })
                .collect(),
            total: totals.total_price.to_string(),
            item_count: totals.total_items,
        }
    }

    /// An empty cart.
    #[must_use]
    pub fn empty() -> Self {
        Self::new(&[], CartTotals::default(), "")
    }
}

/// Notification display data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoticeView {
    pub message: String,
}

impl From<&Notice> for NoticeView {
    fn from(notice: &Notice) -> Self {
        Self {
            message: notice.message.clone(),
        }
    }
}
