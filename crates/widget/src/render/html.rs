//! HTML rendering surface built on Askama templates.
//!
//! Each `render_*` call regenerates one fragment from scratch; [`HtmlSurface::page`]
//! stitches the current fragments into a full document. Hosts that patch a
//! live DOM can read the fragments individually instead.

use askama::Template;

use super::{CartItemView, CartView, CatalogView, NoticeView, Panel, ProductView, RenderSurface};

/// Product grid fragment.
#[derive(Template)]
#[template(path = "partials/catalog.html")]
struct CatalogTemplate<'a> {
    products: &'a [ProductView],
}

/// Cart lines fragment.
#[derive(Template)]
#[template(path = "partials/cart_items.html")]
struct CartItemsTemplate<'a> {
    items: &'a [CartItemView],
    total: &'a str,
}

/// Cart count badge fragment.
#[derive(Template)]
#[template(path = "partials/cart_count.html")]
struct CartCountTemplate {
    count: u32,
}

/// Notification stack fragment.
#[derive(Template)]
#[template(path = "partials/notifications.html")]
struct NotificationsTemplate<'a> {
    notices: &'a [NoticeView],
}

/// Full widget document.
#[derive(Template)]
#[template(path = "widget.html")]
struct PageTemplate<'a> {
    catalog_html: &'a str,
    cart_items_html: &'a str,
    cart_count_html: &'a str,
    notifications_html: &'a str,
    cart_open: bool,
    checkout_open: bool,
    form_generation: usize,
}

/// A [`RenderSurface`] that keeps rendered HTML fragments in memory.
#[derive(Debug, Default, Clone)]
pub struct HtmlSurface {
    catalog_html: String,
    cart_items_html: String,
    cart_count_html: String,
    cart_total: String,
    notifications_html: String,
    panel: Panel,
    alerts: Vec<String>,
    form_resets: usize,
}

impl HtmlSurface {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn catalog_html(&self) -> &str {
        &self.catalog_html
    }

    #[must_use]
    pub fn cart_items_html(&self) -> &str {
        &self.cart_items_html
    }

    #[must_use]
    pub fn cart_count_html(&self) -> &str {
        &self.cart_count_html
    }

    /// Last rendered grand total text.
    #[must_use]
    pub fn cart_total(&self) -> &str {
        &self.cart_total
    }

    #[must_use]
    pub fn notifications_html(&self) -> &str {
        &self.notifications_html
    }

    #[must_use]
    pub const fn panel(&self) -> Panel {
        self.panel
    }

    /// Blocking messages shown so far, oldest first.
    #[must_use]
    pub fn alerts(&self) -> &[String] {
        &self.alerts
    }

    /// Most recent blocking message.
    #[must_use]
    pub fn last_alert(&self) -> Option<&str> {
        self.alerts.last().map(String::as_str)
    }

    /// How many times the checkout form has been cleared.
    #[must_use]
    pub const fn form_resets(&self) -> usize {
        self.form_resets
    }

    /// Render the whole widget as one HTML document.
    ///
    /// # Errors
    ///
    /// Returns an error if the page template fails to render.
    pub fn page(&self) -> askama::Result<String> {
        PageTemplate {
            catalog_html: &self.catalog_html,
            cart_items_html: &self.cart_items_html,
            cart_count_html: &self.cart_count_html,
            notifications_html: &self.notifications_html,
            cart_open: self.panel == Panel::Cart,
            checkout_open: self.panel == Panel::Checkout,
            form_generation: self.form_resets,
        }
        .render()
    }
}

/// Render a fragment, keeping the previous output if the template fails.
fn replace_with(target: &mut String, fragment: &'static str, rendered: askama::Result<String>) {
    match rendered {
        Ok(html) => *target = html,
        Err(e) => tracing::error!(error = %e, fragment, "failed to render fragment"),
    }
}

impl RenderSurface for HtmlSurface {
    fn render_catalog(&mut self, catalog: &CatalogView) {
        let rendered = CatalogTemplate {
            products: &catalog.products,
        }
        .render();
        replace_with(&mut self.catalog_html, "catalog", rendered);
    }

    fn render_cart(&mut self, cart: &CartView) {
        let rendered = CartItemsTemplate {
            items: &cart.items,
            total: &cart.total,
        }
        .render();
        replace_with(&mut self.cart_items_html, "cart_items", rendered);

        let rendered = CartCountTemplate {
            count: cart.item_count,
        }
        .render();
        replace_with(&mut self.cart_count_html, "cart_count", rendered);

        self.cart_total.clone_from(&cart.total);
    }

    fn render_notifications(&mut self, notices: &[NoticeView]) {
        let rendered = NotificationsTemplate { notices }.render();
        replace_with(&mut self.notifications_html, "notifications", rendered);
    }

    fn show_panel(&mut self, panel: Panel) {
        self.panel = panel;
    }

    fn alert(&mut self, message: &str) {
        self.alerts.push(message.to_string());
    }

    fn reset_checkout_form(&mut self) {
        self.form_resets += 1;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use shopcart_core::{CartLineItem, CartTotals, Price, ProductId};

    use super::*;
    use crate::catalog::Catalog;

    #[test]
    fn test_catalog_fragment() {
        let mut surface = HtmlSurface::new();
        surface.render_catalog(&CatalogView::new(&Catalog::fallback(), "Rs"));

        let html = surface.catalog_html();
        assert_eq!(html.matches("class=\"product-card\"").count(), 4);
        assert!(html.contains("<h3>Bluetooth Speaker</h3>"));
        assert!(html.contains("Rs599.00"));
        assert!(html.contains(r#"data-action="add-to-cart" data-id="3""#));
    }

    #[test]
    fn test_catalog_fragment_escapes_names() {
        let mut surface = HtmlSurface::new();
        surface.render_catalog(&CatalogView {
            products: vec![ProductView {
                id: 9,
                name: "<script>alert(1)</script>".to_string(),
                description: String::new(),
                price: "Rs1.00".to_string(),
                image: String::new(),
            }],
        });
        assert!(!surface.catalog_html().contains("<script>"));
    }

    #[test]
    fn test_cart_fragments() {
        let items = vec![CartLineItem {
            id: ProductId::new(1),
            name: "Ear Pods".to_string(),
            price: Price::from_major(999),
            image: "e.jpg".to_string(),
            quantity: 2,
        }];
        let mut surface = HtmlSurface::new();
        surface.render_cart(&CartView::new(
            &items,
            CartTotals::from_items(&items).unwrap(),
            "Rs",
        ));

        assert!(surface.cart_items_html().contains("Rs999.00 x 2"));
        assert!(surface.cart_items_html().contains(r#"data-action="remove-item" data-id="1""#));
        assert!(surface.cart_items_html().contains("1998.00"));
        assert!(surface.cart_count_html().contains(">2<"));
        assert_eq!(surface.cart_total(), "1998.00");

        surface.render_cart(&CartView::empty());
        assert!(!surface.cart_items_html().contains("Ear Pods"));
        assert!(surface.cart_count_html().contains(">0<"));
    }

    #[test]
    fn test_notifications_fragment() {
        let mut surface = HtmlSurface::new();
        surface.render_notifications(&[NoticeView {
            message: "Ear Pods added to cart!".to_string(),
        }]);
        assert!(surface.notifications_html().contains("Ear Pods added to cart!"));

        surface.render_notifications(&[]);
        assert!(!surface.notifications_html().contains("added to cart"));
    }

    #[test]
    fn test_page_reflects_panel() {
        let mut surface = HtmlSurface::new();
        surface.render_catalog(&CatalogView::new(&Catalog::fallback(), "Rs"));
        surface.render_cart(&CartView::empty());
        surface.show_panel(Panel::Checkout);

        let page = surface.page().unwrap();
        assert!(page.contains("Ear Pods"));
        assert!(page.contains(r#"class="checkout-modal open""#));
        assert!(page.contains(r#"class="cart-modal""#));
    }
}
