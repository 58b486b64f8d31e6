//! The widget controller.
//!
//! One `Widget` per session owns the cart store, the loaded catalog, the
//! notification queue and the checkout phase. Hosts translate UI input into
//! [`WidgetEvent`]s and await [`Widget::dispatch`]; events run to completion
//! one at a time, so no locking is involved.
//!
//! # Controls
//!
//! Rendered controls are identified by an action name and, for item
//! controls, a product id:
//!
//! ```text
//! add-to-cart      data-id=<product id>
//! remove-item      data-id=<product id>
//! open-cart
//! close
//! checkout
//! ```
//!
//! The checkout form's submit button carries [`actions::SUBMIT_CHECKOUT`].
//! Its event needs the form values, so the host builds
//! [`WidgetEvent::SubmitCheckout`] itself and [`WidgetEvent::from_control`]
//! does not accept that action.

use shopcart_core::{OrderReference, ProductId};
use tokio::time::Instant;
use tracing::instrument;

use crate::backend::{HttpBackend, ShopBackend};
use crate::cart::{CartError, CartStore};
use crate::catalog::{Catalog, CatalogSource, load_catalog};
use crate::checkout::{CheckoutError, CheckoutForm, CheckoutPhase, order_placed_message};
use crate::config::WidgetConfig;
use crate::error::{Result, WidgetError};
use crate::notify::{Notifications, added_to_cart_message};
use crate::render::{CartView, CatalogView, HtmlSurface, NoticeView, Panel, RenderSurface};
use crate::storage::{CartStorage, ConfiguredStore, JsonCartStorage};
use crate::telemetry;

/// Control action names used in rendered markup.
pub mod actions {
    pub const ADD_TO_CART: &str = "add-to-cart";
    pub const REMOVE_ITEM: &str = "remove-item";
    pub const OPEN_CART: &str = "open-cart";
    pub const CLOSE: &str = "close";
    pub const CHECKOUT: &str = "checkout";
    /// Submit button of the checkout form. Not parsed by `from_control`.
    pub const SUBMIT_CHECKOUT: &str = "submit-checkout";
}

/// A customer interaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WidgetEvent {
    AddToCart(ProductId),
    RemoveFromCart(ProductId),
    OpenCart,
    /// Close buttons and clicks outside a panel.
    ClosePanels,
    Checkout,
    SubmitCheckout(CheckoutForm),
}

impl WidgetEvent {
    /// Map a rendered control (action name plus optional `data-id`) to an event.
    ///
    /// # Errors
    ///
    /// Returns [`WidgetError::UnknownControl`] for unknown actions, for item
    /// actions without a numeric id, and for [`actions::SUBMIT_CHECKOUT`].
    pub fn from_control(action: &str, id: Option<&str>) -> Result<Self> {
        let item_id = || {
            id.and_then(|raw| raw.parse::<ProductId>().ok())
                .ok_or_else(|| WidgetError::UnknownControl(format!("{action} without a valid id")))
        };

        match action {
            actions::ADD_TO_CART => Ok(Self::AddToCart(item_id()?)),
            actions::REMOVE_ITEM => Ok(Self::RemoveFromCart(item_id()?)),
            actions::OPEN_CART => Ok(Self::OpenCart),
            actions::CLOSE => Ok(Self::ClosePanels),
            actions::CHECKOUT => Ok(Self::Checkout),
            other => Err(WidgetError::UnknownControl(other.to_string())),
        }
    }
}

/// The widget a host gets from configuration alone: HTTP backend, the
/// configured key-value store and the HTML surface.
pub type ConfiguredWidget = Widget<HttpBackend, JsonCartStorage<ConfiguredStore>, HtmlSurface>;

/// Shopping cart widget for one session.
pub struct Widget<B, S, R> {
    backend: B,
    cart: CartStore<S>,
    surface: R,
    catalog: Option<Catalog>,
    notifications: Notifications,
    phase: CheckoutPhase,
    panel: Panel,
    currency_symbol: String,
}

impl<B, S, R> Widget<B, S, R>
where
    B: ShopBackend,
    S: CartStorage,
    R: RenderSurface,
{
    /// Assemble a widget from its collaborators.
    pub fn new(config: &WidgetConfig, backend: B, cart: CartStore<S>, surface: R) -> Self {
        Self {
            backend,
            cart,
            surface,
            catalog: None,
            notifications: Notifications::new(config.notification_ttl),
            phase: CheckoutPhase::Browsing,
            panel: Panel::Closed,
            currency_symbol: config.currency_symbol.clone(),
        }
    }

    /// Load and render the catalog, then render the restored cart.
    ///
    /// The catalog is loaded once; later calls return the existing source
    /// without touching the backend.
    #[instrument(skip(self))]
    pub async fn start(&mut self) -> CatalogSource {
        if let Some(catalog) = &self.catalog {
            tracing::debug!("catalog already loaded");
            return catalog.source();
        }

        let catalog = load_catalog(&self.backend).await;
        let source = catalog.source();
        self.surface
            .render_catalog(&CatalogView::new(&catalog, &self.currency_symbol));
        self.catalog = Some(catalog);

        if let Err(e) = self.cart.persist() {
            tracing::warn!(error = %e, "failed to persist restored cart");
        }
        self.render_cart();
        source
    }

    /// Handle one event to completion.
    ///
    /// Errors are logged here and returned for the host's benefit; none of
    /// them leave the widget unusable.
    ///
    /// # Errors
    ///
    /// Returns the error of the handler the event was routed to.
    pub async fn dispatch(&mut self, event: WidgetEvent) -> Result<()> {
        let outcome = match event {
            WidgetEvent::AddToCart(id) => self.add_to_cart(id),
            WidgetEvent::RemoveFromCart(id) => self.remove_from_cart(id),
            WidgetEvent::OpenCart => {
                self.open_cart();
                Ok(())
            }
            WidgetEvent::ClosePanels => {
                self.close_panels();
                Ok(())
            }
            WidgetEvent::Checkout => self.open_checkout().map_err(WidgetError::from),
            WidgetEvent::SubmitCheckout(form) => self
                .submit_checkout(&form)
                .await
                .map(|_| ())
                .map_err(WidgetError::from),
        };

        if let Err(e) = &outcome {
            tracing::warn!(error = %e, "event not fully applied");
        }
        outcome
    }

    /// Add one unit of a catalog product to the cart.
    ///
    /// # Errors
    ///
    /// Returns [`WidgetError::UnknownProduct`] for ids outside the loaded
    /// catalog and [`WidgetError::Cart`] when the cart refuses the product.
    /// A storage error means persisting failed; the cart and display are
    /// updated regardless.
    #[instrument(skip(self))]
    pub fn add_to_cart(&mut self, id: ProductId) -> Result<()> {
        let product = self
            .catalog
            .as_ref()
            .and_then(|catalog| catalog.get(id))
            .cloned()
            .ok_or(WidgetError::UnknownProduct(id))?;

        let persisted = match self.cart.add(&product) {
            Ok(()) => Ok(()),
            Err(CartError::Storage(e)) => Err(WidgetError::Storage(e)),
            Err(e) => {
                tracing::warn!(error = %e, "cart refused product");
                return Err(e.into());
            }
        };
        self.render_cart();

        telemetry::add_breadcrumb("cart", "added to cart", &[("product_id", id.to_string())]);
        self.notifications
            .push(added_to_cart_message(&product.name), Instant::now());
        self.render_notifications();

        persisted
    }

    /// Remove a line from the cart. Unknown ids are a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`WidgetError::Cart`] if persisting failed.
    #[instrument(skip(self))]
    pub fn remove_from_cart(&mut self, id: ProductId) -> Result<()> {
        let persisted = self.cart.remove(id);
        self.render_cart();

        telemetry::add_breadcrumb("cart", "removed from cart", &[("product_id", id.to_string())]);
        persisted.map(|_| ()).map_err(WidgetError::from)
    }

    /// Show the cart panel.
    pub fn open_cart(&mut self) {
        self.recover_abandoned_submit();
        if self.phase == CheckoutPhase::FormOpen {
            self.phase = CheckoutPhase::Browsing;
        }
        self.set_panel(Panel::Cart);
    }

    /// Close whichever panel is open.
    pub fn close_panels(&mut self) {
        self.recover_abandoned_submit();
        if self.phase == CheckoutPhase::FormOpen {
            self.phase = CheckoutPhase::Browsing;
        }
        self.set_panel(Panel::Closed);
    }

    /// Move from the cart to the checkout form.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::EmptyCart`] (after alerting the customer) when
    /// there is nothing to check out; nothing else changes in that case.
    #[instrument(skip(self))]
    pub fn open_checkout(&mut self) -> std::result::Result<(), CheckoutError> {
        self.recover_abandoned_submit();
        if self.cart.is_empty() {
            let err = CheckoutError::EmptyCart;
            self.surface.alert(&err.user_message());
            return Err(err);
        }

        self.phase = CheckoutPhase::FormOpen;
        self.set_panel(Panel::Checkout);
        Ok(())
    }

    /// Validate the form and submit the current cart as an order.
    ///
    /// On success the cart is cleared, panels close and the form resets. On
    /// failure the customer sees a message and the cart and form stay as they
    /// were, with the checkout panel still open.
    ///
    /// # Errors
    ///
    /// Returns why no order was placed.
    #[instrument(skip(self, form))]
    pub async fn submit_checkout(
        &mut self,
        form: &CheckoutForm,
    ) -> std::result::Result<OrderReference, CheckoutError> {
        self.recover_abandoned_submit();
        if self.phase != CheckoutPhase::FormOpen {
            return Err(CheckoutError::NotOpen);
        }

        let order = match form.to_order(self.cart.snapshot()) {
            Ok(order) => order,
            Err(e) => {
                self.surface.alert(&e.user_message());
                return Err(e);
            }
        };

        self.phase = CheckoutPhase::Submitting;
        telemetry::add_breadcrumb(
            "checkout",
            "submitting order",
            &[("items", order.items.len().to_string()), ("total", order.total.to_string())],
        );

        match self.backend.place_order(&order).await {
            Ok(confirmation) => {
                self.surface
                    .alert(&order_placed_message(&confirmation.order_id));

                if let Err(e) = self.cart.clear() {
                    tracing::warn!(error = %e, "failed to persist cleared cart");
                }
                self.render_cart();

                self.phase = CheckoutPhase::Browsing;
                self.set_panel(Panel::Closed);
                self.surface.reset_checkout_form();
                Ok(confirmation.order_id)
            }
            Err(e) => {
                telemetry::capture_error("order submission failed", &e);
                let err = CheckoutError::Backend(e);
                self.phase = CheckoutPhase::FormOpen;
                self.surface.alert(&err.user_message());
                Err(err)
            }
        }
    }

    /// Drop expired notifications, re-rendering if any went away.
    ///
    /// Returns whether the display changed.
    pub fn tick(&mut self) -> bool {
        let changed = self.notifications.prune(Instant::now());
        if changed {
            self.render_notifications();
        }
        changed
    }

    /// When [`Widget::tick`] next has something to remove.
    #[must_use]
    pub fn next_notification_expiry(&self) -> Option<Instant> {
        self.notifications.next_expiry()
    }

    #[must_use]
    pub const fn cart(&self) -> &CartStore<S> {
        &self.cart
    }

    #[must_use]
    pub const fn catalog(&self) -> Option<&Catalog> {
        self.catalog.as_ref()
    }

    #[must_use]
    pub const fn surface(&self) -> &R {
        &self.surface
    }

    #[must_use]
    pub const fn backend(&self) -> &B {
        &self.backend
    }

    #[must_use]
    pub const fn phase(&self) -> CheckoutPhase {
        self.phase
    }

    #[must_use]
    pub const fn panel(&self) -> Panel {
        self.panel
    }

    /// Every method takes `&mut self`, so a `Submitting` phase seen here
    /// means the future returned by [`Widget::submit_checkout`] was dropped
    /// before the backend answered. The cart was never cleared; put the form
    /// back so the customer can retry.
    fn recover_abandoned_submit(&mut self) {
        if self.phase == CheckoutPhase::Submitting {
            tracing::warn!("order submission was abandoned before the backend answered");
            self.phase = CheckoutPhase::FormOpen;
        }
    }

    fn set_panel(&mut self, panel: Panel) {
        self.panel = panel;
        self.surface.show_panel(panel);
    }

    fn render_cart(&mut self) {
        let view = CartView::new(self.cart.items(), self.cart.totals(), &self.currency_symbol);
        self.surface.render_cart(&view);
    }

    fn render_notifications(&mut self) {
        let notices: Vec<NoticeView> = self.notifications.active().map(NoticeView::from).collect();
        self.surface.render_notifications(&notices);
    }
}

impl ConfiguredWidget {
    /// Wire a widget from `config`, restoring any cart saved under
    /// `config.storage_key`.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the configured storage directory cannot be
    /// created.
    pub fn from_config(config: &WidgetConfig) -> Result<Self> {
        let store = ConfiguredStore::from_config(config)?;
        let storage = JsonCartStorage::new(store, config.storage_key.clone());
        let backend = HttpBackend::new(config.api_base_url.clone());
        tracing::info!(api_base_url = %config.api_base_url, "widget configured");
        Ok(Self::new(config, backend, CartStore::open(storage), HtmlSurface::new()))
    }
}
