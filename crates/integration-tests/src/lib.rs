//! Integration test harness for shopcart.
//!
//! Spawns backends on ephemeral ports inside the test process, so the tests
//! need no external services:
//!
//! ```bash
//! cargo test -p shopcart-integration-tests
//! ```
//!
//! - [`TestServer::dev_server`] - the real development backend
//! - [`TestServer::spawn`] - any custom `axum::Router` (failure injection)
//!
//! Widgets are built the way a host builds them: a [`WidgetConfig`] read
//! from environment-style variables, then [`ConfiguredWidget::from_config`].

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Once;

use axum::Router;
use shopcart_dev_server::state::AppState;
use shopcart_widget::ConfiguredWidget;
use shopcart_widget::config::WidgetConfig;
use shopcart_widget::storage::KeyValueStore;
use shopcart_widget::telemetry;
use tokio::task::JoinHandle;
use url::Url;

static TRACING: Once = Once::new();

/// Install the widget's tracing subscriber once per test binary.
///
/// Honors `RUST_LOG`; Sentry stays off unless `SENTRY_DSN` is set.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let config = WidgetConfig::from_lookup(|key| std::env::var(key).ok())
            .unwrap_or_default();
        if let Some(guard) = telemetry::init(&config) {
            // Lives for the rest of the test binary
            std::mem::forget(guard);
        }
    });
}

/// A router served on `127.0.0.1:<ephemeral>` until dropped.
pub struct TestServer {
    addr: SocketAddr,
    handle: JoinHandle<()>,
}

impl TestServer {
    /// Serve `router` on an ephemeral port.
    ///
    /// # Panics
    ///
    /// Panics if no local port can be bound.
    pub async fn spawn(router: Router) -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("Failed to read local address");

        let handle = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, router).await {
                panic!("test server failed: {e}");
            }
        });

        Self { addr, handle }
    }

    /// Serve the development backend with its seed catalog.
    ///
    /// Returns the state too, so tests can inspect recorded orders.
    ///
    /// # Panics
    ///
    /// Panics if the seed catalog does not load or no port can be bound.
    pub async fn dev_server() -> (Self, AppState) {
        let state = AppState::with_seed_products().expect("Failed to load seed products");
        let server = Self::spawn(shopcart_dev_server::app(state.clone())).await;
        (server, state)
    }

    /// Base URL the widget should use.
    ///
    /// # Panics
    ///
    /// Panics if the address does not form a URL, which cannot happen for a
    /// bound socket.
    #[must_use]
    pub fn base_url(&self) -> Url {
        Url::parse(&format!("http://{}/", self.addr)).expect("Failed to build base URL")
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// A base URL nothing is listening on.
///
/// # Panics
///
/// Panics if no local port can be bound.
#[must_use]
pub fn unreachable_base_url() -> Url {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("Failed to bind a free port");
    let port = listener.local_addr().expect("Failed to read local address").port();
    drop(listener);
    Url::parse(&format!("http://127.0.0.1:{port}/")).expect("Failed to build base URL")
}

/// Configuration as a host would load it with `SHOPCART_API_BASE_URL` and,
/// optionally, `SHOPCART_STORAGE_DIR` set.
///
/// # Panics
///
/// Panics if the variables do not form a valid configuration.
#[must_use]
pub fn widget_config(base_url: &Url, storage_dir: Option<&Path>) -> WidgetConfig {
    let base_url = base_url.to_string();
    let storage_dir = storage_dir.map(|dir| dir.display().to_string());
    WidgetConfig::from_lookup(|key| match key {
        "SHOPCART_API_BASE_URL" => Some(base_url.clone()),
        "SHOPCART_STORAGE_DIR" => storage_dir.clone(),
        _ => None,
    })
    .expect("Failed to build widget config")
}

/// Build a widget against `base_url` with the cart kept in memory.
///
/// # Panics
///
/// Panics if the widget cannot be configured.
#[must_use]
pub fn http_widget(base_url: &Url) -> ConfiguredWidget {
    init_tracing();
    ConfiguredWidget::from_config(&widget_config(base_url, None))
        .expect("Failed to configure widget")
}

/// Build a widget against `base_url` persisting the cart under `dir`.
///
/// # Panics
///
/// Panics if the storage directory cannot be created.
#[must_use]
pub fn file_widget(base_url: &Url, dir: &Path) -> ConfiguredWidget {
    init_tracing();
    ConfiguredWidget::from_config(&widget_config(base_url, Some(dir)))
        .expect("Failed to configure widget")
}

/// The raw persisted cart value.
///
/// # Panics
///
/// Panics if the store cannot be read.
#[must_use]
pub fn stored_cart(widget: &ConfiguredWidget) -> Option<String> {
    let storage = widget.cart().storage();
    storage
        .store()
        .get_item(storage.key())
        .expect("Failed to read stored cart")
}
