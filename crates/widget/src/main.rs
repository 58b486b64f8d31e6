//! Shopcart widget preview.
//!
//! Builds the widget from the environment, loads the catalog from the
//! configured backend (or the fallback), restores the cart and writes the
//! rendered page to stdout.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::io::Write;

use shopcart_widget::ConfiguredWidget;
use shopcart_widget::config::WidgetConfig;
use shopcart_widget::telemetry;

#[tokio::main]
async fn main() {
    let config = WidgetConfig::from_env().expect("Failed to load configuration");

    // Keep the guard alive so Sentry flushes on exit
    let _sentry = telemetry::init(&config);

    let mut widget = ConfiguredWidget::from_config(&config).expect("Failed to open cart storage");
    let source = widget.start().await;
    tracing::info!(
        ?source,
        lines = widget.cart().items().len(),
        "widget rendered"
    );

    let page = widget.surface().page().expect("Failed to render page");
    std::io::stdout()
        .lock()
        .write_all(page.as_bytes())
        .expect("Failed to write page");
}
