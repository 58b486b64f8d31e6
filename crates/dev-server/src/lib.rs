//! Shopcart development server library.
//!
//! Serves the product and order API the widget talks to, backed by a seed
//! catalog and in-memory order storage. Exposed as a library so tests can
//! mount the router on an ephemeral port.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod error;
pub mod routes;
pub mod state;

use axum::Router;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use state::AppState;

/// Build the application router with request tracing and permissive CORS.
pub fn app(state: AppState) -> Router {
    routes::routes()
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
