//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                 - Health check
//! GET  /api/products           - Product catalog
//! POST /api/orders             - Place an order (201 {"orderId": ...})
//! GET  /api/orders             - Orders accepted so far
//! GET  /api/orders/{order_id}  - One accepted order
//! ```

use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    routing::get,
};
use shopcart_core::{CartTotals, OrderConfirmation, OrderReference, OrderRequest, Product};
use tracing::instrument;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::state::{AppState, StoredOrder};

/// Hex digits of a UUID kept in generated order ids.
const ORDER_ID_DIGITS: usize = 8;

/// Create the API routes router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/api/products", get(list_products))
        .route("/api/orders", get(list_orders).post(create_order))
        .route("/api/orders/{order_id}", get(get_order))
}

/// Liveness health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Return the product catalog.
#[instrument(skip(state))]
async fn list_products(State(state): State<AppState>) -> Json<Vec<Product>> {
    Json(state.products().to_vec())
}

/// Validate and record an order.
#[instrument(skip(state, payload))]
async fn create_order(
    State(state): State<AppState>,
    payload: std::result::Result<Json<OrderRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<OrderConfirmation>)> {
    let Json(order) = payload?;
    validate_order(&order)?;

    let order_id = new_order_id();
    let stored = state.record_order(order_id.clone(), order).await;
    tracing::info!(
        order_id = %stored.order_id,
        items = stored.request.items.len(),
        total = %stored.request.total,
        "order accepted"
    );

    Ok((
        StatusCode::CREATED,
        Json(OrderConfirmation {
            order_id: OrderReference::new(order_id),
        }),
    ))
}

/// Return every accepted order.
async fn list_orders(State(state): State<AppState>) -> Json<Vec<StoredOrder>> {
    Json(state.orders().await)
}

/// Return one accepted order.
async fn get_order(
    State(state): State<AppState>,
    Path(order_id): Path<String>,
) -> Result<Json<StoredOrder>> {
    state
        .order(&order_id)
        .await
        .map(Json)
        .ok_or(AppError::NotFound(order_id))
}

/// Check an order beyond what deserialization already enforces (the
/// customer email is validated by its type).
fn validate_order(order: &OrderRequest) -> Result<()> {
    if order.items.is_empty() {
        return Err(AppError::InvalidOrder("order has no items".to_string()));
    }
    if order.customer.name.trim().is_empty() {
        return Err(AppError::InvalidOrder("customer name is required".to_string()));
    }
    if order.customer.address.trim().is_empty() {
        return Err(AppError::InvalidOrder("customer address is required".to_string()));
    }
    if order.payment_method.trim().is_empty() {
        return Err(AppError::InvalidOrder("payment method is required".to_string()));
    }

    for item in &order.items {
        if item.quantity == 0 {
            return Err(AppError::InvalidOrder(format!("item {} has zero quantity", item.id)));
        }
        if !item.price.is_valid_unit_price() {
            return Err(AppError::InvalidOrder(format!("item {} has an invalid price", item.id)));
        }
    }

    let expected = CartTotals::from_items(&order.items)
        .map_err(|e| AppError::InvalidOrder(e.to_string()))?
        .total_price
        .to_cents();
    if order.total != expected {
        return Err(AppError::InvalidOrder(format!(
            "total {} does not match items ({expected})",
            order.total
        )));
    }
    Ok(())
}

/// Generate an id like `ORD-1F3A9C2B`.
fn new_order_id() -> String {
    let digits: String = Uuid::new_v4()
        .simple()
        .to_string()
        .chars()
        .take(ORDER_ID_DIGITS)
        .collect();
    format!("ORD-{}", digits.to_uppercase())
}
