//! Core types for shopcart.
//!
//! This module provides type-safe wrappers for the cart domain.

pub mod cart;
pub mod email;
pub mod id;
pub mod order;
pub mod price;
pub mod product;

pub use cart::{CartLineItem, CartTotals, TotalsOverflow};
pub use email::{Email, EmailError};
pub use id::*;
pub use order::{Customer, OrderConfirmation, OrderReference, OrderRequest};
pub use price::Price;
pub use product::Product;
