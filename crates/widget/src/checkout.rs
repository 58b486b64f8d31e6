//! Checkout form handling and the checkout phase machine.
//!
//! ```text
//! Browsing --open (cart non-empty)--> FormOpen --submit--> Submitting
//!    ^                                  ^  |                  |
//!    |                                  |  close              |
//!    +----------------------------------+--+---- success -----+
//!                                       +------- failure -----+
//! ```
//!
//! The controller in [`crate::widget`] drives the transitions; this module
//! owns the form, its validation and the customer-facing messages.

use shopcart_core::{
    CartLineItem, Customer, Email, EmailError, OrderReference, OrderRequest, TotalsOverflow,
};
use thiserror::Error;

use crate::backend::BackendError;

/// Message shown when checkout is attempted with nothing in the cart.
pub const EMPTY_CART_MESSAGE: &str = "Your cart is empty!";

/// Message shown when the backend rejects or never receives an order.
pub const ORDER_FAILED_MESSAGE: &str = "There was an error processing your order. Please try again.";

/// Where the customer is in the checkout sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CheckoutPhase {
    #[default]
    Browsing,
    FormOpen,
    Submitting,
}

/// Reasons a checkout did not produce an order.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// Checkout attempted with an empty cart.
    #[error("{}", EMPTY_CART_MESSAGE)]
    EmptyCart,

    /// A required form field is blank.
    #[error("Please enter your {0}.")]
    MissingField(&'static str),

    /// The email field is not a usable address.
    #[error("Please enter a valid email address: {0}")]
    InvalidEmail(#[from] EmailError),

    /// The cart total cannot be represented.
    #[error("Your cart total is too large to check out.")]
    Total(#[from] TotalsOverflow),

    /// Submission is only possible from an open checkout form.
    #[error("Checkout form is not open")]
    NotOpen,

    /// The order request failed in transit or was refused.
    #[error("Order submission failed: {0}")]
    Backend(#[from] BackendError),
}

impl CheckoutError {
    /// The blocking message shown to the customer.
    ///
    /// Backend details stay in logs and error tracking; the customer only
    /// sees the generic retry message.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Backend(_) => ORDER_FAILED_MESSAGE.to_string(),
            other => other.to_string(),
        }
    }
}

/// Raw checkout form values as entered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckoutForm {
    pub name: String,
    pub email: String,
    pub address: String,
    /// Value of the payment method selector.
    pub payment_method: String,
}

impl CheckoutForm {
    /// Validate the fields into a [`Customer`] and payment method.
    ///
    /// # Errors
    ///
    /// Returns the first blank field, or an invalid email.
    pub fn validate(&self) -> Result<(Customer, String), CheckoutError> {
        let name = required(&self.name, "name")?;
        let email_raw = required(&self.email, "email")?;
        let address = required(&self.address, "address")?;
        let payment_method = required(&self.payment_method, "payment method")?;

        let customer = Customer {
            name: name.to_string(),
            email: Email::parse(email_raw)?,
            address: address.to_string(),
        };
        Ok((customer, payment_method.to_string()))
    }

    /// Package the form and a cart snapshot into an order request.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::EmptyCart`] for an empty snapshot,
    /// [`CheckoutError::Total`] when the total overflows, otherwise any
    /// validation error from [`CheckoutForm::validate`].
    pub fn to_order(&self, items: Vec<CartLineItem>) -> Result<OrderRequest, CheckoutError> {
        if items.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }
        let (customer, payment_method) = self.validate()?;
        Ok(OrderRequest::new(customer, payment_method, items)?)
    }
}

/// Confirmation text for a placed order.
#[must_use]
pub fn order_placed_message(order_id: &OrderReference) -> String {
    format!("Order placed successfully! Order ID: {order_id}")
}

fn required<'a>(value: &'a str, field: &'static str) -> Result<&'a str, CheckoutError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(CheckoutError::MissingField(field))
    } else {
        Ok(trimmed)
    }
}
