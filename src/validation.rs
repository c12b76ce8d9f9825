//! Request validation and pricing.
//!
//! Pure functions, run before any store mutation.

use thiserror::Error;
use tonic::Status;

use crate::proto::{CreateOrderRequest, OrderItem};

/// Rejection reasons for a create-order request.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Customer ID is required")]
    MissingCustomerId,
    #[error("Order must contain at least one item")]
    EmptyItems,
    #[error("Shipping address is required")]
    MissingShippingAddress,
}

impl From<ValidationError> for Status {
    fn from(err: ValidationError) -> Self {
        Status::invalid_argument(err.to_string())
    }
}

/// Validate a create-order request.
///
/// Checks the customer identifier, item list, and shipping address.
/// Payment details are carried opaquely and not validated here.
pub fn validate_create_order(request: &CreateOrderRequest) -> Result<(), ValidationError> {
    if request.customer_id.is_empty() {
        return Err(ValidationError::MissingCustomerId);
    }
    if request.items.is_empty() {
        return Err(ValidationError::EmptyItems);
    }
    if request.shipping_address.is_empty() {
        return Err(ValidationError::MissingShippingAddress);
    }
    Ok(())
}

/// Sum of `unit_price * quantity` over the items. Empty list yields zero.
pub fn calculate_total_amount(items: &[OrderItem]) -> f64 {
    items
        .iter()
        .map(|item| item.unit_price * f64::from(item.quantity))
        .sum()
}
