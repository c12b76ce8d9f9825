//! Processing-action to order-status transitions.

use crate::proto::{OrderStatus, ProcessAction};

/// Map a raw action value to the resulting order status.
///
/// Unrecognized values fall back to `PENDING`.
pub fn status_for_action(action: i32) -> OrderStatus {
    match ProcessAction::try_from(action) {
        Ok(ProcessAction::Confirm) => OrderStatus::Confirmed,
        Ok(ProcessAction::Ship) => OrderStatus::Shipped,
        Ok(ProcessAction::Deliver) => OrderStatus::Delivered,
        Ok(ProcessAction::Cancel) => OrderStatus::Cancelled,
        Ok(ProcessAction::Refund) => OrderStatus::Refunded,
        Err(_) => OrderStatus::Pending,
    }
}

/// Human-readable label for a raw action value, used in response messages.
pub fn action_label(action: i32) -> &'static str {
    ProcessAction::try_from(action)
        .map(|a| a.as_str_name())
        .unwrap_or("UNKNOWN")
}
