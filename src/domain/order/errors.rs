use uuid::Uuid;

use super::value_objects::OrderStatus;
use crate::store::StoreError;

// ============================================================================
// Order Errors
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum OrderError {
    #[error("Order not found: {0}")]
    NotFound(Uuid),

    #[error("Menu item not found: {0}")]
    MenuItemNotFound(Uuid),

    #[error("Order items cannot be empty")]
    EmptyItems,

    #[error("Invalid item quantity: {0}")]
    InvalidQuantity(u32),

    #[error("Order total is too large to represent")]
    TotalOverflow,

    #[error("Status change from {from} to {to} is not allowed")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    #[error("Order is already {0}, there is no next status")]
    NoNextStatus(OrderStatus),

    #[error("Aggregate not initialized")]
    NotInitialized,

    #[error(transparent)]
    Store(#[from] StoreError),
}
