use super::value_objects::{OrderStatus, TransitionPolicy};

// ============================================================================
// Order Commands - Represent staff intent on an existing order
// ============================================================================
//
// Placing an order is not a command on an aggregate: the order does not exist
// yet and the lines must first be resolved against the menu. See
// `OrderAggregate::place`.
//
// ============================================================================

#[derive(Debug, Clone)]
pub enum OrderCommand {
    ChangeStatus {
        to: OrderStatus,
        policy: TransitionPolicy,
    },
    /// Move to the next status of the canonical pipeline
    Advance,
}
