use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::commands::OrderCommand;
use super::errors::OrderError;
use super::events::*;
use super::value_objects::{OrderLine, OrderStatus};
use crate::event_sourcing::Aggregate;

// ============================================================================
// Order Aggregate - Domain Logic
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderAggregate {
    pub id: Uuid,
    pub version: i64,

    pub kitchen_id: Uuid,
    pub items: Vec<OrderLine>,
    pub total_amount: Decimal,
    pub status: OrderStatus,

    pub placed_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl OrderAggregate {
    /// Validate captured lines and produce the placement event.
    ///
    /// The total is computed here from the captured prices and is never
    /// recomputed afterwards.
    pub fn place(order_id: Uuid, kitchen_id: Uuid, items: Vec<OrderLine>) -> Result<OrderEvent, OrderError> {
        validate_quantities(items.iter().map(|line| line.quantity))?;

        let total_amount = items
            .iter()
            .try_fold(Decimal::ZERO, |total, line| line.line_total()?.checked_add(total))
            .ok_or(OrderError::TotalOverflow)?;

        Ok(OrderEvent::Placed(OrderPlaced {
            order_id,
            kitchen_id,
            items,
            total_amount,
            placed_at: Utc::now(),
        }))
    }

    fn status_change(&self, to: OrderStatus) -> OrderEvent {
        OrderEvent::StatusChanged(OrderStatusChanged {
            from: self.status,
            to,
            changed_at: Utc::now(),
        })
    }
}

/// Rejects an empty cart or a line with quantity zero
pub(crate) fn validate_quantities<I>(quantities: I) -> Result<(), OrderError>
where
    I: ExactSizeIterator<Item = u32>,
{
    if quantities.len() == 0 {
        return Err(OrderError::EmptyItems);
    }

    for quantity in quantities {
        if quantity == 0 {
            return Err(OrderError::InvalidQuantity(quantity));
        }
    }

    Ok(())
}

// ============================================================================
// Aggregate Trait Implementation
// ============================================================================

impl Aggregate for OrderAggregate {
    type Event = OrderEvent;
    type Command = OrderCommand;
    type Error = OrderError;

    fn apply_first_event(event: &Self::Event) -> Result<Self, Self::Error> {
        match event {
            OrderEvent::Placed(e) => Ok(Self {
                id: e.order_id,
                version: 1,
                kitchen_id: e.kitchen_id,
                items: e.items.clone(),
                total_amount: e.total_amount,
                status: OrderStatus::Placed,
                placed_at: e.placed_at,
                updated_at: e.placed_at,
            }),
            _ => Err(OrderError::NotInitialized),
        }
    }

    fn apply_event(&mut self, event: &Self::Event) -> Result<(), Self::Error> {
        match event {
            OrderEvent::Placed(_) => {
                // Only valid as the first event
                return Err(OrderError::NotInitialized);
            }
            OrderEvent::StatusChanged(e) => {
                self.status = e.to;
                self.updated_at = e.changed_at;
            }
        }

        self.version += 1;
        Ok(())
    }

    fn handle_command(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            OrderCommand::ChangeStatus { to, policy } => {
                policy.check(self.status, *to)?;
                Ok(vec![self.status_change(*to)])
            }

            OrderCommand::Advance => {
                let next = self.status.next().ok_or(OrderError::NoNextStatus(self.status))?;
                Ok(vec![self.status_change(next)])
            }
        }
    }

    fn aggregate_id(&self) -> Uuid {
        self.id
    }

    fn version(&self) -> i64 {
        self.version
    }
}
