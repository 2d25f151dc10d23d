use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::errors::OrderError;

// ============================================================================
// Order Value Objects
// ============================================================================

/// A cart line as submitted by the customer
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LineRequest {
    pub menu_item_id: Uuid,
    pub quantity: u32,
}

/// A line captured at order time; later menu edits never touch it
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    pub menu_item_id: Uuid,
    pub name: String,
    pub price: Decimal,
    pub quantity: u32,
}

impl OrderLine {
    /// `None` when price times quantity does not fit in a `Decimal`
    pub fn line_total(&self) -> Option<Decimal> {
        self.price.checked_mul(Decimal::from(self.quantity))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Placed,
    Preparing,
    Ready,
    Served,
}

impl OrderStatus {
    /// Canonical pipeline order
    pub const ALL: [OrderStatus; 4] = [
        OrderStatus::Placed,
        OrderStatus::Preparing,
        OrderStatus::Ready,
        OrderStatus::Served,
    ];

    pub fn next(&self) -> Option<OrderStatus> {
        match self {
            OrderStatus::Placed => Some(OrderStatus::Preparing),
            OrderStatus::Preparing => Some(OrderStatus::Ready),
            OrderStatus::Ready => Some(OrderStatus::Served),
            OrderStatus::Served => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Placed => "placed",
            OrderStatus::Preparing => "preparing",
            OrderStatus::Ready => "ready",
            OrderStatus::Served => "served",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.as_str() == value)
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which status changes the backend accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransitionPolicy {
    /// Any status from any status, including backward moves and repeats
    #[default]
    Permissive,
    /// Only the next step of the canonical pipeline
    Strict,
}

impl TransitionPolicy {
    pub fn check(&self, from: OrderStatus, to: OrderStatus) -> Result<(), OrderError> {
        match self {
            TransitionPolicy::Permissive => Ok(()),
            TransitionPolicy::Strict if from.next() == Some(to) => Ok(()),
            TransitionPolicy::Strict => Err(OrderError::InvalidTransition { from, to }),
        }
    }
}

/// Order counts per status for one kitchen
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct PipelineSummary {
    pub placed: usize,
    pub preparing: usize,
    pub ready: usize,
    pub served: usize,
}

impl PipelineSummary {
    pub fn record(&mut self, status: OrderStatus) {
        match status {
            OrderStatus::Placed => self.placed += 1,
            OrderStatus::Preparing => self.preparing += 1,
            OrderStatus::Ready => self.ready += 1,
            OrderStatus::Served => self.served += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.placed + self.preparing + self.ready + self.served
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_total_uses_captured_price() {
        let line = OrderLine {
            menu_item_id: Uuid::new_v4(),
            name: "Chicken Biryani".to_string(),
            price: Decimal::new(24950, 2),
            quantity: 3,
        };

        assert_eq!(line.line_total(), Some(Decimal::new(74850, 2)));
    }

    #[test]
    fn test_status_pipeline_order() {
        assert_eq!(OrderStatus::Placed.next(), Some(OrderStatus::Preparing));
        assert_eq!(OrderStatus::Preparing.next(), Some(OrderStatus::Ready));
        assert_eq!(OrderStatus::Ready.next(), Some(OrderStatus::Served));
        assert_eq!(OrderStatus::Served.next(), None);
    }

    #[test]
    fn test_status_wire_names() {
        for status in OrderStatus::ALL {
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, format!("\"{}\"", status));
            assert_eq!(OrderStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(OrderStatus::parse("cancelled"), None);
    }

    #[test]
    fn test_permissive_policy_accepts_everything() {
        for from in OrderStatus::ALL {
            for to in OrderStatus::ALL {
                assert!(TransitionPolicy::Permissive.check(from, to).is_ok());
            }
        }
    }

    #[test]
    fn test_strict_policy_only_accepts_next_step() {
        let strict = TransitionPolicy::Strict;
        assert!(strict.check(OrderStatus::Placed, OrderStatus::Preparing).is_ok());
        assert!(strict.check(OrderStatus::Ready, OrderStatus::Served).is_ok());

        assert!(matches!(
            strict.check(OrderStatus::Placed, OrderStatus::Ready),
            Err(OrderError::InvalidTransition { .. })
        ));
        assert!(strict.check(OrderStatus::Served, OrderStatus::Placed).is_err());
        assert!(strict.check(OrderStatus::Preparing, OrderStatus::Preparing).is_err());
    }

    #[test]
    fn test_pipeline_summary_counts() {
        let mut summary = PipelineSummary::default();
        summary.record(OrderStatus::Placed);
        summary.record(OrderStatus::Placed);
        summary.record(OrderStatus::Served);

        assert_eq!(summary.placed, 2);
        assert_eq!(summary.served, 1);
        assert_eq!(summary.total(), 3);
    }
}
