use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use uuid::Uuid;

use crate::event_sourcing::{Aggregate, EventEnvelope};
use crate::metrics::Metrics;
use crate::store::{Store, StoreError};
use crate::utils::{retry_with_backoff, RetryConfig};

use super::aggregate::{validate_quantities, OrderAggregate};
use super::commands::OrderCommand;
use super::errors::OrderError;
use super::events::OrderEvent;
use super::value_objects::{LineRequest, OrderLine, OrderStatus, PipelineSummary, TransitionPolicy};

// ============================================================================
// Order Command Handler
// ============================================================================
//
// Orchestrates: Request → Aggregate → Events → Store
//
// Prices and names are copied from the menu when the order is placed. Later
// menu edits never reach an existing order.
//
// A status command that loses a version race is reloaded and re-run against
// the newer order, so the policy is always checked against current state.
//
// ============================================================================

/// Each conflict means another writer committed, so attempts bound the number
/// of concurrent writers a single command can outlast
const CONFLICT_RETRY: RetryConfig = RetryConfig {
    max_attempts: 10,
    initial_delay: Duration::from_millis(2),
    max_delay: Duration::from_millis(100),
    multiplier: 2.0,
};

pub struct OrderCommandHandler {
    store: Arc<dyn Store>,
    metrics: Arc<Metrics>,
    policy: TransitionPolicy,
}

impl OrderCommandHandler {
    pub fn new(store: Arc<dyn Store>, metrics: Arc<Metrics>, policy: TransitionPolicy) -> Self {
        Self { store, metrics, policy }
    }

    pub fn policy(&self) -> TransitionPolicy {
        self.policy
    }

    /// Place an order for a kitchen, capturing the current menu prices
    pub async fn create_order(&self, kitchen_id: Uuid, items: &[LineRequest]) -> Result<Uuid, OrderError> {
        let started = Instant::now();
        let result = self.place(kitchen_id, items).await;

        self.metrics
            .observe_duration("create_order", started.elapsed().as_secs_f64());
        if let Err(e) = &result {
            self.metrics.record_order_failure("create_order");
            tracing::warn!(kitchen_id = %kitchen_id, error = %e, "Order rejected");
        }

        result
    }

    async fn place(&self, kitchen_id: Uuid, items: &[LineRequest]) -> Result<Uuid, OrderError> {
        validate_quantities(items.iter().map(|line| line.quantity))?;

        let ids: Vec<Uuid> = items.iter().map(|line| line.menu_item_id).collect();
        let menu: HashMap<Uuid, _> = self
            .store
            .get_menu_items(&ids)
            .await?
            .into_iter()
            .map(|item| (item.id, item))
            .collect();

        let mut lines = Vec::with_capacity(items.len());
        for request in items {
            let item = menu
                .get(&request.menu_item_id)
                .ok_or(OrderError::MenuItemNotFound(request.menu_item_id))?;
            lines.push(OrderLine {
                menu_item_id: item.id,
                name: item.name.clone(),
                price: item.price,
                quantity: request.quantity,
            });
        }

        let order_id = Uuid::now_v7();
        let correlation_id = Uuid::new_v4();
        let event = OrderAggregate::place(order_id, kitchen_id, lines)?;
        let order = OrderAggregate::apply_first_event(&event)?;
        let envelope = EventEnvelope::new(order_id, order.version, event, correlation_id);

        self.store.insert_order(&order, &[envelope]).await?;

        self.metrics.record_order_placed(order.items.len());
        tracing::info!(
            order_id = %order_id,
            kitchen_id = %kitchen_id,
            line_count = order.items.len(),
            total = %order.total_amount,
            "🧾 Order placed"
        );

        Ok(order_id)
    }

    pub async fn get(&self, order_id: Uuid) -> Result<OrderAggregate, OrderError> {
        self.store
            .get_order(order_id)
            .await?
            .ok_or(OrderError::NotFound(order_id))
    }

    /// Orders for one kitchen, newest first
    pub async fn list_by_kitchen(&self, kitchen_id: Uuid) -> Result<Vec<OrderAggregate>, OrderError> {
        Ok(self.store.list_orders_by_kitchen(kitchen_id).await?)
    }

    /// Set the status of an order, subject to the configured policy
    pub async fn update_status(&self, order_id: Uuid, status: OrderStatus) -> Result<OrderAggregate, OrderError> {
        let command = OrderCommand::ChangeStatus { to: status, policy: self.policy };
        self.handle(order_id, command, "update_status").await
    }

    /// Move the order one step along the pipeline
    pub async fn advance(&self, order_id: Uuid) -> Result<OrderAggregate, OrderError> {
        self.handle(order_id, OrderCommand::Advance, "advance").await
    }

    async fn handle(
        &self,
        order_id: Uuid,
        command: OrderCommand,
        operation: &'static str,
    ) -> Result<OrderAggregate, OrderError> {
        let started = Instant::now();
        let result = self.apply_with_retry(order_id, &command).await;

        self.metrics
            .observe_duration(operation, started.elapsed().as_secs_f64());
        if let Err(e) = &result {
            self.metrics.record_order_failure(operation);
            tracing::warn!(order_id = %order_id, operation, error = %e, "Order command rejected");
        }

        result
    }

    async fn apply_with_retry(&self, order_id: Uuid, command: &OrderCommand) -> Result<OrderAggregate, OrderError> {
        retry_with_backoff(&CONFLICT_RETRY, |_attempt| async move {
            match self.apply_command(order_id, command).await {
                Err(conflict @ OrderError::Store(StoreError::Conflict { .. })) => Err(conflict),
                settled => Ok(settled),
            }
        })
        .await?
    }

    async fn apply_command(&self, order_id: Uuid, command: &OrderCommand) -> Result<OrderAggregate, OrderError> {
        let mut order = self.get(order_id).await?;
        let expected_version = order.version;
        let from = order.status;

        let events = order.handle_command(command)?;

        let correlation_id = Uuid::new_v4();
        let mut envelopes = Vec::with_capacity(events.len());
        for event in events {
            order.apply_event(&event)?;
            envelopes.push(EventEnvelope::new(order_id, order.version, event, correlation_id));
        }

        self.store.update_order(&order, expected_version, &envelopes).await?;

        self.metrics.record_status_transition(from.as_str(), order.status.as_str());
        tracing::info!(
            order_id = %order_id,
            from = %from,
            to = %order.status,
            version = order.version,
            "Order status changed"
        );

        Ok(order)
    }

    /// Every event recorded for an order, oldest first. The log must replay
    /// into a valid order.
    pub async fn history(&self, order_id: Uuid) -> Result<Vec<EventEnvelope<OrderEvent>>, OrderError> {
        let events = self.store.load_order_events(order_id).await?;
        if events.is_empty() {
            return Err(OrderError::NotFound(order_id));
        }

        if let Err(e) = OrderAggregate::load_from_events(&events) {
            tracing::error!(order_id = %order_id, error = %e, "Order event log does not replay");
            return Err(StoreError::Malformed {
                entity: "order_event",
                reason: e.to_string(),
            }
            .into());
        }

        Ok(events)
    }

    /// Order counts per status for a kitchen
    pub async fn pipeline(&self, kitchen_id: Uuid) -> Result<PipelineSummary, OrderError> {
        let orders = self.store.list_orders_by_kitchen(kitchen_id).await?;
        let mut summary = PipelineSummary::default();
        for order in &orders {
            summary.record(order.status);
        }
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MenuItem;
    use crate::store::MemoryStore;
    use rust_decimal::Decimal;

    struct Fixture {
        store: Arc<MemoryStore>,
        handler: OrderCommandHandler,
        kitchen_id: Uuid,
    }

    fn fixture(policy: TransitionPolicy) -> Fixture {
        let store = Arc::new(MemoryStore::new());
        let handler = OrderCommandHandler::new(store.clone(), Arc::new(Metrics::new().unwrap()), policy);
        Fixture { store, handler, kitchen_id: Uuid::new_v4() }
    }

    async fn menu_item(fx: &Fixture, name: &str, price: Decimal) -> MenuItem {
        let item = MenuItem {
            id: Uuid::new_v4(),
            kitchen_id: fx.kitchen_id,
            name: name.to_string(),
            price,
            image_url: None,
        };
        fx.store.insert_menu_item(&item).await.unwrap();
        item
    }

    fn request(item: &MenuItem, quantity: u32) -> LineRequest {
        LineRequest { menu_item_id: item.id, quantity }
    }

    #[tokio::test]
    async fn test_create_order_captures_lines_and_total() {
        let fx = fixture(TransitionPolicy::Permissive);
        let a = menu_item(&fx, "Butter Naan", Decimal::from(100)).await;
        let b = menu_item(&fx, "Dal Makhani", Decimal::from(250)).await;

        let order_id = fx
            .handler
            .create_order(fx.kitchen_id, &[request(&a, 2), request(&b, 1)])
            .await
            .unwrap();

        let order = fx.handler.get(order_id).await.unwrap();
        assert_eq!(order.total_amount, Decimal::from(450));
        assert_eq!(order.status, OrderStatus::Placed);
        assert_eq!(order.items[0].name, "Butter Naan");
        assert_eq!(order.items[1].price, Decimal::from(250));
    }

    #[tokio::test]
    async fn test_price_edit_after_order_keeps_captured_price() {
        let fx = fixture(TransitionPolicy::Permissive);
        let mut item = menu_item(&fx, "Paneer Roll", Decimal::from(120)).await;

        let order_id = fx.handler.create_order(fx.kitchen_id, &[request(&item, 3)]).await.unwrap();

        item.price = Decimal::from(999);
        item.name = "Renamed Roll".to_string();
        assert!(fx.store.update_menu_item(&item).await.unwrap());

        let order = fx.handler.get(order_id).await.unwrap();
        assert_eq!(order.items[0].price, Decimal::from(120));
        assert_eq!(order.items[0].name, "Paneer Roll");
        assert_eq!(order.total_amount, Decimal::from(360));
    }

    #[tokio::test]
    async fn test_unknown_menu_item_creates_no_order() {
        let fx = fixture(TransitionPolicy::Permissive);
        let known = menu_item(&fx, "Samosa", Decimal::from(20)).await;
        let missing = Uuid::new_v4();

        let result = fx
            .handler
            .create_order(
                fx.kitchen_id,
                &[request(&known, 1), LineRequest { menu_item_id: missing, quantity: 1 }],
            )
            .await;

        assert!(matches!(result, Err(OrderError::MenuItemNotFound(id)) if id == missing));
        assert!(fx.handler.list_by_kitchen(fx.kitchen_id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_empty_and_zero_quantity_rejected() {
        let fx = fixture(TransitionPolicy::Permissive);
        let item = menu_item(&fx, "Lassi", Decimal::from(60)).await;

        assert!(matches!(
            fx.handler.create_order(fx.kitchen_id, &[]).await,
            Err(OrderError::EmptyItems)
        ));
        assert!(matches!(
            fx.handler.create_order(fx.kitchen_id, &[request(&item, 0)]).await,
            Err(OrderError::InvalidQuantity(0))
        ));
    }

    #[tokio::test]
    async fn test_list_by_kitchen_newest_first() {
        let fx = fixture(TransitionPolicy::Permissive);
        let item = menu_item(&fx, "Chai", Decimal::from(15)).await;

        let first = fx.handler.create_order(fx.kitchen_id, &[request(&item, 1)]).await.unwrap();
        let second = fx.handler.create_order(fx.kitchen_id, &[request(&item, 2)]).await.unwrap();
        let third = fx.handler.create_order(fx.kitchen_id, &[request(&item, 3)]).await.unwrap();

        let ids: Vec<Uuid> = fx
            .handler
            .list_by_kitchen(fx.kitchen_id)
            .await
            .unwrap()
            .into_iter()
            .map(|o| o.id)
            .collect();
        assert_eq!(ids, vec![third, second, first]);
    }

    #[tokio::test]
    async fn test_permissive_update_status_any_direction() {
        let fx = fixture(TransitionPolicy::Permissive);
        let item = menu_item(&fx, "Vada Pav", Decimal::from(30)).await;
        let order_id = fx.handler.create_order(fx.kitchen_id, &[request(&item, 1)]).await.unwrap();

        let order = fx.handler.update_status(order_id, OrderStatus::Served).await.unwrap();
        assert_eq!(order.status, OrderStatus::Served);

        let order = fx.handler.update_status(order_id, OrderStatus::Placed).await.unwrap();
        assert_eq!(order.status, OrderStatus::Placed);

        // Repeating the current status is accepted and leaves it unchanged
        let order = fx.handler.update_status(order_id, OrderStatus::Placed).await.unwrap();
        assert_eq!(order.status, OrderStatus::Placed);
        assert_eq!(order.version, 4);
        assert_eq!(order.total_amount, Decimal::from(30));
    }

    #[tokio::test]
    async fn test_strict_policy_rejects_skip() {
        let fx = fixture(TransitionPolicy::Strict);
        let item = menu_item(&fx, "Kulfi", Decimal::from(50)).await;
        let order_id = fx.handler.create_order(fx.kitchen_id, &[request(&item, 1)]).await.unwrap();

        let result = fx.handler.update_status(order_id, OrderStatus::Ready).await;
        assert!(matches!(result, Err(OrderError::InvalidTransition { .. })));
        assert_eq!(fx.handler.get(order_id).await.unwrap().status, OrderStatus::Placed);

        let order = fx.handler.update_status(order_id, OrderStatus::Preparing).await.unwrap();
        assert_eq!(order.status, OrderStatus::Preparing);
    }

    #[tokio::test]
    async fn test_update_unknown_order_not_found() {
        let fx = fixture(TransitionPolicy::Permissive);
        let missing = Uuid::now_v7();

        assert!(matches!(
            fx.handler.update_status(missing, OrderStatus::Ready).await,
            Err(OrderError::NotFound(id)) if id == missing
        ));
        assert!(matches!(fx.handler.history(missing).await, Err(OrderError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_advance_history_and_pipeline() {
        let fx = fixture(TransitionPolicy::Permissive);
        let item = menu_item(&fx, "Gulab Jamun", Decimal::from(40)).await;
        let a = fx.handler.create_order(fx.kitchen_id, &[request(&item, 1)]).await.unwrap();
        fx.handler.create_order(fx.kitchen_id, &[request(&item, 2)]).await.unwrap();

        fx.handler.advance(a).await.unwrap();
        let order = fx.handler.advance(a).await.unwrap();
        assert_eq!(order.status, OrderStatus::Ready);

        let history = fx.handler.history(a).await.unwrap();
        let sequence: Vec<i64> = history.iter().map(|e| e.sequence_number).collect();
        assert_eq!(sequence, vec![1, 2, 3]);
        assert_eq!(history[0].event_type, "OrderPlaced");
        assert_eq!(history[2].event_type, "OrderStatusChanged");

        let rebuilt = OrderAggregate::load_from_events(&history).unwrap();
        assert_eq!(rebuilt, order);

        let summary = fx.handler.pipeline(fx.kitchen_id).await.unwrap();
        assert_eq!(summary.placed, 1);
        assert_eq!(summary.ready, 1);
        assert_eq!(summary.total(), 2);
    }

    #[tokio::test]
    async fn test_advance_past_served_fails() {
        let fx = fixture(TransitionPolicy::Permissive);
        let item = menu_item(&fx, "Jalebi", Decimal::from(35)).await;
        let order_id = fx.handler.create_order(fx.kitchen_id, &[request(&item, 1)]).await.unwrap();

        fx.handler.update_status(order_id, OrderStatus::Served).await.unwrap();
        assert!(matches!(
            fx.handler.advance(order_id).await,
            Err(OrderError::NoNextStatus(OrderStatus::Served))
        ));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_permissive_updates_all_succeed() {
        let fx = fixture(TransitionPolicy::Permissive);
        let item = menu_item(&fx, "Masala Dosa", Decimal::from(90)).await;
        let order_id = fx.handler.create_order(fx.kitchen_id, &[request(&item, 1)]).await.unwrap();
        let handler = Arc::new(fx.handler);

        let statuses = [
            OrderStatus::Preparing,
            OrderStatus::Ready,
            OrderStatus::Served,
            OrderStatus::Placed,
            OrderStatus::Ready,
            OrderStatus::Preparing,
            OrderStatus::Served,
            OrderStatus::Placed,
        ];
        let tasks: Vec<_> = statuses
            .into_iter()
            .map(|status| {
                let handler = handler.clone();
                tokio::spawn(async move { handler.update_status(order_id, status).await })
            })
            .collect();

        for task in tasks {
            assert!(task.await.unwrap().is_ok());
        }

        let order = handler.get(order_id).await.unwrap();
        assert_eq!(order.version, 1 + statuses.len() as i64);
        assert_eq!(handler.history(order_id).await.unwrap().len(), 1 + statuses.len());
    }

    #[tokio::test]
    async fn test_history_that_does_not_replay_is_malformed() {
        let fx = fixture(TransitionPolicy::Permissive);
        let item = menu_item(&fx, "Idli", Decimal::from(40)).await;
        let order_id = fx.handler.create_order(fx.kitchen_id, &[request(&item, 1)]).await.unwrap();
        let order = fx.handler.get(order_id).await.unwrap();

        // A second placement event can never follow the first
        let replay = fx.handler.history(order_id).await.unwrap().remove(0);
        let duplicate = EventEnvelope::new(order_id, 2, replay.event_data, Uuid::new_v4());
        fx.store.update_order(&order, order.version, &[duplicate]).await.unwrap();

        assert!(matches!(
            fx.handler.history(order_id).await,
            Err(OrderError::Store(StoreError::Malformed { entity: "order_event", .. }))
        ));
    }
}
