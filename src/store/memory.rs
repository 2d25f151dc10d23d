use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{Store, StoreError, StoreResult};
use crate::domain::discount::Discount;
use crate::domain::order::{OrderAggregate, OrderEvent};
use crate::event_sourcing::EventEnvelope;
use crate::models::{Kitchen, MenuItem, PaymentTransaction, User};

// ============================================================================
// In-Memory Store
// ============================================================================
//
// Collections keep insertion order so "newest first" and "by creation" reads
// need no extra index. Uniqueness checks and inserts happen under the same
// write lock.
//
// ============================================================================

#[derive(Default)]
struct MemoryState {
    kitchens: Vec<Kitchen>,
    kitchen_names: HashSet<String>,
    menu_items: Vec<MenuItem>,
    orders: Vec<OrderAggregate>,
    order_events: HashMap<Uuid, Vec<EventEnvelope<OrderEvent>>>,
    discounts: Vec<Discount>,
    users: Vec<User>,
    transactions: Vec<PaymentTransaction>,
}

#[derive(Default)]
pub struct MemoryStore {
    state: RwLock<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }

    async fn insert_kitchen(&self, kitchen: &Kitchen) -> StoreResult<()> {
        let mut state = self.state.write().await;
        let key = kitchen.name_key();
        if !state.kitchen_names.insert(key.clone()) {
            return Err(StoreError::AlreadyExists { entity: "kitchen", key });
        }
        state.kitchens.push(kitchen.clone());
        Ok(())
    }

    async fn get_kitchen(&self, id: Uuid) -> StoreResult<Option<Kitchen>> {
        let state = self.state.read().await;
        Ok(state.kitchens.iter().find(|k| k.id == id).cloned())
    }

    async fn list_kitchens(&self) -> StoreResult<Vec<Kitchen>> {
        Ok(self.state.read().await.kitchens.clone())
    }

    async fn insert_menu_item(&self, item: &MenuItem) -> StoreResult<()> {
        self.state.write().await.menu_items.push(item.clone());
        Ok(())
    }

    async fn insert_menu_items(&self, items: &[MenuItem]) -> StoreResult<()> {
        self.state.write().await.menu_items.extend_from_slice(items);
        Ok(())
    }

    async fn get_menu_item(&self, id: Uuid) -> StoreResult<Option<MenuItem>> {
        let state = self.state.read().await;
        Ok(state.menu_items.iter().find(|m| m.id == id).cloned())
    }

    async fn get_menu_items(&self, ids: &[Uuid]) -> StoreResult<Vec<MenuItem>> {
        let wanted: HashSet<&Uuid> = ids.iter().collect();
        let state = self.state.read().await;
        Ok(state
            .menu_items
            .iter()
            .filter(|m| wanted.contains(&m.id))
            .cloned()
            .collect())
    }

    async fn list_menu_items(&self, kitchen_id: Uuid) -> StoreResult<Vec<MenuItem>> {
        let state = self.state.read().await;
        Ok(state
            .menu_items
            .iter()
            .filter(|m| m.kitchen_id == kitchen_id)
            .cloned()
            .collect())
    }

    async fn update_menu_item(&self, item: &MenuItem) -> StoreResult<bool> {
        let mut state = self.state.write().await;
        match state.menu_items.iter_mut().find(|m| m.id == item.id) {
            Some(existing) => {
                *existing = item.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_menu_item(&self, id: Uuid) -> StoreResult<bool> {
        let mut state = self.state.write().await;
        let before = state.menu_items.len();
        state.menu_items.retain(|m| m.id != id);
        Ok(state.menu_items.len() != before)
    }

    async fn insert_order(&self, order: &OrderAggregate, events: &[EventEnvelope<OrderEvent>]) -> StoreResult<()> {
        let mut state = self.state.write().await;
        if state.order_events.contains_key(&order.id) {
            return Err(StoreError::AlreadyExists {
                entity: "order",
                key: order.id.to_string(),
            });
        }
        state.orders.push(order.clone());
        state.order_events.insert(order.id, events.to_vec());
        Ok(())
    }

    async fn update_order(
        &self,
        order: &OrderAggregate,
        expected_version: i64,
        events: &[EventEnvelope<OrderEvent>],
    ) -> StoreResult<()> {
        let mut state = self.state.write().await;
        let MemoryState { orders, order_events, .. } = &mut *state;

        let stored = orders
            .iter_mut()
            .find(|o| o.id == order.id)
            .ok_or_else(|| StoreError::Malformed {
                entity: "order",
                reason: format!("update of unknown order {}", order.id),
            })?;

        if stored.version != expected_version {
            return Err(StoreError::Conflict {
                entity: "order",
                id: order.id,
                expected: expected_version,
                actual: stored.version,
            });
        }

        *stored = order.clone();
        order_events.entry(order.id).or_default().extend_from_slice(events);
        Ok(())
    }

    async fn get_order(&self, id: Uuid) -> StoreResult<Option<OrderAggregate>> {
        let state = self.state.read().await;
        Ok(state.orders.iter().find(|o| o.id == id).cloned())
    }

    async fn list_orders_by_kitchen(&self, kitchen_id: Uuid) -> StoreResult<Vec<OrderAggregate>> {
        let state = self.state.read().await;
        Ok(state
            .orders
            .iter()
            .rev()
            .filter(|o| o.kitchen_id == kitchen_id)
            .cloned()
            .collect())
    }

    async fn load_order_events(&self, order_id: Uuid) -> StoreResult<Vec<EventEnvelope<OrderEvent>>> {
        let state = self.state.read().await;
        Ok(state.order_events.get(&order_id).cloned().unwrap_or_default())
    }

    async fn insert_discount(&self, discount: &Discount) -> StoreResult<()> {
        let mut state = self.state.write().await;
        if state.discounts.iter().any(|d| d.code == discount.code) {
            return Err(StoreError::AlreadyExists {
                entity: "discount",
                key: discount.code.clone(),
            });
        }
        state.discounts.push(discount.clone());
        Ok(())
    }

    async fn find_discount_by_code(&self, code: &str) -> StoreResult<Option<Discount>> {
        let state = self.state.read().await;
        Ok(state.discounts.iter().find(|d| d.code == code).cloned())
    }

    async fn list_discounts(&self) -> StoreResult<Vec<Discount>> {
        Ok(self.state.read().await.discounts.clone())
    }

    async fn insert_user(&self, user: &User) -> StoreResult<()> {
        let mut state = self.state.write().await;
        if state.users.iter().any(|u| u.email == user.email) {
            return Err(StoreError::AlreadyExists {
                entity: "user",
                key: user.email.clone(),
            });
        }
        state.users.push(user.clone());
        Ok(())
    }

    async fn update_user(&self, user: &User) -> StoreResult<()> {
        let mut state = self.state.write().await;
        match state.users.iter_mut().find(|u| u.email == user.email) {
            Some(existing) => *existing = user.clone(),
            None => state.users.push(user.clone()),
        }
        Ok(())
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let state = self.state.read().await;
        Ok(state.users.iter().find(|u| u.email == email).cloned())
    }

    async fn insert_transaction(&self, transaction: &PaymentTransaction) -> StoreResult<()> {
        let mut state = self.state.write().await;
        if state
            .transactions
            .iter()
            .any(|t| t.idempotency_key == transaction.idempotency_key)
        {
            return Err(StoreError::AlreadyExists {
                entity: "transaction",
                key: transaction.idempotency_key.clone(),
            });
        }
        state.transactions.push(transaction.clone());
        Ok(())
    }

    async fn update_transaction(&self, transaction: &PaymentTransaction) -> StoreResult<bool> {
        let mut state = self.state.write().await;
        match state.transactions.iter_mut().find(|t| t.id == transaction.id) {
            Some(existing) => {
                *existing = transaction.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn get_transaction(&self, id: Uuid) -> StoreResult<Option<PaymentTransaction>> {
        let state = self.state.read().await;
        Ok(state.transactions.iter().find(|t| t.id == id).cloned())
    }

    async fn find_transaction_by_key(&self, idempotency_key: &str) -> StoreResult<Option<PaymentTransaction>> {
        let state = self.state.read().await;
        Ok(state
            .transactions
            .iter()
            .find(|t| t.idempotency_key == idempotency_key)
            .cloned())
    }

    async fn list_transactions_by_kitchen(&self, kitchen_id: Uuid) -> StoreResult<Vec<PaymentTransaction>> {
        let state = self.state.read().await;
        Ok(state
            .transactions
            .iter()
            .filter(|t| t.kitchen_id == Some(kitchen_id))
            .cloned()
            .collect())
    }
}
