// ============================================================================
// Store - Data Access Collaborator
// ============================================================================
//
// Every service reads and writes records through the `Store` trait. Two
// backends are provided:
// - memory  : tokio RwLock over insertion-ordered collections
// - scylla  : ScyllaDB session, one table per collection
//
// Uniqueness (discount code, kitchen name, idempotency key) is enforced by the
// backend on insert so callers never race a separate existence check.
//
// ============================================================================

mod memory;
mod scylla_store;

pub use memory::MemoryStore;
pub use scylla_store::ScyllaStore;

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::discount::Discount;
use crate::domain::order::{OrderAggregate, OrderEvent};
use crate::event_sourcing::EventEnvelope;
use crate::models::{Kitchen, MenuItem, PaymentTransaction, User};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A uniqueness constraint rejected the insert
    #[error("{entity} already exists: {key}")]
    AlreadyExists { entity: &'static str, key: String },

    #[error("Concurrency conflict on {entity} {id}: expected version {expected}, found {actual}")]
    Conflict {
        entity: &'static str,
        id: Uuid,
        expected: i64,
        actual: i64,
    },

    #[error("Stored {entity} is malformed: {reason}")]
    Malformed { entity: &'static str, reason: String },

    #[error("Store backend failure: {0}")]
    Backend(#[source] anyhow::Error),
}

impl StoreError {
    pub fn is_already_exists(&self) -> bool {
        matches!(self, StoreError::AlreadyExists { .. })
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait Store: Send + Sync {
    /// Cheap round trip used by health checks
    async fn ping(&self) -> StoreResult<()>;

    // --- kitchens ---------------------------------------------------------

    /// Fails with `AlreadyExists` when the case-insensitive name is taken
    async fn insert_kitchen(&self, kitchen: &Kitchen) -> StoreResult<()>;
    async fn get_kitchen(&self, id: Uuid) -> StoreResult<Option<Kitchen>>;
    /// Ordered by creation
    async fn list_kitchens(&self) -> StoreResult<Vec<Kitchen>>;

    // --- menu items -------------------------------------------------------

    async fn insert_menu_item(&self, item: &MenuItem) -> StoreResult<()>;
    /// Inserts every item or none of them
    async fn insert_menu_items(&self, items: &[MenuItem]) -> StoreResult<()>;
    async fn get_menu_item(&self, id: Uuid) -> StoreResult<Option<MenuItem>>;
    /// Single consistent read; unknown ids are simply absent from the result
    async fn get_menu_items(&self, ids: &[Uuid]) -> StoreResult<Vec<MenuItem>>;
    async fn list_menu_items(&self, kitchen_id: Uuid) -> StoreResult<Vec<MenuItem>>;
    /// Returns false when the item does not exist
    async fn update_menu_item(&self, item: &MenuItem) -> StoreResult<bool>;
    /// Returns false when the item does not exist
    async fn delete_menu_item(&self, id: Uuid) -> StoreResult<bool>;

    // --- orders -----------------------------------------------------------

    /// Writes the order snapshot and its first events in one step
    async fn insert_order(&self, order: &OrderAggregate, events: &[EventEnvelope<OrderEvent>]) -> StoreResult<()>;
    /// Replaces the snapshot if the stored version equals `expected_version`
    async fn update_order(
        &self,
        order: &OrderAggregate,
        expected_version: i64,
        events: &[EventEnvelope<OrderEvent>],
    ) -> StoreResult<()>;
    async fn get_order(&self, id: Uuid) -> StoreResult<Option<OrderAggregate>>;
    /// Newest first
    async fn list_orders_by_kitchen(&self, kitchen_id: Uuid) -> StoreResult<Vec<OrderAggregate>>;
    /// Sequence order
    async fn load_order_events(&self, order_id: Uuid) -> StoreResult<Vec<EventEnvelope<OrderEvent>>>;

    // --- discounts --------------------------------------------------------

    /// Fails with `AlreadyExists` when the code is taken (exact match)
    async fn insert_discount(&self, discount: &Discount) -> StoreResult<()>;
    async fn find_discount_by_code(&self, code: &str) -> StoreResult<Option<Discount>>;
    async fn list_discounts(&self) -> StoreResult<Vec<Discount>>;

    // --- users ------------------------------------------------------------

    /// Fails with `AlreadyExists` when the email is taken
    async fn insert_user(&self, user: &User) -> StoreResult<()>;
    /// Replaces the user stored under the same email
    async fn update_user(&self, user: &User) -> StoreResult<()>;
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;

    // --- payment transactions ---------------------------------------------

    /// Fails with `AlreadyExists` when the idempotency key was used before
    async fn insert_transaction(&self, transaction: &PaymentTransaction) -> StoreResult<()>;
    async fn update_transaction(&self, transaction: &PaymentTransaction) -> StoreResult<bool>;
    async fn get_transaction(&self, id: Uuid) -> StoreResult<Option<PaymentTransaction>>;
    async fn find_transaction_by_key(&self, idempotency_key: &str) -> StoreResult<Option<PaymentTransaction>>;
    /// Ordered by creation
    async fn list_transactions_by_kitchen(&self, kitchen_id: Uuid) -> StoreResult<Vec<PaymentTransaction>>;
}
