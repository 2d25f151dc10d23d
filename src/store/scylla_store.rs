use std::str::FromStr;
use std::sync::Arc;

use anyhow::{bail, Context};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use scylla::client::session::Session;
use scylla::client::session_builder::SessionBuilder;
use scylla::deserialize::row::DeserializeRow;
use scylla::serialize::row::SerializeRow;
use scylla::statement::batch::Batch;
use uuid::Uuid;

use super::{Store, StoreError, StoreResult};
use crate::config::ScyllaConfig;
use crate::domain::discount::{Discount, DiscountKind, DiscountScope};
use crate::domain::order::{OrderAggregate, OrderEvent, OrderStatus};
use crate::event_sourcing::{deserialize_event, serialize_event, EventEnvelope};
use crate::models::{Kitchen, MenuItem, PaymentTransaction, Role, TransactionStatus, User};
use crate::utils::{retry_with_backoff, RetryConfig};

// ============================================================================
// ScyllaDB Store
// ============================================================================
//
// Tables:
// - kitchens, kitchen_names        (LWT reservation of the lowercased name)
// - menu_items                     (secondary index on kitchen_id)
// - orders, kitchen_orders         (snapshot by id / by kitchen newest first)
// - order_events                   (partitioned by order, clustered by sequence)
// - discounts                      (keyed by code, LWT insert)
// - users                          (keyed by email, LWT insert)
// - transactions, transaction_keys (LWT reservation of the idempotency key)
//
// Money is stored as decimal text; order lines and events as JSON text.
// Uniqueness uses `INSERT ... IF NOT EXISTS` followed by a read-back of the
// winning row. A reservation whose record write fails is released again.
// Menu item edits and deletes are `IF EXISTS` so they never resurrect a row;
// their only result column is `[applied]`.
//
// ============================================================================

const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS kitchens (
        id uuid PRIMARY KEY, name text, brand_slug text, created_at timestamp)",
    "CREATE TABLE IF NOT EXISTS kitchen_names (
        name_key text PRIMARY KEY, kitchen_id uuid)",
    "CREATE TABLE IF NOT EXISTS menu_items (
        id uuid PRIMARY KEY, kitchen_id uuid, name text, price text, image_url text)",
    "CREATE INDEX IF NOT EXISTS menu_items_by_kitchen ON menu_items (kitchen_id)",
    "CREATE TABLE IF NOT EXISTS orders (
        order_id uuid PRIMARY KEY, kitchen_id uuid, placed_at timestamp, status text,
        version bigint, items text, total_amount text, updated_at timestamp)",
    "CREATE TABLE IF NOT EXISTS kitchen_orders (
        order_id uuid, kitchen_id uuid, placed_at timestamp, status text,
        version bigint, items text, total_amount text, updated_at timestamp,
        PRIMARY KEY ((kitchen_id), placed_at, order_id)
     ) WITH CLUSTERING ORDER BY (placed_at DESC, order_id DESC)",
    "CREATE TABLE IF NOT EXISTS order_events (
        order_id uuid, sequence_number bigint, event_id uuid, event_type text,
        event_version int, event_data text, correlation_id uuid, timestamp timestamp,
        PRIMARY KEY ((order_id), sequence_number))",
    "CREATE TABLE IF NOT EXISTS discounts (
        code text PRIMARY KEY, id uuid, scope text, brand_slug text, kitchen_id uuid,
        description text, kind text, value text, starts_at timestamp, ends_at timestamp,
        max_redemptions int, is_active boolean, created_at timestamp)",
    "CREATE TABLE IF NOT EXISTS users (
        email text PRIMARY KEY, id uuid, role text, brand_slug text, kitchen_id uuid,
        created_at timestamp)",
    "CREATE TABLE IF NOT EXISTS transactions (
        id uuid PRIMARY KEY, kitchen_id uuid, brand_slug text, amount text, currency text,
        status text, idempotency_key text, notes text, created_at timestamp, updated_at timestamp)",
    "CREATE INDEX IF NOT EXISTS transactions_by_kitchen ON transactions (kitchen_id)",
    "CREATE TABLE IF NOT EXISTS transaction_keys (
        idempotency_key text PRIMARY KEY, transaction_id uuid)",
];

const UPDATE_MENU_ITEM: &str =
    "UPDATE menu_items SET kitchen_id = ?, name = ?, price = ?, image_url = ? WHERE id = ? IF EXISTS";
const DELETE_MENU_ITEM: &str = "DELETE FROM menu_items WHERE id = ? IF EXISTS";

const KITCHEN_COLUMNS: &str = "id, name, brand_slug, created_at";
const MENU_COLUMNS: &str = "id, kitchen_id, name, price, image_url";
const ORDER_COLUMNS: &str = "order_id, kitchen_id, placed_at, status, version, items, total_amount, updated_at";
const EVENT_COLUMNS: &str =
    "order_id, sequence_number, event_id, event_type, event_version, event_data, correlation_id, timestamp";
const DISCOUNT_COLUMNS: &str = "code, id, scope, brand_slug, kitchen_id, description, kind, value, \
     starts_at, ends_at, max_redemptions, is_active, created_at";
const USER_COLUMNS: &str = "email, id, role, brand_slug, kitchen_id, created_at";
const TRANSACTION_COLUMNS: &str = "id, kitchen_id, brand_slug, amount, currency, status, \
     idempotency_key, notes, created_at, updated_at";

type KitchenRow = (Uuid, String, Option<String>, DateTime<Utc>);
type MenuRow = (Uuid, Uuid, String, String, Option<String>);
type OrderRow = (Uuid, Uuid, DateTime<Utc>, String, i64, String, String, DateTime<Utc>);
type EventRow = (Uuid, i64, Uuid, String, i32, String, Uuid, DateTime<Utc>);
type DiscountRow = (
    String,
    Uuid,
    String,
    Option<String>,
    Option<Uuid>,
    Option<String>,
    String,
    String,
    Option<DateTime<Utc>>,
    Option<DateTime<Utc>>,
    Option<i32>,
    bool,
    DateTime<Utc>,
);
type UserRow = (String, Uuid, String, Option<String>, Option<Uuid>, DateTime<Utc>);
type TransactionRow = (
    Uuid,
    Option<Uuid>,
    Option<String>,
    String,
    String,
    String,
    String,
    Option<String>,
    DateTime<Utc>,
    DateTime<Utc>,
);

type BoxedRow = Box<dyn SerializeRow + Send + Sync>;

pub struct ScyllaStore {
    session: Arc<Session>,
}

impl ScyllaStore {
    /// Connect with retry, then create the keyspace and tables if missing
    pub async fn connect(config: &ScyllaConfig) -> anyhow::Result<Self> {
        if config.keyspace.is_empty() || !config.keyspace.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            bail!("Invalid keyspace name: {:?}", config.keyspace);
        }

        let retry = RetryConfig::with_attempts(config.connect_attempts);
        let session = retry_with_backoff(&retry, |attempt| {
            let nodes = config.known_nodes.clone();
            async move {
                tracing::info!(attempt, nodes = ?nodes, "Connecting to ScyllaDB...");
                SessionBuilder::new().known_nodes(nodes).build().await
            }
        })
        .await
        .context("Failed to connect to ScyllaDB")?;

        session
            .query_unpaged(
                format!(
                    "CREATE KEYSPACE IF NOT EXISTS {} WITH REPLICATION = \
                     {{'class': 'SimpleStrategy', 'replication_factor': {}}}",
                    config.keyspace, config.replication_factor
                ),
                &[],
            )
            .await?;
        session.use_keyspace(&config.keyspace, false).await?;

        for statement in SCHEMA {
            session.query_unpaged(*statement, &[]).await?;
        }

        tracing::info!(keyspace = %config.keyspace, "✅ ScyllaDB schema ready");
        Ok(Self::new(Arc::new(session)))
    }

    pub fn new(session: Arc<Session>) -> Self {
        Self { session }
    }

    async fn execute(&self, cql: &str, values: impl SerializeRow) -> StoreResult<()> {
        self.session.query_unpaged(cql, values).await.map_err(backend)?;
        Ok(())
    }

    async fn select<T>(&self, cql: &str, values: impl SerializeRow) -> StoreResult<Vec<T>>
    where
        T: for<'frame, 'metadata> DeserializeRow<'frame, 'metadata>,
    {
        let result = self.session.query_unpaged(cql, values).await.map_err(backend)?;
        let rows_result = result.into_rows_result().map_err(backend)?;
        let mut rows = Vec::new();
        for row in rows_result.rows::<T>().map_err(backend)? {
            rows.push(row.map_err(backend)?);
        }
        Ok(rows)
    }

    async fn select_one<T>(&self, cql: &str, values: impl SerializeRow) -> StoreResult<Option<T>>
    where
        T: for<'frame, 'metadata> DeserializeRow<'frame, 'metadata>,
    {
        Ok(self.select(cql, values).await?.into_iter().next())
    }

    async fn current_order_version(&self, order_id: Uuid) -> StoreResult<Option<i64>> {
        let row: Option<(i64,)> = self
            .select_one("SELECT version FROM orders WHERE order_id = ?", (order_id,))
            .await?;
        Ok(row.map(|(version,)| version))
    }

    /// Snapshot rows for both order tables plus one row per event, in one batch
    async fn write_order(&self, order: &OrderAggregate, events: &[EventEnvelope<OrderEvent>]) -> StoreResult<()> {
        let snapshot = order_to_row(order)?;

        let mut batch = Batch::default();
        let mut values: Vec<BoxedRow> = Vec::with_capacity(events.len() + 2);

        batch.append_statement(format!("INSERT INTO orders ({}) VALUES (?, ?, ?, ?, ?, ?, ?, ?)", ORDER_COLUMNS).as_str());
        values.push(Box::new(snapshot.clone()));
        batch.append_statement(
            format!("INSERT INTO kitchen_orders ({}) VALUES (?, ?, ?, ?, ?, ?, ?, ?)", ORDER_COLUMNS).as_str(),
        );
        values.push(Box::new(snapshot));

        for envelope in events {
            batch.append_statement(
                format!("INSERT INTO order_events ({}) VALUES (?, ?, ?, ?, ?, ?, ?, ?)", EVENT_COLUMNS).as_str(),
            );
            values.push(Box::new(event_to_row(envelope)?));
        }

        self.session.batch(&batch, values).await.map_err(backend)?;
        Ok(())
    }

    /// Reserve `key` in a single-column lookup table; returns the owner id
    async fn reserve(&self, table: &str, key_column: &str, id_column: &str, key: &str, id: Uuid) -> StoreResult<Uuid> {
        self.execute(
            &format!("INSERT INTO {} ({}, {}) VALUES (?, ?) IF NOT EXISTS", table, key_column, id_column),
            (key, id),
        )
        .await?;

        let owner: Option<(Uuid,)> = self
            .select_one(
                &format!("SELECT {} FROM {} WHERE {} = ?", id_column, table, key_column),
                (key,),
            )
            .await?;
        owner.map(|(owner,)| owner).ok_or_else(|| StoreError::Malformed {
            entity: "reservation",
            reason: format!("{} {} vanished after insert", table, key),
        })
    }

    /// Drop a reservation, but only while `id` still owns it
    async fn release(&self, table: &str, key_column: &str, id_column: &str, key: &str, id: Uuid) -> StoreResult<()> {
        self.execute(
            &format!("DELETE FROM {} WHERE {} = ? IF {} = ?", table, key_column, id_column),
            (key, id),
        )
        .await
    }

    /// Runs a conditional statement and reports its `[applied]` flag
    async fn applied(&self, cql: &str, values: impl SerializeRow) -> StoreResult<bool> {
        let row: Option<(bool,)> = self.select_one(cql, values).await?;
        Ok(row.is_some_and(|(applied,)| applied))
    }
}

#[async_trait]
impl Store for ScyllaStore {
    async fn ping(&self) -> StoreResult<()> {
        self.execute("SELECT release_version FROM system.local", &[]).await
    }

    // --- kitchens ---------------------------------------------------------

    async fn insert_kitchen(&self, kitchen: &Kitchen) -> StoreResult<()> {
        let key = kitchen.name_key();
        let owner = self
            .reserve("kitchen_names", "name_key", "kitchen_id", &key, kitchen.id)
            .await?;
        if owner != kitchen.id {
            return Err(StoreError::AlreadyExists { entity: "kitchen", key });
        }

        let row: KitchenRow = (kitchen.id, kitchen.name.clone(), kitchen.brand_slug.clone(), kitchen.created_at);
        let written = self
            .execute(&format!("INSERT INTO kitchens ({}) VALUES (?, ?, ?, ?)", KITCHEN_COLUMNS), row)
            .await;
        release_on_error(
            written,
            self.release("kitchen_names", "name_key", "kitchen_id", &key, kitchen.id),
        )
        .await
    }

    async fn get_kitchen(&self, id: Uuid) -> StoreResult<Option<Kitchen>> {
        let row: Option<KitchenRow> = self
            .select_one(&format!("SELECT {} FROM kitchens WHERE id = ?", KITCHEN_COLUMNS), (id,))
            .await?;
        Ok(row.map(kitchen_from_row))
    }

    async fn list_kitchens(&self) -> StoreResult<Vec<Kitchen>> {
        let rows: Vec<KitchenRow> = self
            .select(&format!("SELECT {} FROM kitchens", KITCHEN_COLUMNS), &[])
            .await?;
        let mut kitchens: Vec<Kitchen> = rows.into_iter().map(kitchen_from_row).collect();
        kitchens.sort_by_key(|k| k.created_at);
        Ok(kitchens)
    }

    // --- menu items -------------------------------------------------------

    async fn insert_menu_item(&self, item: &MenuItem) -> StoreResult<()> {
        self.execute(
            &format!("INSERT INTO menu_items ({}) VALUES (?, ?, ?, ?, ?)", MENU_COLUMNS),
            menu_to_row(item),
        )
        .await
    }

    async fn insert_menu_items(&self, items: &[MenuItem]) -> StoreResult<()> {
        if items.is_empty() {
            return Ok(());
        }

        let statement = format!("INSERT INTO menu_items ({}) VALUES (?, ?, ?, ?, ?)", MENU_COLUMNS);
        let mut batch = Batch::default();
        for _ in items {
            batch.append_statement(statement.as_str());
        }
        let values: Vec<MenuRow> = items.iter().map(menu_to_row).collect();

        self.session.batch(&batch, values).await.map_err(backend)?;
        tracing::debug!(count = items.len(), "Batched menu item insert");
        Ok(())
    }

    async fn get_menu_item(&self, id: Uuid) -> StoreResult<Option<MenuItem>> {
        let row: Option<MenuRow> = self
            .select_one(&format!("SELECT {} FROM menu_items WHERE id = ?", MENU_COLUMNS), (id,))
            .await?;
        row.map(menu_from_row).transpose()
    }

    async fn get_menu_items(&self, ids: &[Uuid]) -> StoreResult<Vec<MenuItem>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let rows: Vec<MenuRow> = self
            .select(
                &format!("SELECT {} FROM menu_items WHERE id IN ?", MENU_COLUMNS),
                (ids.to_vec(),),
            )
            .await?;
        rows.into_iter().map(menu_from_row).collect()
    }

    async fn list_menu_items(&self, kitchen_id: Uuid) -> StoreResult<Vec<MenuItem>> {
        let rows: Vec<MenuRow> = self
            .select(
                &format!("SELECT {} FROM menu_items WHERE kitchen_id = ?", MENU_COLUMNS),
                (kitchen_id,),
            )
            .await?;
        rows.into_iter().map(menu_from_row).collect()
    }

    async fn update_menu_item(&self, item: &MenuItem) -> StoreResult<bool> {
        self.applied(UPDATE_MENU_ITEM, menu_update_values(item)).await
    }

    async fn delete_menu_item(&self, id: Uuid) -> StoreResult<bool> {
        self.applied(DELETE_MENU_ITEM, (id,)).await
    }

    // --- orders -----------------------------------------------------------

    async fn insert_order(&self, order: &OrderAggregate, events: &[EventEnvelope<OrderEvent>]) -> StoreResult<()> {
        if self.current_order_version(order.id).await?.is_some() {
            return Err(StoreError::AlreadyExists {
                entity: "order",
                key: order.id.to_string(),
            });
        }
        self.write_order(order, events).await?;
        tracing::debug!(order_id = %order.id, "Order written");
        Ok(())
    }

    async fn update_order(
        &self,
        order: &OrderAggregate,
        expected_version: i64,
        events: &[EventEnvelope<OrderEvent>],
    ) -> StoreResult<()> {
        let current = self
            .current_order_version(order.id)
            .await?
            .ok_or_else(|| StoreError::Malformed {
                entity: "order",
                reason: format!("update of unknown order {}", order.id),
            })?;

        if current != expected_version {
            return Err(StoreError::Conflict {
                entity: "order",
                id: order.id,
                expected: expected_version,
                actual: current,
            });
        }

        self.write_order(order, events).await
    }

    async fn get_order(&self, id: Uuid) -> StoreResult<Option<OrderAggregate>> {
        let row: Option<OrderRow> = self
            .select_one(&format!("SELECT {} FROM orders WHERE order_id = ?", ORDER_COLUMNS), (id,))
            .await?;
        row.map(order_from_row).transpose()
    }

    async fn list_orders_by_kitchen(&self, kitchen_id: Uuid) -> StoreResult<Vec<OrderAggregate>> {
        let rows: Vec<OrderRow> = self
            .select(
                &format!("SELECT {} FROM kitchen_orders WHERE kitchen_id = ?", ORDER_COLUMNS),
                (kitchen_id,),
            )
            .await?;
        rows.into_iter().map(order_from_row).collect()
    }

    async fn load_order_events(&self, order_id: Uuid) -> StoreResult<Vec<EventEnvelope<OrderEvent>>> {
        let rows: Vec<EventRow> = self
            .select(
                &format!(
                    "SELECT {} FROM order_events WHERE order_id = ? ORDER BY sequence_number ASC",
                    EVENT_COLUMNS
                ),
                (order_id,),
            )
            .await?;
        rows.into_iter().map(event_from_row).collect()
    }

    // --- discounts --------------------------------------------------------

    async fn insert_discount(&self, discount: &Discount) -> StoreResult<()> {
        self.execute(
            &format!(
                "INSERT INTO discounts ({}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?) IF NOT EXISTS",
                DISCOUNT_COLUMNS
            ),
            discount_to_row(discount),
        )
        .await?;

        match self.find_discount_by_code(&discount.code).await? {
            Some(stored) if stored.id == discount.id => Ok(()),
            _ => Err(StoreError::AlreadyExists {
                entity: "discount",
                key: discount.code.clone(),
            }),
        }
    }

    async fn find_discount_by_code(&self, code: &str) -> StoreResult<Option<Discount>> {
        let row: Option<DiscountRow> = self
            .select_one(&format!("SELECT {} FROM discounts WHERE code = ?", DISCOUNT_COLUMNS), (code,))
            .await?;
        row.map(discount_from_row).transpose()
    }

    async fn list_discounts(&self) -> StoreResult<Vec<Discount>> {
        let rows: Vec<DiscountRow> = self
            .select(&format!("SELECT {} FROM discounts", DISCOUNT_COLUMNS), &[])
            .await?;
        let mut discounts = rows
            .into_iter()
            .map(discount_from_row)
            .collect::<StoreResult<Vec<_>>>()?;
        discounts.sort_by_key(|d| d.created_at);
        Ok(discounts)
    }

    // --- users ------------------------------------------------------------

    async fn insert_user(&self, user: &User) -> StoreResult<()> {
        self.execute(
            &format!("INSERT INTO users ({}) VALUES (?, ?, ?, ?, ?, ?) IF NOT EXISTS", USER_COLUMNS),
            user_to_row(user),
        )
        .await?;

        match self.find_user_by_email(&user.email).await? {
            Some(stored) if stored.id == user.id => Ok(()),
            _ => Err(StoreError::AlreadyExists {
                entity: "user",
                key: user.email.clone(),
            }),
        }
    }

    async fn update_user(&self, user: &User) -> StoreResult<()> {
        self.execute(
            &format!("INSERT INTO users ({}) VALUES (?, ?, ?, ?, ?, ?)", USER_COLUMNS),
            user_to_row(user),
        )
        .await
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let row: Option<UserRow> = self
            .select_one(&format!("SELECT {} FROM users WHERE email = ?", USER_COLUMNS), (email,))
            .await?;
        row.map(user_from_row).transpose()
    }

    // --- payment transactions ---------------------------------------------

    async fn insert_transaction(&self, transaction: &PaymentTransaction) -> StoreResult<()> {
        let owner = self
            .reserve(
                "transaction_keys",
                "idempotency_key",
                "transaction_id",
                &transaction.idempotency_key,
                transaction.id,
            )
            .await?;
        if owner != transaction.id {
            return Err(StoreError::AlreadyExists {
                entity: "transaction",
                key: transaction.idempotency_key.clone(),
            });
        }

        let written = self.write_transaction(transaction).await;
        release_on_error(
            written,
            self.release(
                "transaction_keys",
                "idempotency_key",
                "transaction_id",
                &transaction.idempotency_key,
                transaction.id,
            ),
        )
        .await
    }

    async fn update_transaction(&self, transaction: &PaymentTransaction) -> StoreResult<bool> {
        if self.get_transaction(transaction.id).await?.is_none() {
            return Ok(false);
        }
        self.write_transaction(transaction).await?;
        Ok(true)
    }

    async fn get_transaction(&self, id: Uuid) -> StoreResult<Option<PaymentTransaction>> {
        let row: Option<TransactionRow> = self
            .select_one(
                &format!("SELECT {} FROM transactions WHERE id = ?", TRANSACTION_COLUMNS),
                (id,),
            )
            .await?;
        row.map(transaction_from_row).transpose()
    }

    async fn find_transaction_by_key(&self, idempotency_key: &str) -> StoreResult<Option<PaymentTransaction>> {
        let owner: Option<(Uuid,)> = self
            .select_one(
                "SELECT transaction_id FROM transaction_keys WHERE idempotency_key = ?",
                (idempotency_key,),
            )
            .await?;
        match owner {
            Some((id,)) => self.get_transaction(id).await,
            None => Ok(None),
        }
    }

    async fn list_transactions_by_kitchen(&self, kitchen_id: Uuid) -> StoreResult<Vec<PaymentTransaction>> {
        let rows: Vec<TransactionRow> = self
            .select(
                &format!("SELECT {} FROM transactions WHERE kitchen_id = ?", TRANSACTION_COLUMNS),
                (kitchen_id,),
            )
            .await?;
        let mut transactions = rows
            .into_iter()
            .map(transaction_from_row)
            .collect::<StoreResult<Vec<_>>>()?;
        transactions.sort_by_key(|t| t.created_at);
        Ok(transactions)
    }
}

impl ScyllaStore {
    async fn write_transaction(&self, transaction: &PaymentTransaction) -> StoreResult<()> {
        self.execute(
            &format!(
                "INSERT INTO transactions ({}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
                TRANSACTION_COLUMNS
            ),
            transaction_to_row(transaction),
        )
        .await
    }
}

// ============================================================================
// Row Mapping
// ============================================================================

fn backend<E>(e: E) -> StoreError
where
    E: std::error::Error + Send + Sync + 'static,
{
    StoreError::Backend(anyhow::Error::new(e))
}

/// Runs `undo` when `result` failed; the original error is what the caller sees
async fn release_on_error<T, U>(result: StoreResult<T>, undo: U) -> StoreResult<T>
where
    U: std::future::Future<Output = StoreResult<()>>,
{
    if let Err(error) = &result {
        tracing::warn!(error = %error, "Write failed, releasing reservation");
        if let Err(undo_error) = undo.await {
            tracing::error!(error = %undo_error, "Failed to release reservation");
        }
    }
    result
}

fn malformed(entity: &'static str, reason: impl ToString) -> StoreError {
    StoreError::Malformed {
        entity,
        reason: reason.to_string(),
    }
}

fn parse_decimal(entity: &'static str, value: &str) -> StoreResult<Decimal> {
    Decimal::from_str(value).map_err(|e| malformed(entity, format!("bad decimal {:?}: {}", value, e)))
}

fn kitchen_from_row((id, name, brand_slug, created_at): KitchenRow) -> Kitchen {
    Kitchen {
        id,
        name,
        brand_slug,
        created_at,
    }
}

fn menu_to_row(item: &MenuItem) -> MenuRow {
    (
        item.id,
        item.kitchen_id,
        item.name.clone(),
        item.price.to_string(),
        item.image_url.clone(),
    )
}

/// Binds in `UPDATE_MENU_ITEM` order, id last
fn menu_update_values(item: &MenuItem) -> (Uuid, String, String, Option<String>, Uuid) {
    (
        item.kitchen_id,
        item.name.clone(),
        item.price.to_string(),
        item.image_url.clone(),
        item.id,
    )
}

fn menu_from_row((id, kitchen_id, name, price, image_url): MenuRow) -> StoreResult<MenuItem> {
    Ok(MenuItem {
        id,
        kitchen_id,
        name,
        price: parse_decimal("menu_item", &price)?,
        image_url,
    })
}

fn order_to_row(order: &OrderAggregate) -> StoreResult<OrderRow> {
    let items = serialize_event(&order.items).map_err(|e| malformed("order", e))?;
    Ok((
        order.id,
        order.kitchen_id,
        order.placed_at,
        order.status.as_str().to_string(),
        order.version,
        items,
        order.total_amount.to_string(),
        order.updated_at,
    ))
}

fn order_from_row(row: OrderRow) -> StoreResult<OrderAggregate> {
    let (id, kitchen_id, placed_at, status, version, items, total_amount, updated_at) = row;
    Ok(OrderAggregate {
        id,
        version,
        kitchen_id,
        items: deserialize_event(&items).map_err(|e| malformed("order", e))?,
        total_amount: parse_decimal("order", &total_amount)?,
        status: OrderStatus::parse(&status).ok_or_else(|| malformed("order", format!("unknown status {}", status)))?,
        placed_at,
        updated_at,
    })
}

fn event_to_row(envelope: &EventEnvelope<OrderEvent>) -> StoreResult<EventRow> {
    let data = serialize_event(&envelope.event_data).map_err(|e| malformed("order_event", e))?;
    Ok((
        envelope.aggregate_id,
        envelope.sequence_number,
        envelope.event_id,
        envelope.event_type.clone(),
        envelope.event_version,
        data,
        envelope.correlation_id,
        envelope.timestamp,
    ))
}

fn event_from_row(row: EventRow) -> StoreResult<EventEnvelope<OrderEvent>> {
    let (aggregate_id, sequence_number, event_id, event_type, event_version, data, correlation_id, timestamp) = row;
    Ok(EventEnvelope {
        event_id,
        aggregate_id,
        sequence_number,
        event_type,
        event_version,
        event_data: deserialize_event(&data).map_err(|e| malformed("order_event", e))?,
        correlation_id,
        timestamp,
    })
}

fn discount_to_row(d: &Discount) -> DiscountRow {
    (
        d.code.clone(),
        d.id,
        d.scope.as_str().to_string(),
        d.brand_slug.clone(),
        d.kitchen_id,
        d.description.clone(),
        d.kind.as_str().to_string(),
        d.value.to_string(),
        d.starts_at,
        d.ends_at,
        d.max_redemptions.map(|cap| cap.min(i32::MAX as u32) as i32),
        d.is_active,
        d.created_at,
    )
}

fn discount_from_row(row: DiscountRow) -> StoreResult<Discount> {
    let (
        code,
        id,
        scope,
        brand_slug,
        kitchen_id,
        description,
        kind,
        value,
        starts_at,
        ends_at,
        max_redemptions,
        is_active,
        created_at,
    ) = row;

    Ok(Discount {
        id,
        code,
        scope: DiscountScope::parse(&scope).ok_or_else(|| malformed("discount", format!("unknown scope {}", scope)))?,
        brand_slug,
        kitchen_id,
        description,
        kind: DiscountKind::parse(&kind).ok_or_else(|| malformed("discount", format!("unknown type {}", kind)))?,
        value: parse_decimal("discount", &value)?,
        starts_at,
        ends_at,
        max_redemptions: max_redemptions.map(|cap| cap.max(0) as u32),
        is_active,
        created_at,
    })
}

fn user_to_row(user: &User) -> UserRow {
    (
        user.email.clone(),
        user.id,
        user.role.as_str().to_string(),
        user.brand_slug.clone(),
        user.kitchen_id,
        user.created_at,
    )
}

fn user_from_row((email, id, role, brand_slug, kitchen_id, created_at): UserRow) -> StoreResult<User> {
    Ok(User {
        id,
        email,
        role: Role::parse(&role).ok_or_else(|| malformed("user", format!("unknown role {}", role)))?,
        brand_slug,
        kitchen_id,
        created_at,
    })
}

fn transaction_to_row(t: &PaymentTransaction) -> TransactionRow {
    (
        t.id,
        t.kitchen_id,
        t.brand_slug.clone(),
        t.amount.to_string(),
        t.currency.clone(),
        t.status.as_str().to_string(),
        t.idempotency_key.clone(),
        t.notes.clone(),
        t.created_at,
        t.updated_at,
    )
}

fn transaction_from_row(row: TransactionRow) -> StoreResult<PaymentTransaction> {
    let (id, kitchen_id, brand_slug, amount, currency, status, idempotency_key, notes, created_at, updated_at) = row;
    Ok(PaymentTransaction {
        id,
        kitchen_id,
        brand_slug,
        amount: parse_decimal("transaction", &amount)?,
        currency,
        status: TransactionStatus::parse(&status)
            .ok_or_else(|| malformed("transaction", format!("unknown status {}", status)))?,
        idempotency_key,
        notes,
        created_at,
        updated_at,
    })
}
