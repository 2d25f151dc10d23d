use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;

use super::errors::LedgerError;
use crate::models::{PaymentTransaction, TransactionStatus};
use crate::store::{Store, StoreError};

pub const DEFAULT_CURRENCY: &str = "INR";

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTransaction {
    pub amount: Decimal,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub brand_slug: Option<String>,
    #[serde(default)]
    pub kitchen_id: Option<Uuid>,
    pub idempotency_key: String,
    #[serde(default)]
    pub notes: Option<String>,
}

pub struct LedgerService {
    store: Arc<dyn Store>,
}

impl LedgerService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Record a pending transaction; a reused idempotency key returns the
    /// id of the transaction recorded first
    pub async fn create(&self, new: NewTransaction) -> Result<Uuid, LedgerError> {
        if new.idempotency_key.trim().is_empty() {
            return Err(LedgerError::EmptyIdempotencyKey);
        }
        if new.amount.is_sign_negative() && !new.amount.is_zero() {
            return Err(LedgerError::NegativeAmount(new.amount));
        }

        if let Some(existing) = self.store.find_transaction_by_key(&new.idempotency_key).await? {
            tracing::debug!(transaction_id = %existing.id, "Idempotency key reused");
            return Ok(existing.id);
        }

        let now = Utc::now();
        let transaction = PaymentTransaction {
            id: Uuid::new_v4(),
            kitchen_id: new.kitchen_id,
            brand_slug: new.brand_slug,
            amount: new.amount,
            currency: new.currency.unwrap_or_else(|| DEFAULT_CURRENCY.to_string()),
            status: TransactionStatus::Pending,
            idempotency_key: new.idempotency_key,
            notes: new.notes,
            created_at: now,
            updated_at: now,
        };

        match self.store.insert_transaction(&transaction).await {
            Ok(()) => {}
            Err(StoreError::AlreadyExists { .. }) => {
                // Concurrent create with the same key got there first
                let existing = self
                    .store
                    .find_transaction_by_key(&transaction.idempotency_key)
                    .await?
                    .ok_or_else(|| StoreError::Malformed {
                        entity: "transaction",
                        reason: format!("key {} reserved but not readable", transaction.idempotency_key),
                    })?;
                return Ok(existing.id);
            }
            Err(e) => return Err(e.into()),
        }

        tracing::info!(
            transaction_id = %transaction.id,
            amount = %transaction.amount,
            currency = %transaction.currency,
            "💳 Transaction recorded"
        );
        Ok(transaction.id)
    }

    /// Settle a transaction as SUCCESS, FAILED or CANCELLED
    pub async fn mark_status(&self, id: Uuid, status: TransactionStatus) -> Result<PaymentTransaction, LedgerError> {
        if !status.is_terminal() {
            return Err(LedgerError::InvalidStatus(status));
        }

        let mut transaction = self
            .store
            .get_transaction(id)
            .await?
            .ok_or(LedgerError::NotFound(id))?;
        transaction.status = status;
        transaction.updated_at = Utc::now();

        if !self.store.update_transaction(&transaction).await? {
            return Err(LedgerError::NotFound(id));
        }

        tracing::info!(transaction_id = %id, status = status.as_str(), "Transaction settled");
        Ok(transaction)
    }

    pub async fn list_by_kitchen(&self, kitchen_id: Uuid) -> Result<Vec<PaymentTransaction>, LedgerError> {
        Ok(self.store.list_transactions_by_kitchen(kitchen_id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn service() -> LedgerService {
        LedgerService::new(Arc::new(MemoryStore::new()))
    }

    fn new_transaction(key: &str, kitchen_id: Option<Uuid>) -> NewTransaction {
        NewTransaction {
            amount: Decimal::new(49900, 2),
            currency: None,
            brand_slug: None,
            kitchen_id,
            idempotency_key: key.to_string(),
            notes: None,
        }
    }

    #[tokio::test]
    async fn test_idempotency_key_returns_first_id() {
        let service = service();
        let kitchen = Uuid::new_v4();
        let first = service.create(new_transaction("pay-1", Some(kitchen))).await.unwrap();
        let second = service.create(new_transaction("pay-1", Some(kitchen))).await.unwrap();

        assert_eq!(first, second);
        let listed = service.list_by_kitchen(kitchen).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].currency, "INR");
        assert_eq!(listed[0].status, TransactionStatus::Pending);
    }

    #[tokio::test]
    async fn test_mark_status() {
        let service = service();
        let id = service.create(new_transaction("pay-2", None)).await.unwrap();

        let settled = service.mark_status(id, TransactionStatus::Success).await.unwrap();
        assert_eq!(settled.status, TransactionStatus::Success);
        assert!(settled.updated_at >= settled.created_at);

        assert!(matches!(
            service.mark_status(id, TransactionStatus::Pending).await,
            Err(LedgerError::InvalidStatus(TransactionStatus::Pending))
        ));
        assert!(matches!(
            service.mark_status(Uuid::new_v4(), TransactionStatus::Failed).await,
            Err(LedgerError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_create_validation() {
        let service = service();
        assert!(matches!(
            service.create(new_transaction(" ", None)).await,
            Err(LedgerError::EmptyIdempotencyKey)
        ));

        let mut negative = new_transaction("pay-3", None);
        negative.amount = Decimal::from(-10);
        assert!(matches!(service.create(negative).await, Err(LedgerError::NegativeAmount(_))));
    }
}
