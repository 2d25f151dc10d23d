use rust_decimal::Decimal;
use uuid::Uuid;

use crate::models::TransactionStatus;
use crate::store::StoreError;

// ============================================================================
// Ledger Errors
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("Transaction not found: {0}")]
    NotFound(Uuid),

    #[error("Idempotency key cannot be empty")]
    EmptyIdempotencyKey,

    #[error("Amount cannot be negative: {0}")]
    NegativeAmount(Decimal),

    #[error("Status {} is not a settlement status", .0.as_str())]
    InvalidStatus(TransactionStatus),

    #[error(transparent)]
    Store(#[from] StoreError),
}
