use rust_decimal::Decimal;
use uuid::Uuid;

use crate::store::StoreError;

// ============================================================================
// Catalog Errors
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Kitchen name already taken: {0}")]
    DuplicateName(String),

    #[error("Name cannot be empty")]
    EmptyName,

    #[error("Price cannot be negative: {0}")]
    NegativePrice(Decimal),

    #[error("Kitchen not found: {0}")]
    KitchenNotFound(Uuid),

    #[error("Menu item not found: {0}")]
    MenuItemNotFound(Uuid),

    #[error(transparent)]
    Store(#[from] StoreError),
}
