use rust_decimal::Decimal;

use super::value_objects::DiscountScope;
use crate::store::StoreError;

// ============================================================================
// Discount Errors
// ============================================================================
//
// Creation fails with these. Pricing a code never errors on business grounds
// (see `PriceQuote::Rejected`); it only refuses a subtotal it cannot price.
//
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum DiscountError {
    #[error("Discount code already exists: {0}")]
    DuplicateCode(String),

    #[error("Discount code cannot be empty")]
    EmptyCode,

    #[error("Discount value cannot be negative: {0}")]
    NegativeValue(Decimal),

    #[error("{0:?} discounts need a matching qualifier")]
    MissingQualifier(DiscountScope),

    #[error("Discount window starts after it ends")]
    InvertedWindow,

    #[error("Subtotal cannot be priced: {0}")]
    SubtotalOutOfRange(Decimal),

    #[error(transparent)]
    Store(#[from] StoreError),
}
