// ============================================================================
// Discount Domain - Codes, Scopes and Pricing
// ============================================================================
//
// - Value objects (Discount, DiscountScope, DiscountKind, PriceQuote)
// - Pricing (pure validation + amount computation)
// - Errors (DiscountError)
// - Service (create, list, validate_and_price over the store)
//
// ============================================================================

pub mod value_objects;
pub mod errors;
pub mod pricing;
pub mod service;

pub use value_objects::*;
pub use errors::*;
pub use pricing::*;
pub use service::*;
