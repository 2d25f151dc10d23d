// ============================================================================
// Ledger Domain - Payment Transactions
// ============================================================================
//
// Records payment attempts keyed by a client idempotency key. No payment
// provider is wired in; status is set by whoever settles the payment.
//
// ============================================================================

pub mod errors;
pub mod service;

pub use errors::*;
pub use service::*;
