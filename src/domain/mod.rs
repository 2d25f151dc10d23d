// ============================================================================
// Domain Layer - Business Logic
// ============================================================================
//
// Orders are event-recorded aggregates with their own subdirectory:
// - Value objects
// - Events
// - Commands
// - Errors
// - Aggregate implementation
// - Command handler
//
// The remaining domains are service-style over the shared `Store`.
//
// ============================================================================

pub mod order;
pub mod discount;
pub mod catalog;
pub mod identity;
pub mod ledger;
