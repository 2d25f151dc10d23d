// ============================================================================
// Event Sourcing Core - Generic Infrastructure Abstractions
// ============================================================================
//
// Nothing in here knows about orders, discounts or kitchens. Aggregates plug
// in through the `Aggregate` trait, their events through `DomainEvent`.
//
// ============================================================================

pub mod aggregate;
pub mod event;

pub use aggregate::Aggregate;
pub use event::{deserialize_event, serialize_event, DomainEvent, EventEnvelope};
