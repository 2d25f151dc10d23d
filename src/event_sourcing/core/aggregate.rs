use anyhow::Result;
use uuid::Uuid;

use super::event::EventEnvelope;

// ============================================================================
// Aggregate Root Pattern
// ============================================================================
//
// 1. Commands are validated against current state before any event exists
// 2. Events are facts; applying them never fails for a well-formed history
// 3. Every applied event bumps the aggregate version by one
//
// ============================================================================

/// Generic aggregate trait implemented by every event-recorded aggregate
///
/// Type Parameters:
/// - `Event`: the domain event type for this aggregate
/// - `Command`: the command type accepted once the aggregate exists
/// - `Error`: business rule violations
pub trait Aggregate: Sized + Send + Sync {
    type Event;
    type Command;
    type Error;

    /// Create the aggregate from its first event
    fn apply_first_event(event: &Self::Event) -> Result<Self, Self::Error>;

    /// Apply a subsequent event to update state
    fn apply_event(&mut self, event: &Self::Event) -> Result<(), Self::Error>;

    /// Handle a command and emit events (business logic)
    fn handle_command(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error>;

    fn aggregate_id(&self) -> Uuid;

    /// Current version, equal to the sequence number of the last applied event
    fn version(&self) -> i64;

    /// Rebuild an aggregate from its event history
    fn load_from_events(events: &[EventEnvelope<Self::Event>]) -> Result<Self>
    where
        Self::Error: std::fmt::Display,
    {
        let (first, rest) = match events.split_first() {
            Some(split) => split,
            None => anyhow::bail!("No events to load"),
        };

        let mut aggregate = Self::apply_first_event(&first.event_data)
            .map_err(|e| anyhow::anyhow!("Failed to apply first event: {}", e))?;

        for envelope in rest {
            aggregate
                .apply_event(&envelope.event_data)
                .map_err(|e| anyhow::anyhow!("Failed to apply event {}: {}", envelope.event_id, e))?;
        }

        Ok(aggregate)
    }
}
