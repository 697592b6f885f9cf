use uuid::Uuid;
use super::event::EventEnvelope;

// ============================================================================
// Aggregate Root Pattern
// ============================================================================
//
// - Current state is the fold of the aggregate's event stream
// - Commands are checked against current state before any event exists
// - handle_command never mutates; only apply_event does
//
// ============================================================================

/// An event-sourced aggregate.
///
/// Type Parameters:
/// - `Event`: the facts this aggregate records
/// - `Command`: requests to change it
/// - `Error`: why a command was refused
pub trait Aggregate: Sized + Send + Sync {
    type Event;
    type Command;
    type Error;

    /// Build the aggregate from the first event of its stream.
    fn apply_first_event(aggregate_id: Uuid, event: &Self::Event) -> Result<Self, Self::Error>;

    /// Fold one more event into current state.
    fn apply_event(&mut self, event: &Self::Event) -> Result<(), Self::Error>;

    /// Decide which events a command produces, without changing state.
    fn handle_command(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error>;

    fn aggregate_id(&self) -> Uuid;

    /// Sequence number of the last applied event.
    fn version(&self) -> i64;

    fn set_version(&mut self, version: i64);

    /// Rebuild from a stored stream. `Ok(None)` means the stream is empty.
    fn load_from_events(events: &[EventEnvelope<Self::Event>]) -> Result<Option<Self>, Self::Error> {
        let Some((first, rest)) = events.split_first() else {
            return Ok(None);
        };

        let mut aggregate = Self::apply_first_event(first.aggregate_id, &first.event_data)?;
        aggregate.set_version(first.sequence_number);

        for envelope in rest {
            aggregate.apply_event(&envelope.event_data)?;
            aggregate.set_version(envelope.sequence_number);
        }

        Ok(Some(aggregate))
    }

    /// Apply events that were just accepted by the store.
    fn apply_all(&mut self, events: &[EventEnvelope<Self::Event>]) -> Result<(), Self::Error> {
        for envelope in events {
            self.apply_event(&envelope.event_data)?;
            self.set_version(envelope.sequence_number);
        }
        Ok(())
    }
}
