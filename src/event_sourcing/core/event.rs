use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};

// ============================================================================
// Event Envelope - metadata wrapped around every stored event
// ============================================================================

/// A domain event together with the metadata the store needs to order and
/// trace it.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct EventEnvelope<E> {
    pub event_id: Uuid,
    pub aggregate_id: Uuid,
    /// Position in the aggregate's stream, starting at 1.
    pub sequence_number: i64,

    pub event_type: String,
    pub event_version: i32,

    pub event_data: E,

    /// Shared by every event produced while handling one request.
    pub correlation_id: Uuid,

    pub timestamp: DateTime<Utc>,
}

impl<E: DomainEvent> EventEnvelope<E> {
    pub fn new(
        aggregate_id: Uuid,
        sequence_number: i64,
        event_data: E,
        correlation_id: Uuid,
    ) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            aggregate_id,
            sequence_number,
            event_type: event_data.event_type().to_string(),
            event_version: E::schema_version(),
            event_data,
            correlation_id,
            timestamp: Utc::now(),
        }
    }

    /// Wrap a batch of freshly produced events, numbering them after
    /// `current_version`.
    pub fn sequence(
        aggregate_id: Uuid,
        current_version: i64,
        events: Vec<E>,
        correlation_id: Uuid,
    ) -> Vec<Self> {
        events
            .into_iter()
            .zip(current_version + 1..)
            .map(|(event, seq)| Self::new(aggregate_id, seq, event, correlation_id))
            .collect()
    }
}

// ============================================================================
// Domain Event Trait
// ============================================================================

pub trait DomainEvent: Serialize + for<'de> Deserialize<'de> + Clone + Send + Sync {
    /// Stable name stored alongside the payload, e.g. `"OrderCancelled"`.
    fn event_type(&self) -> &'static str;

    fn schema_version() -> i32 where Self: Sized { 1 }
}
