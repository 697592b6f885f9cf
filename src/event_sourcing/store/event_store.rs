use async_trait::async_trait;
use uuid::Uuid;

use crate::event_sourcing::core::{DomainEvent, EventEnvelope};

// ============================================================================
// Event Store - Repository for Event Streams
// ============================================================================
//
// Responsibilities:
// 1. Append events to an aggregate's stream (append-only)
// 2. Load an aggregate's stream in sequence order
// 3. Optimistic concurrency: an append only succeeds if the stream is still
//    at `expected_version`, and all events of one append land together
//
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Concurrency conflict on {aggregate_id}: expected version {expected}")]
    Conflict { aggregate_id: Uuid, expected: i64 },

    #[error("Cannot append empty event list")]
    EmptyAppend,

    #[error("Event serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[async_trait]
pub trait EventStore<E: DomainEvent + 'static>: Send + Sync {
    /// Append `events` after `expected_version`, returning the new version.
    async fn append_events(
        &self,
        aggregate_id: Uuid,
        expected_version: i64,
        events: Vec<EventEnvelope<E>>,
    ) -> Result<i64, StoreError>;

    /// Load an aggregate's stream ordered by sequence number. Unknown ids
    /// yield an empty list.
    async fn load_events(&self, aggregate_id: Uuid) -> Result<Vec<EventEnvelope<E>>, StoreError>;
}
