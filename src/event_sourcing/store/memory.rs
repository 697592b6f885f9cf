use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::event_sourcing::core::{DomainEvent, EventEnvelope};
use super::event_store::{EventStore, StoreError};

/// Process-local event store.
///
/// The version check and the push happen under one write guard, so two
/// appends racing on the same stream cannot both succeed.
pub struct InMemoryEventStore<E> {
    streams: RwLock<HashMap<Uuid, Vec<EventEnvelope<E>>>>,
}

impl<E> InMemoryEventStore<E> {
    pub fn new() -> Self {
        Self {
            streams: RwLock::new(HashMap::new()),
        }
    }
}

impl<E> Default for InMemoryEventStore<E> {
    fn default() -> Self {
        Self::new()
    }
}

fn stream_version<E>(stream: Option<&Vec<EventEnvelope<E>>>) -> i64 {
    stream
        .and_then(|events| events.last())
        .map(|last| last.sequence_number)
        .unwrap_or(0)
}

#[async_trait]
impl<E: DomainEvent + 'static> EventStore<E> for InMemoryEventStore<E> {
    async fn append_events(
        &self,
        aggregate_id: Uuid,
        expected_version: i64,
        events: Vec<EventEnvelope<E>>,
    ) -> Result<i64, StoreError> {
        if events.is_empty() {
            return Err(StoreError::EmptyAppend);
        }

        let mut streams = self.streams.write().await;

        let current_version = stream_version(streams.get(&aggregate_id));
        if current_version != expected_version {
            tracing::warn!(
                aggregate_id = %aggregate_id,
                expected_version,
                current_version,
                "Rejected append: stream moved on"
            );
            return Err(StoreError::Conflict {
                aggregate_id,
                expected: expected_version,
            });
        }

        let event_count = events.len();
        let stream = streams.entry(aggregate_id).or_default();
        stream.extend(events);
        let new_version = stream_version(Some(&*stream));

        tracing::debug!(
            aggregate_id = %aggregate_id,
            new_version,
            event_count,
            "Appended events to in-memory store"
        );

        Ok(new_version)
    }

    async fn load_events(&self, aggregate_id: Uuid) -> Result<Vec<EventEnvelope<E>>, StoreError> {
        let streams = self.streams.read().await;
        Ok(streams.get(&aggregate_id).cloned().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
    struct Tick(u32);

    impl DomainEvent for Tick {
        fn event_type(&self) -> &'static str { "Tick" }
    }

    fn batch(aggregate_id: Uuid, after: i64, ticks: &[u32]) -> Vec<EventEnvelope<Tick>> {
        EventEnvelope::sequence(
            aggregate_id,
            after,
            ticks.iter().copied().map(Tick).collect(),
            Uuid::new_v4(),
        )
    }

    #[tokio::test]
    async fn test_append_and_load_in_order() {
        let store: InMemoryEventStore<Tick> = InMemoryEventStore::new();
        let id = Uuid::new_v4();

        let v = store.append_events(id, 0, batch(id, 0, &[1, 2])).await.unwrap();
        assert_eq!(v, 2);
        let v = store.append_events(id, 2, batch(id, 2, &[3])).await.unwrap();
        assert_eq!(v, 3);

        let loaded = store.load_events(id).await.unwrap();
        let ticks: Vec<Tick> = loaded.into_iter().map(|e| e.event_data).collect();
        assert_eq!(ticks, vec![Tick(1), Tick(2), Tick(3)]);
    }

    #[tokio::test]
    async fn test_stale_expected_version_is_a_conflict() {
        let store: InMemoryEventStore<Tick> = InMemoryEventStore::new();
        let id = Uuid::new_v4();

        store.append_events(id, 0, batch(id, 0, &[1])).await.unwrap();
        let result = store.append_events(id, 0, batch(id, 0, &[9])).await;

        assert!(matches!(result, Err(StoreError::Conflict { expected: 0, .. })));
        assert_eq!(store.load_events(id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_empty_append_rejected() {
        let store: InMemoryEventStore<Tick> = InMemoryEventStore::new();
        let result = store.append_events(Uuid::new_v4(), 0, vec![]).await;
        assert!(matches!(result, Err(StoreError::EmptyAppend)));
    }

    #[tokio::test]
    async fn test_unknown_aggregate_has_empty_stream() {
        let store: InMemoryEventStore<Tick> = InMemoryEventStore::new();
        let id = Uuid::new_v4();
        assert!(store.load_events(id).await.unwrap().is_empty());
    }
}
