use std::marker::PhantomData;

use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::event_sourcing::core::{DomainEvent, EventEnvelope};
use super::event_store::{EventStore, StoreError};

// ============================================================================
// Postgres Event Store
// ============================================================================
//
// One row per event. The (aggregate_id, sequence_number) primary key is the
// optimistic lock: if two writers read the same version, the second insert
// hits a unique violation and its whole transaction rolls back.
//
// ============================================================================

const CREATE_EVENT_STORE: &str = r#"
    CREATE TABLE IF NOT EXISTS event_store (
        aggregate_id    UUID        NOT NULL,
        sequence_number BIGINT      NOT NULL,
        aggregate_type  TEXT        NOT NULL,
        event_id        UUID        NOT NULL UNIQUE,
        event_type      TEXT        NOT NULL,
        event_version   INT         NOT NULL,
        event_data      TEXT        NOT NULL,
        correlation_id  UUID        NOT NULL,
        recorded_at     TIMESTAMPTZ NOT NULL,
        PRIMARY KEY (aggregate_id, sequence_number)
    )
"#;

pub struct PostgresEventStore<E: DomainEvent> {
    pool: PgPool,
    aggregate_type_name: String,
    _phantom: PhantomData<E>,
}

impl<E: DomainEvent> PostgresEventStore<E> {
    pub fn new(pool: PgPool, aggregate_type_name: &str) -> Self {
        Self {
            pool,
            aggregate_type_name: aggregate_type_name.to_string(),
            _phantom: PhantomData,
        }
    }

    /// Create the event table if it does not exist yet.
    pub async fn ensure_schema(&self) -> anyhow::Result<()> {
        sqlx::query(CREATE_EVENT_STORE)
            .execute(&self.pool)
            .await
            .context("failed to create event_store table")?;
        Ok(())
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().as_deref() == Some("23505"),
        _ => false,
    }
}

#[async_trait]
impl<E: DomainEvent + 'static> EventStore<E> for PostgresEventStore<E> {
    async fn append_events(
        &self,
        aggregate_id: Uuid,
        expected_version: i64,
        events: Vec<EventEnvelope<E>>,
    ) -> Result<i64, StoreError> {
        if events.is_empty() {
            return Err(StoreError::EmptyAppend);
        }

        let mut tx = self.pool.begin().await?;

        let (current_version,): (i64,) = sqlx::query_as(
            "SELECT COALESCE(MAX(sequence_number), 0)::BIGINT FROM event_store WHERE aggregate_id = $1",
        )
        .bind(aggregate_id)
        .fetch_one(&mut *tx)
        .await?;

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

        let mut new_version = expected_version;

        for envelope in &events {
            let event_json = serde_json::to_string(&envelope.event_data)?;

            let inserted = sqlx::query(
                "INSERT INTO event_store (
                    aggregate_id, sequence_number, aggregate_type, event_id, event_type,
                    event_version, event_data, correlation_id, recorded_at
                ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
            )
            .bind(aggregate_id)
            .bind(envelope.sequence_number)
            .bind(&self.aggregate_type_name)
            .bind(envelope.event_id)
            .bind(&envelope.event_type)
            .bind(envelope.event_version)
            .bind(event_json)
            .bind(envelope.correlation_id)
            .bind(envelope.timestamp)
            .execute(&mut *tx)
            .await;

            match inserted {
                Ok(_) => new_version = envelope.sequence_number,
                Err(e) if is_unique_violation(&e) => {
                    return Err(StoreError::Conflict {
                        aggregate_id,
                        expected: expected_version,
                    });
                }
                Err(e) => return Err(e.into()),
            }
        }

        tx.commit().await?;

        tracing::info!(
            aggregate_id = %aggregate_id,
            aggregate_type = %self.aggregate_type_name,
            new_version,
            event_count = events.len(),
            "Appended events to event store"
        );

        Ok(new_version)
    }

    async fn load_events(&self, aggregate_id: Uuid) -> Result<Vec<EventEnvelope<E>>, StoreError> {
        let rows = sqlx::query(
            "SELECT sequence_number, event_id, event_type, event_version,
                    event_data, correlation_id, recorded_at
             FROM event_store
             WHERE aggregate_id = $1
             ORDER BY sequence_number ASC",
        )
        .bind(aggregate_id)
        .fetch_all(&self.pool)
        .await?;

        let mut events = Vec::with_capacity(rows.len());

        for row in rows {
            let event_data_json: String = row.try_get("event_data")?;
            let timestamp: DateTime<Utc> = row.try_get("recorded_at")?;

            events.push(EventEnvelope {
                event_id: row.try_get("event_id")?,
                aggregate_id,
                sequence_number: row.try_get("sequence_number")?,
                event_type: row.try_get("event_type")?,
                event_version: row.try_get("event_version")?,
                event_data: serde_json::from_str(&event_data_json)?,
                correlation_id: row.try_get("correlation_id")?,
                timestamp,
            });
        }

        tracing::debug!("Loaded {} events for aggregate {}", events.len(), aggregate_id);
        Ok(events)
    }
}
