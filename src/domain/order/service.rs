use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use uuid::Uuid;

use crate::event_sourcing::{Aggregate, EventEnvelope, EventStore, StoreError};
use crate::metrics::{outcome, Metrics};

use super::aggregate::OrderAggregate;
use super::commands::{OrderCommand, OrderDraft};
use super::errors::{ErrorMap, OrderError};
use super::events::OrderEvent;
use super::normalizer::{normalize, parse_payload, InvalidPayload};

// ============================================================================
// Order Service
// ============================================================================
//
// Orchestrates: payload → normalize → aggregate → events → event store
//
// Every mutation is one `append_events` call guarded by the version the
// aggregate was loaded at, so a guard check and its write cannot be split by
// a concurrent request on the same order.
//
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum OrderServiceError {
    #[error(transparent)]
    Domain(#[from] OrderError),

    #[error("Order not found: {0}")]
    NotFound(Uuid),

    #[error("Invalid payload: {0}")]
    InvalidPayload(#[from] InvalidPayload),

    #[error("Order {0} was changed by another request")]
    Conflict(Uuid),

    #[error("Storage failure: {0}")]
    Storage(StoreError),
}

impl OrderServiceError {
    pub fn outcome(&self) -> &'static str {
        match self {
            OrderServiceError::Domain(_) | OrderServiceError::InvalidPayload(_) => outcome::REJECTED,
            OrderServiceError::NotFound(_) => outcome::NOT_FOUND,
            OrderServiceError::Conflict(_) => outcome::CONFLICT,
            OrderServiceError::Storage(_) => outcome::ERROR,
        }
    }

    /// Field-keyed body for client-correctable failures.
    pub fn to_error_map(&self) -> ErrorMap {
        match self {
            OrderServiceError::Domain(e) => e.to_error_map(),
            OrderServiceError::NotFound(_) => ErrorMap::base("order not found"),
            OrderServiceError::InvalidPayload(e) => ErrorMap::base(e.to_string()),
            OrderServiceError::Conflict(_) => {
                ErrorMap::base("order was changed by another request, reload and try again")
            }
            OrderServiceError::Storage(_) => ErrorMap::base("internal storage error"),
        }
    }
}

impl From<StoreError> for OrderServiceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict { aggregate_id, .. } => OrderServiceError::Conflict(aggregate_id),
            other => OrderServiceError::Storage(other),
        }
    }
}

pub type OrderResult = Result<OrderAggregate, OrderServiceError>;

pub struct OrderService {
    event_store: Arc<dyn EventStore<OrderEvent>>,
    metrics: Arc<Metrics>,
}

impl OrderService {
    pub fn new(event_store: Arc<dyn EventStore<OrderEvent>>, metrics: Arc<Metrics>) -> Self {
        Self { event_store, metrics }
    }

    pub async fn get_order(&self, order_id: Uuid) -> OrderResult {
        self.load(order_id).await
    }

    /// `body` is the raw request body.
    pub async fn create_order(&self, body: &[u8]) -> OrderResult {
        self.observe("create", async move {
            let draft = normalize(&parse_payload(body)?)?;
            log_ignored_keys(None, &draft);

            let order_id = Uuid::new_v4();
            let correlation_id = Uuid::new_v4();

            let events = OrderAggregate::create(order_id, &draft)?;
            let envelopes = EventEnvelope::sequence(order_id, 0, events, correlation_id);

            self.event_store
                .append_events(order_id, 0, envelopes.clone())
                .await?;

            let order = OrderAggregate::load_from_events(&envelopes)?
                .ok_or(OrderError::NotInitialized)?;

            tracing::info!(
                order_id = %order_id,
                correlation_id = %correlation_id,
                location = %order.location,
                item_count = order.item_count(),
                "Order created"
            );

            Ok::<_, OrderServiceError>(order)
        })
        .await
    }

    pub async fn update_order(&self, order_id: Uuid, body: &[u8]) -> OrderResult {
        self.observe("modify", async move {
            // Unknown ids are reported before payload problems.
            let order = self.load(order_id).await?;
            let draft = normalize(&parse_payload(body)?)?;
            log_ignored_keys(Some(order_id), &draft);

            self.apply(order, OrderCommand::Modify(draft)).await
        })
        .await
    }

    pub async fn cancel_order(&self, order_id: Uuid) -> OrderResult {
        self.transition(order_id, OrderCommand::Cancel).await
    }

    /// Payment is a stub: a successful pay immediately prepares the order.
    pub async fn pay_order(&self, order_id: Uuid) -> OrderResult {
        self.transition(order_id, OrderCommand::PayAndAutoPrepare).await
    }

    pub async fn complete_order(&self, order_id: Uuid) -> OrderResult {
        self.transition(order_id, OrderCommand::Complete).await
    }

    async fn transition(&self, order_id: Uuid, command: OrderCommand) -> OrderResult {
        self.observe(command.name(), async move {
            let order = self.load(order_id).await?;
            self.apply(order, command).await
        })
        .await
    }

    async fn load(&self, order_id: Uuid) -> OrderResult {
        let events = self.event_store.load_events(order_id).await?;
        tracing::debug!(order_id = %order_id, event_count = events.len(), "Loaded order stream");

        OrderAggregate::load_from_events(&events)?.ok_or(OrderServiceError::NotFound(order_id))
    }

    /// Run `command` against `order` and persist the outcome as one append.
    async fn apply(&self, mut order: OrderAggregate, command: OrderCommand) -> OrderResult {
        let correlation_id = Uuid::new_v4();

        let events = match order.handle_command(&command) {
            Ok(events) => events,
            Err(e) => {
                tracing::warn!(
                    order_id = %order.id,
                    command = command.name(),
                    state = %order.state,
                    error = %e,
                    "Order command rejected"
                );
                return Err(e.into());
            }
        };

        let order_id = order.aggregate_id();
        let expected_version = order.version();
        let envelopes = EventEnvelope::sequence(order_id, expected_version, events, correlation_id);

        self.event_store
            .append_events(order_id, expected_version, envelopes.clone())
            .await?;
        order.apply_all(&envelopes)?;

        tracing::info!(
            order_id = %order_id,
            correlation_id = %correlation_id,
            command = command.name(),
            state = %order.state,
            version = order.version(),
            "Order command applied"
        );

        Ok(order)
    }

    async fn observe<F>(&self, command: &'static str, work: F) -> OrderResult
    where
        F: Future<Output = OrderResult>,
    {
        let started = Instant::now();
        let result = work.await;

        let label = match &result {
            Ok(_) => outcome::ACCEPTED,
            Err(e) => e.outcome(),
        };
        self.metrics
            .record_command(command, label, started.elapsed().as_secs_f64());

        if let Err(OrderServiceError::Storage(e)) = &result {
            tracing::error!(command, error = %e, "Order storage failure");
        }

        result
    }
}

fn log_ignored_keys(order_id: Option<Uuid>, draft: &OrderDraft) {
    if !draft.ignored_keys.is_empty() {
        tracing::debug!(
            order_id = ?order_id,
            ignored = ?draft.ignored_keys,
            "Dropped non-whitelisted order fields"
        );
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
