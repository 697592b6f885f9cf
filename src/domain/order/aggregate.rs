use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};

use crate::event_sourcing::Aggregate;
use super::value_objects::{Action, OrderItem, OrderState};
use super::events::*;
use super::commands::{ItemDraft, OrderCommand, OrderDraft, QuantityInput};
use super::errors::{ErrorMap, OrderError};

// ============================================================================
// Order Aggregate - Domain Logic
// ============================================================================
//
// State machine:
//
//   (create) -> pending
//   pending  -- modify   --> pending
//   pending  -- cancel   --> cancelled
//   pending  -- pay      --> paid
//   paid     -- prepare  --> prepared
//   prepared -- complete --> completed
//
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderAggregate {
    pub id: Uuid,
    pub version: i64,

    pub location: String,
    pub state: OrderState,
    /// Owned outright; replaced as a whole on modify.
    pub items: Vec<OrderItem>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl OrderAggregate {
    /// Decide the events for a brand new order. There is no prior state to
    /// check, so this does not go through `handle_command`.
    pub fn create(order_id: Uuid, draft: &OrderDraft) -> Result<Vec<OrderEvent>, OrderError> {
        let location = draft.location.clone().unwrap_or_default();
        let items = draft.items.as_deref().unwrap_or_default();

        validate(&location, items).map_err(OrderError::Validation)?;

        Ok(vec![OrderEvent::Created(OrderCreated {
            location,
            items: build_items(order_id, items)?,
            at: Utc::now(),
        })])
    }

    /// Transition guard.
    fn ensure_can(&self, action: Action) -> Result<(), OrderError> {
        if self.state != action.required_state() {
            return Err(OrderError::InvalidTransition {
                action,
                state: self.state,
            });
        }
        Ok(())
    }

    fn modify(&self, draft: &OrderDraft) -> Result<Vec<OrderEvent>, OrderError> {
        self.ensure_can(Action::Modify)?;

        let location = draft
            .location
            .clone()
            .unwrap_or_else(|| self.location.clone());

        let items = match &draft.items {
            Some(replacements) => {
                validate(&location, replacements).map_err(OrderError::Validation)?;
                build_items(self.id, replacements)?
            }
            None => {
                let current: Vec<ItemDraft> = self.items.iter().map(ItemDraft::from).collect();
                validate(&location, &current).map_err(OrderError::Validation)?;
                self.items.clone()
            }
        };

        Ok(vec![OrderEvent::Modified(OrderModified {
            location,
            items,
            at: Utc::now(),
        })])
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }
}

// ============================================================================
// Validation
// ============================================================================

/// Checks every constraint on a candidate order and reports all failures at
/// once.
pub fn validate(location: &str, items: &[ItemDraft]) -> Result<(), ErrorMap> {
    let mut errors = ErrorMap::new();

    if location.trim().is_empty() {
        errors.add("location", "can't be blank");
    }

    if items.is_empty() {
        errors.add("items", "can't be blank");
    }

    for item in items {
        if item.name.trim().is_empty() {
            errors.add("items.name", "can't be blank");
        }
        if item.size.trim().is_empty() {
            errors.add("items.size", "can't be blank");
        }
        match &item.quantity {
            QuantityInput::Missing => {
                errors.add("items.quantity", "can't be blank");
                errors.add("items.quantity", "is not a number");
            }
            QuantityInput::NotANumber(_) => errors.add("items.quantity", "is not a number"),
            QuantityInput::Value(q) if *q <= 0 => {
                errors.add("items.quantity", "must be greater than 0")
            }
            QuantityInput::Value(_) => {}
        }
    }

    errors.into_result()
}

/// Fresh items for an order. Client ids are ignored.
fn build_items(order_id: Uuid, drafts: &[ItemDraft]) -> Result<Vec<OrderItem>, OrderError> {
    drafts
        .iter()
        .map(|draft| {
            if let Some(client_id) = &draft.id {
                tracing::debug!(order_id = %order_id, client_id = %client_id, "Ignoring client item id");
            }

            let QuantityInput::Value(quantity) = draft.quantity else {
                // validate() has already rejected this draft
                let mut errors = ErrorMap::new();
                errors.add("items.quantity", "is not a number");
                return Err(OrderError::Validation(errors));
            };

            Ok(OrderItem {
                id: Uuid::new_v4(),
                order_id,
                name: draft.name.clone(),
                size: draft.size.clone(),
                quantity,
                options: draft.options.clone(),
            })
        })
        .collect()
}

// ============================================================================
// Aggregate Trait Implementation
// ============================================================================

impl Aggregate for OrderAggregate {
    type Event = OrderEvent;
    type Command = OrderCommand;
    type Error = OrderError;

    fn apply_first_event(aggregate_id: Uuid, event: &Self::Event) -> Result<Self, Self::Error> {
        match event {
            OrderEvent::Created(e) => Ok(Self {
                id: aggregate_id,
                version: 0,
                location: e.location.clone(),
                state: OrderState::Pending,
                items: e.items.clone(),
                created_at: e.at,
                updated_at: e.at,
            }),
            _ => Err(OrderError::NotInitialized),
        }
    }

    fn apply_event(&mut self, event: &Self::Event) -> Result<(), Self::Error> {
        match event {
            OrderEvent::Created(_) => return Err(OrderError::AlreadyCreated),
            OrderEvent::Modified(e) => {
                self.location = e.location.clone();
                self.items = e.items.clone();
                self.updated_at = e.at;
            }
            OrderEvent::Cancelled(e) => {
                self.state = OrderState::Cancelled;
                self.updated_at = e.at;
            }
            OrderEvent::Paid(e) => {
                self.state = OrderState::Paid;
                self.updated_at = e.at;
            }
            OrderEvent::Prepared(e) => {
                self.state = OrderState::Prepared;
                self.updated_at = e.at;
            }
            OrderEvent::Completed(e) => {
                self.state = OrderState::Completed;
                self.updated_at = e.at;
            }
        }
        Ok(())
    }

    fn handle_command(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            OrderCommand::Modify(draft) => self.modify(draft),

            OrderCommand::Cancel => {
                self.ensure_can(Action::Cancel)?;
                Ok(vec![OrderEvent::Cancelled(OrderTransitioned::now())])
            }

            OrderCommand::Pay => {
                self.ensure_can(Action::Pay)?;
                Ok(vec![OrderEvent::Paid(OrderTransitioned::now())])
            }

            OrderCommand::Prepare => {
                self.ensure_can(Action::Prepare)?;
                Ok(vec![OrderEvent::Prepared(OrderTransitioned::now())])
            }

            OrderCommand::PayAndAutoPrepare => {
                let mut events = self.handle_command(&OrderCommand::Pay)?;

                let mut paid = self.clone();
                for event in &events {
                    paid.apply_event(event)?;
                }
                events.extend(paid.handle_command(&OrderCommand::Prepare)?);

                Ok(events)
            }

            OrderCommand::Complete => {
                self.ensure_can(Action::Complete)?;
                Ok(vec![OrderEvent::Completed(OrderTransitioned::now())])
            }
        }
    }

    fn aggregate_id(&self) -> Uuid {
        self.id
    }

    fn version(&self) -> i64 {
        self.version
    }

    fn set_version(&mut self, version: i64) {
        self.version = version;
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
