use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};

use crate::event_sourcing::DomainEvent;
use super::value_objects::OrderItem;

// ============================================================================
// Order Events - Domain Events for Order Aggregate
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum OrderEvent {
    Created(OrderCreated),
    Modified(OrderModified),
    Cancelled(OrderTransitioned),
    Paid(OrderTransitioned),
    Prepared(OrderTransitioned),
    Completed(OrderTransitioned),
}

impl DomainEvent for OrderEvent {
    fn event_type(&self) -> &'static str {
        match self {
            OrderEvent::Created(_) => "OrderCreated",
            OrderEvent::Modified(_) => "OrderModified",
            OrderEvent::Cancelled(_) => "OrderCancelled",
            OrderEvent::Paid(_) => "OrderPaid",
            OrderEvent::Prepared(_) => "OrderPrepared",
            OrderEvent::Completed(_) => "OrderCompleted",
        }
    }
}

/// Order Created - always lands in `pending`
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct OrderCreated {
    pub location: String,
    pub items: Vec<OrderItem>,
    pub at: DateTime<Utc>,
}

/// Order Modified - full snapshot of location and the replacement item list
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct OrderModified {
    pub location: String,
    pub items: Vec<OrderItem>,
    pub at: DateTime<Utc>,
}

/// A pure state change
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct OrderTransitioned {
    pub at: DateTime<Utc>,
}

impl OrderTransitioned {
    pub fn now() -> Self {
        Self { at: Utc::now() }
    }
}
