use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// Order Value Objects
// ============================================================================

/// Free-form per-item attributes ("milk" => "whole"). Any key is accepted;
/// values are kept as text.
pub type ItemOptions = BTreeMap<String, String>;

/// One line on an order ticket. Only ever lives inside its order's item list.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct OrderItem {
    pub id: Uuid,
    /// Owning order, for lookups only.
    pub order_id: Uuid,
    pub name: String,
    pub size: String,
    pub quantity: i64,
    #[serde(default)]
    pub options: ItemOptions,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderState {
    #[default]
    Pending,
    Cancelled,
    Paid,
    Prepared,
    Completed,
}

impl OrderState {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderState::Pending => "pending",
            OrderState::Cancelled => "cancelled",
            OrderState::Paid => "paid",
            OrderState::Prepared => "prepared",
            OrderState::Completed => "completed",
        }
    }
}

impl fmt::Display for OrderState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A guarded operation on an existing order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Modify,
    Cancel,
    Pay,
    Prepare,
    Complete,
}

impl Action {
    /// Wording used in guard messages: "can only <verb> order if ...".
    pub fn verb(&self) -> &'static str {
        match self {
            Action::Modify => "modify",
            Action::Cancel => "cancel",
            Action::Pay => "pay for",
            Action::Prepare => "prepare",
            Action::Complete => "complete",
        }
    }

    pub fn required_state(&self) -> OrderState {
        match self {
            Action::Modify | Action::Cancel | Action::Pay => OrderState::Pending,
            Action::Prepare => OrderState::Paid,
            Action::Complete => OrderState::Prepared,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_state_is_pending() {
        assert_eq!(OrderState::default(), OrderState::Pending);
    }

    #[test]
    fn test_state_serializes_lowercase() {
        let json = serde_json::to_string(&OrderState::Prepared).unwrap();
        assert_eq!(json, "\"prepared\"");

        let back: OrderState = serde_json::from_str("\"cancelled\"").unwrap();
        assert_eq!(back, OrderState::Cancelled);
    }

    #[test]
    fn test_action_source_states() {
        assert_eq!(Action::Modify.required_state(), OrderState::Pending);
        assert_eq!(Action::Cancel.required_state(), OrderState::Pending);
        assert_eq!(Action::Pay.required_state(), OrderState::Pending);
        assert_eq!(Action::Prepare.required_state(), OrderState::Paid);
        assert_eq!(Action::Complete.required_state(), OrderState::Prepared);
    }

    #[test]
    fn test_item_without_options_deserializes_empty() {
        let json = serde_json::json!({
            "id": Uuid::new_v4(),
            "order_id": Uuid::new_v4(),
            "name": "latte",
            "size": "small",
            "quantity": 1
        });

        let item: OrderItem = serde_json::from_value(json).unwrap();
        assert!(item.options.is_empty());
    }
}
