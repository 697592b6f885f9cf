use serde::Serialize;
use uuid::Uuid;

use crate::domain::order::{ItemOptions, OrderAggregate, OrderItem, OrderState};

// ============================================================================
// JSON views
// ============================================================================
//
//   {"id": ..., "location": "takeAway", "status": "pending",
//    "items": [{"id": ..., "name": "latte", "size": "small",
//               "quantity": 1, "milk": "whole"}]}
//
// Item options are flattened into the item object.
// ============================================================================

#[derive(Debug, Serialize)]
pub struct OrderView<'a> {
    pub id: Uuid,
    pub location: &'a str,
    pub status: OrderState,
    pub items: Vec<ItemView<'a>>,
}

#[derive(Debug, Serialize)]
pub struct ItemView<'a> {
    pub id: Uuid,
    pub name: &'a str,
    pub size: &'a str,
    pub quantity: i64,
    #[serde(flatten)]
    pub options: &'a ItemOptions,
}

impl<'a> From<&'a OrderAggregate> for OrderView<'a> {
    fn from(order: &'a OrderAggregate) -> Self {
        Self {
            id: order.id,
            location: &order.location,
            status: order.state,
            items: order.items.iter().map(ItemView::from).collect(),
        }
    }
}

impl<'a> From<&'a OrderItem> for ItemView<'a> {
    fn from(item: &'a OrderItem) -> Self {
        Self {
            id: item.id,
            name: &item.name,
            size: &item.size,
            quantity: item.quantity,
            options: &item.options,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;

    #[test]
    fn test_options_flattened_into_item() {
        let order_id = Uuid::new_v4();
        let item_id = Uuid::new_v4();
        let mut options = ItemOptions::new();
        options.insert("milk".to_string(), "whole".to_string());

        let order = OrderAggregate {
            id: order_id,
            version: 1,
            location: "takeAway".to_string(),
            state: OrderState::Pending,
            items: vec![OrderItem {
                id: item_id,
                order_id,
                name: "latte".to_string(),
                size: "small".to_string(),
                quantity: 1,
                options,
            }],
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let json = serde_json::to_value(OrderView::from(&order)).unwrap();
        assert_eq!(
            json,
            json!({
                "id": order_id,
                "location": "takeAway",
                "status": "pending",
                "items": [{
                    "id": item_id,
                    "name": "latte",
                    "size": "small",
                    "quantity": 1,
                    "milk": "whole"
                }]
            })
        );
    }
}
