use serde_json::{Map, Value};

use super::commands::{ItemDraft, OrderDraft, QuantityInput};
use super::value_objects::ItemOptions;

// ============================================================================
// Parameter Normalizer
// ============================================================================
//
// Turns a loosely shaped create/update body into an `OrderDraft`:
//
//   {"order": {"location": "takeAway",
//              "items": [{"name": "latte", "size": "small",
//                         "quantity": 1, "milk": "whole"}]}}
//
// - `order` wrapper is optional
// - whitelisted: location, and per item id/name/size/quantity
// - every other item key becomes an option, kept with its item
// - other top-level keys (including `state`) are dropped
//
// Pure: no I/O, no validation beyond shape.
//
// ============================================================================

const ORDER_WRAPPER: &str = "order";
const ITEM_FIELDS: [&str; 4] = ["id", "name", "size", "quantity"];

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{0}")]
pub struct InvalidPayload(pub String);

impl InvalidPayload {
    fn not_an_object() -> Self {
        InvalidPayload("payload must be a JSON object".to_string())
    }
}

/// Decode a request body. An empty body reads as `{}`: an update with
/// nothing to change.
pub fn parse_payload(body: &[u8]) -> Result<Value, InvalidPayload> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Object(Map::new()));
    }

    serde_json::from_slice(body).map_err(|e| {
        tracing::debug!(error = %e, "Unparsable request body");
        InvalidPayload::not_an_object()
    })
}

pub fn normalize(payload: &Value) -> Result<OrderDraft, InvalidPayload> {
    let root = payload
        .as_object()
        .ok_or_else(InvalidPayload::not_an_object)?;

    let (order, mut ignored_keys) = match root.get(ORDER_WRAPPER) {
        Some(Value::Object(inner)) => {
            let siblings: Vec<String> = root
                .keys()
                .filter(|key| key.as_str() != ORDER_WRAPPER)
                .cloned()
                .collect();
            (inner, siblings)
        }
        Some(_) => return Err(InvalidPayload("order must be a JSON object".to_string())),
        None => (root, Vec::new()),
    };

    let location = match order.get("location") {
        None => None,
        Some(value) => Some(scalar_text(value).ok_or_else(|| {
            InvalidPayload("location must be a string".to_string())
        })?),
    };

    let items = match order.get("items") {
        None => None,
        Some(Value::Array(raw_items)) => Some(
            raw_items
                .iter()
                .enumerate()
                .map(|(index, raw)| normalize_item(index, raw))
                .collect::<Result<Vec<_>, _>>()?,
        ),
        Some(_) => return Err(InvalidPayload("items must be an array".to_string())),
    };

    ignored_keys.extend(
        order
            .keys()
            .filter(|key| key.as_str() != "location" && key.as_str() != "items")
            .cloned(),
    );

    Ok(OrderDraft {
        location,
        items,
        ignored_keys,
    })
}

fn normalize_item(index: usize, raw: &Value) -> Result<ItemDraft, InvalidPayload> {
    let fields = raw
        .as_object()
        .ok_or_else(|| InvalidPayload(format!("items[{}] must be a JSON object", index)))?;

    let text_field = |name: &str| -> Result<Option<String>, InvalidPayload> {
        match fields.get(name) {
            None => Ok(None),
            Some(value) => scalar_text(value)
                .map(Some)
                .ok_or_else(|| InvalidPayload(format!("items[{}].{} must be a string", index, name))),
        }
    };

    Ok(ItemDraft {
        id: text_field("id")?.filter(|id| !id.is_empty()),
        name: text_field("name")?.unwrap_or_default(),
        size: text_field("size")?.unwrap_or_default(),
        quantity: quantity_input(fields.get("quantity")),
        options: collect_options(fields),
    })
}

/// Text form of a scalar. `null` reads as empty so that validation, not the
/// normalizer, reports it as blank.
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null => Some(String::new()),
        Value::Array(_) | Value::Object(_) => None,
    }
}

fn quantity_input(value: Option<&Value>) -> QuantityInput {
    match value {
        None | Some(Value::Null) => QuantityInput::Missing,
        Some(Value::Number(n)) => match n.as_i64() {
            Some(q) => QuantityInput::Value(q),
            None => QuantityInput::NotANumber(n.to_string()),
        },
        Some(Value::String(s)) if s.trim().is_empty() => QuantityInput::Missing,
        Some(Value::String(s)) => match s.trim().parse::<i64>() {
            Ok(q) => QuantityInput::Value(q),
            Err(_) => QuantityInput::NotANumber(s.clone()),
        },
        Some(other) => QuantityInput::NotANumber(other.to_string()),
    }
}

fn collect_options(fields: &Map<String, Value>) -> ItemOptions {
    fields
        .iter()
        .filter(|(key, _)| !ITEM_FIELDS.contains(&key.as_str()))
        .filter_map(|(key, value)| {
            let text = match value {
                Value::Null => return None,
                Value::String(s) => s.clone(),
                Value::Number(_) | Value::Bool(_) | Value::Array(_) | Value::Object(_) => {
                    value.to_string()
                }
            };
            Some((key.clone(), text))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extra_item_keys_become_options() {
        let draft = normalize(&json!({
            "location": "takeAway",
            "items": [{"quantity": 1, "size": "small", "name": "latte", "milk": "whole"}]
        }))
        .unwrap();

        assert_eq!(draft.location.as_deref(), Some("takeAway"));
        let items = draft.items.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].name, "latte");
        assert_eq!(items[0].size, "small");
        assert_eq!(items[0].quantity, QuantityInput::Value(1));
        assert_eq!(items[0].options.len(), 1);
        assert_eq!(items[0].options.get("milk").map(String::as_str), Some("whole"));
    }

    #[test]
    fn test_whitelisted_only_gives_empty_options() {
        let draft = normalize(&json!({
            "items": [
                {"id": 7, "quantity": 2, "size": "large", "name": "mocha"},
                {"quantity": 1, "size": "small", "name": "tea"}
            ]
        }))
        .unwrap();

        for item in draft.items.unwrap() {
            assert!(item.options.is_empty());
        }
    }

    #[test]
    fn test_options_stay_with_their_item() {
        let draft = normalize(&json!({
            "items": [
                {"name": "latte", "size": "small", "quantity": 1, "milk": "skim"},
                {"name": "cookie", "size": "one", "quantity": 3, "warm": true, "shots": 2}
            ]
        }))
        .unwrap();

        let items = draft.items.unwrap();
        assert_eq!(items[0].options.keys().collect::<Vec<_>>(), vec!["milk"]);
        assert_eq!(items[1].options.get("warm").map(String::as_str), Some("true"));
        assert_eq!(items[1].options.get("shots").map(String::as_str), Some("2"));
        assert!(!items[1].options.contains_key("milk"));
    }

    #[test]
    fn test_order_wrapper_is_unwrapped() {
        let draft = normalize(&json!({"order": {"location": "theInnerRoom"}})).unwrap();
        assert_eq!(draft.location.as_deref(), Some("theInnerRoom"));
        assert!(draft.items.is_none());
    }

    #[test]
    fn test_missing_items_means_no_item_changes() {
        let draft = normalize(&json!({"location": "bar"})).unwrap();
        assert!(draft.items.is_none());

        let draft = normalize(&json!({})).unwrap();
        assert!(draft.location.is_none());
        assert!(draft.items.is_none());
    }

    #[test]
    fn test_state_is_never_carried() {
        let draft = normalize(&json!({"location": "bar", "state": "completed"})).unwrap();
        assert_eq!(draft.ignored_keys, vec!["state".to_string()]);
    }

    #[test]
    fn test_keys_beside_order_wrapper_are_reported() {
        let draft = normalize(&json!({
            "order": {"location": "bar", "state": "paid"},
            "state": "completed",
            "utf8": "yes"
        }))
        .unwrap();

        assert_eq!(draft.location.as_deref(), Some("bar"));
        let mut ignored = draft.ignored_keys.clone();
        ignored.sort();
        assert_eq!(ignored, vec!["state", "state", "utf8"]);
    }

    #[test]
    fn test_parse_payload() {
        assert_eq!(parse_payload(b"").unwrap(), json!({}));
        assert_eq!(parse_payload(b"  \n").unwrap(), json!({}));
        assert_eq!(parse_payload(br#"{"location": "bar"}"#).unwrap(), json!({"location": "bar"}));
        assert_eq!(parse_payload(b"[1]").unwrap(), json!([1]));

        let err = parse_payload(b"{not json").unwrap_err();
        assert_eq!(err.0, "payload must be a JSON object");
    }

    #[test]
    fn test_non_object_payload_rejected() {
        assert!(normalize(&json!([1, 2, 3])).is_err());
        assert!(normalize(&json!("order")).is_err());
        assert!(normalize(&json!({"order": "latte"})).is_err());
    }

    #[test]
    fn test_malformed_items_rejected() {
        let err = normalize(&json!({"items": {"name": "latte"}})).unwrap_err();
        assert_eq!(err.0, "items must be an array");

        let err = normalize(&json!({"items": ["latte"]})).unwrap_err();
        assert_eq!(err.0, "items[0] must be a JSON object");

        assert!(normalize(&json!({"location": {"room": 1}})).is_err());
    }

    #[test]
    fn test_quantity_forms() {
        assert_eq!(quantity_input(Some(&json!(3))), QuantityInput::Value(3));
        assert_eq!(quantity_input(Some(&json!("4"))), QuantityInput::Value(4));
        assert_eq!(quantity_input(Some(&json!(-1))), QuantityInput::Value(-1));
        assert_eq!(quantity_input(None), QuantityInput::Missing);
        assert_eq!(quantity_input(Some(&json!(null))), QuantityInput::Missing);
        assert_eq!(quantity_input(Some(&json!(""))), QuantityInput::Missing);
        assert!(matches!(quantity_input(Some(&json!("lots"))), QuantityInput::NotANumber(_)));
        assert!(matches!(quantity_input(Some(&json!(1.5))), QuantityInput::NotANumber(_)));
    }

    #[test]
    fn test_null_option_dropped_nested_option_serialized() {
        let draft = normalize(&json!({
            "items": [{"name": "latte", "size": "small", "quantity": 1,
                       "syrup": null, "extras": ["foam", "cinnamon"]}]
        }))
        .unwrap();

        let options = &draft.items.unwrap()[0].options;
        assert!(!options.contains_key("syrup"));
        assert_eq!(
            options.get("extras").map(String::as_str),
            Some(r#"["foam","cinnamon"]"#)
        );
    }

    #[test]
    fn test_null_location_reads_as_blank() {
        let draft = normalize(&json!({"location": null})).unwrap();
        assert_eq!(draft.location.as_deref(), Some(""));
    }
}
