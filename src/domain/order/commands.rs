use super::value_objects::{ItemOptions, OrderItem};

// ============================================================================
// Order Commands - Represent user intent
// ============================================================================

/// Quantity as the client sent it. Validation decides what is acceptable.
#[derive(Debug, Clone, PartialEq)]
pub enum QuantityInput {
    Missing,
    NotANumber(String),
    Value(i64),
}

/// One item of a create/modify request, after normalization.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemDraft {
    /// Client-supplied id. Carried along but never reused: items are
    /// replaced wholesale.
    pub id: Option<String>,
    pub name: String,
    pub size: String,
    pub quantity: QuantityInput,
    pub options: ItemOptions,
}

impl From<&OrderItem> for ItemDraft {
    fn from(item: &OrderItem) -> Self {
        Self {
            id: Some(item.id.to_string()),
            name: item.name.clone(),
            size: item.size.clone(),
            quantity: QuantityInput::Value(item.quantity),
            options: item.options.clone(),
        }
    }
}

/// Normalized create/update payload. There is deliberately no `state`
/// field: state only moves through transition commands.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderDraft {
    pub location: Option<String>,
    /// `None` leaves items alone; `Some` replaces all of them.
    pub items: Option<Vec<ItemDraft>>,
    /// Top-level keys the normalizer dropped.
    pub ignored_keys: Vec<String>,
}

#[derive(Debug, Clone)]
pub enum OrderCommand {
    Modify(OrderDraft),
    Cancel,
    Pay,
    Prepare,
    /// Pay, then immediately prepare. Stands in for a real kitchen step.
    PayAndAutoPrepare,
    Complete,
}

impl OrderCommand {
    pub fn name(&self) -> &'static str {
        match self {
            OrderCommand::Modify(_) => "modify",
            OrderCommand::Cancel => "cancel",
            OrderCommand::Pay => "pay",
            OrderCommand::Prepare => "prepare",
            OrderCommand::PayAndAutoPrepare => "pay_and_auto_prepare",
            OrderCommand::Complete => "complete",
        }
    }
}
