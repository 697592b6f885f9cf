use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use super::value_objects::{Action, OrderState};

// ============================================================================
// Order Business Rule Errors
// ============================================================================

/// Key for errors that belong to the order as a whole.
pub const BASE: &str = "base";

/// Field name -> messages, rendered as `{"location": ["can't be blank"]}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ErrorMap(BTreeMap<String, Vec<String>>);

impl ErrorMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn base(message: impl Into<String>) -> Self {
        let mut map = Self::new();
        map.add(BASE, message);
        map
    }

    /// Record a message for `field`. Repeats of the same message are kept once.
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        let message = message.into();
        let messages = self.0.entry(field.to_string()).or_default();
        if !messages.contains(&message) {
            messages.push(message);
        }
    }

    #[cfg(test)]
    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// `Ok(())` when nothing was recorded.
    pub fn into_result(self) -> Result<(), ErrorMap> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ErrorMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, messages) in &self.0 {
            for message in messages {
                if !first {
                    f.write_str("; ")?;
                }
                first = false;
                if field == BASE {
                    write!(f, "{}", message)?;
                } else {
                    write!(f, "{} {}", field, message)?;
                }
            }
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum OrderError {
    #[error("Validation failed: {0}")]
    Validation(ErrorMap),

    #[error("can only {} order if in {} state", .action.verb(), .action.required_state())]
    InvalidTransition { action: Action, state: OrderState },

    #[error("Order already created")]
    AlreadyCreated,

    #[error("Aggregate not initialized")]
    NotInitialized,
}

impl OrderError {
    /// Client-facing form of the error.
    pub fn to_error_map(&self) -> ErrorMap {
        match self {
            OrderError::Validation(errors) => errors.clone(),
            other => ErrorMap::base(other.to_string()),
        }
    }
}
