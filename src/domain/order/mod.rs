// ============================================================================
// Order Domain - Business Logic for Order Aggregate
// ============================================================================
//
// - Value objects (OrderItem, OrderState, Action)
// - Commands and normalized drafts
// - Events (OrderCreated, OrderModified, ...)
// - Errors (ErrorMap, OrderError)
// - Normalizer (raw JSON body -> OrderDraft)
// - Aggregate (state machine + validation)
// - Service (the entry point the HTTP layer calls)
//
// ============================================================================

pub mod value_objects;
pub mod events;
pub mod commands;
pub mod errors;
pub mod normalizer;
pub mod aggregate;
pub mod service;

pub use value_objects::*;
pub use events::*;
pub use errors::*;
pub use normalizer::*;
pub use aggregate::*;
pub use service::*;
