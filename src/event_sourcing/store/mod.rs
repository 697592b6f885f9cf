// ============================================================================
// Event Sourcing Store - Persistence Layer
// ============================================================================
//
// `EventStore` is the only persistence seam. Backends:
// - memory:   process-local, used by tests and single-node demos
// - postgres: durable, one transaction per append
//
// ============================================================================

pub mod event_store;
pub mod memory;
pub mod postgres;

pub use event_store::{EventStore, StoreError};
pub use memory::InMemoryEventStore;
pub use postgres::PostgresEventStore;
