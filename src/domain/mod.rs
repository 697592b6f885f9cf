// ============================================================================
// Domain Layer - Business Logic
// ============================================================================
//
// Each aggregate has its own subdirectory. Nothing here touches HTTP or a
// particular database; persistence goes through `event_sourcing::EventStore`.
//
// ============================================================================

pub mod order;
