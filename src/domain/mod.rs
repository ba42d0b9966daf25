// ============================================================================
// Domain Layer - Business Logic
// ============================================================================
//
// Aggregates own their invariants and raise domain events on mutation by
// recording into a composed EventLog. Each aggregate has its own
// subdirectory; the event definitions are shared in `events`.
//
// ============================================================================

pub mod events;
pub mod order;
pub mod telemetry;
