// ============================================================================
// Order Domain - Business Logic for the Order Aggregate
// ============================================================================
//
// Everything Order-specific lives here:
// - Value objects (OrderStatus, PaymentMethod, PaymentDetails, OrderGame)
// - Errors (OrderError enum)
// - Aggregate (Order with state machine + payment invariants)
//
// Domain events are shared across aggregates and live in domain::events.
//
// ============================================================================

pub mod aggregate;
pub mod errors;
pub mod value_objects;

pub use aggregate::*;
pub use errors::*;
pub use value_objects::*;
