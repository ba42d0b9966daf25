use crate::dispatch::DispatchError;
use crate::domain::order::OrderError;
use crate::domain::telemetry::MeasurementError;
use crate::repository::RepositoryError;

// ============================================================================
// Application Services
// ============================================================================
//
// Services orchestrate one inbound operation end to end: mutate the
// aggregate, persist it, then dispatch the events the mutation buffered.
// Persistence always commits before dispatch; there is no transaction
// spanning both, so a crash in between can persist state whose events were
// never published (at-most-once delivery).
//
// ============================================================================

pub mod orders;
pub mod telemetry;

pub use orders::OrderService;
pub use telemetry::FieldMeasurementService;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Order(#[from] OrderError),

    #[error(transparent)]
    Measurement(#[from] MeasurementError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error(transparent)]
    Dispatch(#[from] DispatchError),
}
