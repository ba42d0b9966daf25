// ============================================================================
// Telemetry Domain - Field Measurements & Drought Detection
// ============================================================================
//
// - Value object / algorithm (DroughtCondition, detect_drought)
// - Errors (MeasurementError enum)
// - Aggregate (FieldMeasurement, immutable after ingestion)
//
// ============================================================================

pub mod drought;
pub mod errors;
pub mod measurement;

pub use drought::*;
pub use errors::*;
pub use measurement::*;
