use chrono::{DateTime, Utc};

// ============================================================================
// Telemetry Validation Errors
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum MeasurementError {
    #[error("Soil moisture must be between 0 and 100 percent, got {0}")]
    MoistureOutOfRange(f64),

    #[error("Air temperature must be between -50 and 80 Celsius, got {0}")]
    TemperatureOutOfRange(f64),

    #[error("Precipitation cannot be negative, got {0}")]
    NegativePrecipitation(f64),

    #[error("Collection time {0} is in the future")]
    CollectedInFuture(DateTime<Utc>),

    #[error("Drought threshold must be between 0 and 100 percent, got {0}")]
    InvalidThreshold(f64),

    #[error("Minimum drought duration must be positive, got {0} hours")]
    InvalidMinDuration(i64),

    #[error("Measurement has no persisted identity yet")]
    IdentityNotAssigned,

    #[error("Measurement identity is already assigned")]
    IdentityAlreadyAssigned,

    #[error("Measurement creation event was already emitted")]
    AlreadyMarkedCreated,
}
