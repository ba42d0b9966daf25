use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::events::{DomainEvent, DroughtAlertRequired, EventLog, MeasurementCreated};

use super::drought::DroughtCondition;
use super::errors::MeasurementError;

// ============================================================================
// Field Measurement
// ============================================================================
//
// One sensor reading from a field. Validated once at ingestion and immutable
// afterwards, apart from identity assignment and event recording.
//
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldMeasurement {
    id: Option<Uuid>,
    pub field_id: Uuid,
    pub soil_moisture_pct: f64,
    pub air_temperature_c: f64,
    pub precipitation_mm: f64,
    pub collected_at: DateTime<Utc>,
    pub received_at: DateTime<Utc>,
    pub alert_recipient: String,
    created_event_emitted: bool,
    #[serde(skip)]
    events: EventLog,
}

impl FieldMeasurement {
    pub fn new(
        field_id: Uuid,
        soil_moisture_pct: f64,
        air_temperature_c: f64,
        precipitation_mm: f64,
        collected_at: DateTime<Utc>,
        alert_recipient: impl Into<String>,
    ) -> Result<Self, MeasurementError> {
        if !(0.0..=100.0).contains(&soil_moisture_pct) {
            return Err(MeasurementError::MoistureOutOfRange(soil_moisture_pct));
        }
        if !(-50.0..=80.0).contains(&air_temperature_c) {
            return Err(MeasurementError::TemperatureOutOfRange(air_temperature_c));
        }
        if precipitation_mm < 0.0 {
            return Err(MeasurementError::NegativePrecipitation(precipitation_mm));
        }
        let now = Utc::now();
        if collected_at > now {
            return Err(MeasurementError::CollectedInFuture(collected_at));
        }

        Ok(Self {
            id: None,
            field_id,
            soil_moisture_pct,
            air_temperature_c,
            precipitation_mm,
            collected_at,
            received_at: now,
            alert_recipient: alert_recipient.into(),
            created_event_emitted: false,
            events: EventLog::new(),
        })
    }

    pub fn id(&self) -> Option<Uuid> {
        self.id
    }

    pub fn pending_events(&self) -> &[DomainEvent] {
        self.events.pending()
    }

    pub fn drain_events(&mut self) -> Vec<DomainEvent> {
        self.events.drain()
    }

    pub fn assign_id(&mut self, id: Uuid) -> Result<(), MeasurementError> {
        if self.id.is_some() {
            return Err(MeasurementError::IdentityAlreadyAssigned);
        }
        self.id = Some(id);
        Ok(())
    }

    /// Emit MeasurementCreated once the persisted identity is known.
    pub fn mark_created(&mut self) -> Result<(), MeasurementError> {
        let id = self.id.ok_or(MeasurementError::IdentityNotAssigned)?;
        if self.created_event_emitted {
            return Err(MeasurementError::AlreadyMarkedCreated);
        }
        self.created_event_emitted = true;

        self.events
            .record(DomainEvent::MeasurementCreated(MeasurementCreated {
                measurement_id: id,
                field_id: self.field_id,
                soil_moisture_pct: self.soil_moisture_pct,
                air_temperature_c: self.air_temperature_c,
                collected_at: self.collected_at,
                occurred_at: Utc::now(),
            }));
        Ok(())
    }

    /// Record that drought detection flagged the spell ending at this
    /// reading, so an alert gets published downstream.
    pub fn request_drought_alert(
        &mut self,
        condition: &DroughtCondition,
        threshold_pct: f64,
    ) -> Result<(), MeasurementError> {
        let id = self.id.ok_or(MeasurementError::IdentityNotAssigned)?;

        self.events
            .record(DomainEvent::DroughtAlertRequired(DroughtAlertRequired {
                measurement_id: id,
                field_id: self.field_id,
                alert_recipient: self.alert_recipient.clone(),
                drought_started_at: condition.started_at,
                drought_duration_hours: condition.duration_hours(),
                threshold_pct,
                occurred_at: Utc::now(),
            }));
        Ok(())
    }
}
