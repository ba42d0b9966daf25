use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::context::CorrelationContext;
use crate::dispatch::EventDispatcher;
use crate::domain::telemetry::{detect_drought, DroughtCondition, FieldMeasurement};
use crate::repository::Repository;

use super::ServiceError;

// ============================================================================
// Field Measurement Service
// ============================================================================
//
// Ingestion runs the full telemetry pipeline: validate the reading, persist
// it, then evaluate the field's series for an active drought. Any alert is
// recorded as a domain event on the measurement and dispatched with the
// rest of its buffer.
//
// ============================================================================

pub struct FieldMeasurementService<R: Repository<FieldMeasurement>> {
    repository: Arc<R>,
    dispatcher: Arc<EventDispatcher>,
    drought_threshold_pct: f64,
    drought_min_duration_hours: i64,
}

impl<R: Repository<FieldMeasurement>> FieldMeasurementService<R> {
    pub fn new(
        repository: Arc<R>,
        dispatcher: Arc<EventDispatcher>,
        drought_threshold_pct: f64,
        drought_min_duration_hours: i64,
    ) -> Self {
        Self {
            repository,
            dispatcher,
            drought_threshold_pct,
            drought_min_duration_hours,
        }
    }

    /// Ingest one sensor reading, returning the persisted measurement and
    /// the drought condition detection found, if any.
    #[tracing::instrument(skip(self, ctx), fields(correlation_id = %ctx.correlation_id))]
    pub async fn ingest(
        &self,
        field_id: Uuid,
        soil_moisture_pct: f64,
        air_temperature_c: f64,
        precipitation_mm: f64,
        collected_at: DateTime<Utc>,
        alert_recipient: String,
        ctx: &CorrelationContext,
    ) -> Result<(FieldMeasurement, Option<DroughtCondition>), ServiceError> {
        let mut measurement = FieldMeasurement::new(
            field_id,
            soil_moisture_pct,
            air_temperature_c,
            precipitation_mm,
            collected_at,
            alert_recipient,
        )?;

        let id = self.repository.add(measurement.clone()).await?;
        measurement.assign_id(id)?;
        measurement.mark_created()?;

        let condition = self.evaluate_field(field_id).await?;
        if let Some(ref condition) = condition {
            tracing::warn!(
                field_id = %field_id,
                started_at = %condition.started_at,
                duration_hours = condition.duration_hours(),
                "Drought condition detected"
            );
            measurement.request_drought_alert(condition, self.drought_threshold_pct)?;
        }

        let events = measurement.drain_events();
        self.repository.update(id, measurement.clone()).await?;

        tracing::info!(
            measurement_id = %id,
            field_id = %field_id,
            soil_moisture_pct,
            "Measurement ingested"
        );
        self.dispatcher.process(events, ctx).await?;

        Ok((measurement, condition))
    }

    pub async fn get_measurement(
        &self,
        id: Uuid,
    ) -> Result<Option<FieldMeasurement>, ServiceError> {
        Ok(self.repository.get_by_id(id).await?)
    }

    pub async fn list_measurements(
        &self,
        skip: usize,
        take: usize,
    ) -> Result<Vec<FieldMeasurement>, ServiceError> {
        Ok(self.repository.list(skip, take).await?)
    }

    pub async fn count_measurements(&self) -> Result<u64, ServiceError> {
        Ok(self.repository.count().await?)
    }

    /// Load the field's full series, time-ordered, and run detection.
    async fn evaluate_field(
        &self,
        field_id: Uuid,
    ) -> Result<Option<DroughtCondition>, ServiceError> {
        let mut series: Vec<FieldMeasurement> = self
            .repository
            .list(0, usize::MAX)
            .await?
            .into_iter()
            .filter(|m| m.field_id == field_id)
            .collect();
        series.sort_by_key(|m| m.collected_at);

        Ok(detect_drought(
            &series,
            self.drought_threshold_pct,
            self.drought_min_duration_hours,
        )?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Duration;
    use std::sync::Mutex;

    use crate::dispatch::{DispatchError, EventHandler, HandlerRegistry};
    use crate::domain::events::{DomainEvent, EventKind};
    use crate::repository::InMemoryRepository;

    struct Recorder {
        kind: EventKind,
        seen: Arc<Mutex<Vec<EventKind>>>,
    }

    #[async_trait]
    impl EventHandler for Recorder {
        fn kind(&self) -> EventKind {
            self.kind
        }

        fn name(&self) -> &'static str {
            "Recorder"
        }

        async fn handle(
            &self,
            event: &DomainEvent,
            _ctx: &CorrelationContext,
        ) -> Result<(), DispatchError> {
            self.seen.lock().unwrap().push(event.kind());
            Ok(())
        }
    }

    fn service() -> (
        FieldMeasurementService<InMemoryRepository<FieldMeasurement>>,
        Arc<Mutex<Vec<EventKind>>>,
    ) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut registry = HandlerRegistry::new();
        for kind in [EventKind::MeasurementCreated, EventKind::DroughtAlertRequired] {
            registry.register(Arc::new(Recorder {
                kind,
                seen: Arc::clone(&seen),
            }));
        }
        let service = FieldMeasurementService::new(
            Arc::new(InMemoryRepository::new()),
            Arc::new(EventDispatcher::new(registry)),
            30.0,
            1,
        );
        (service, seen)
    }

    #[tokio::test]
    async fn test_single_reading_raises_no_drought() {
        let (service, seen) = service();
        let ctx = CorrelationContext::new("test");

        let (measurement, condition) = service
            .ingest(
                Uuid::new_v4(),
                12.0,
                25.0,
                0.0,
                Utc::now() - Duration::hours(1),
                "agronomist@example.com".to_string(),
                &ctx,
            )
            .await
            .unwrap();

        assert!(measurement.id().is_some());
        assert!(condition.is_none());
        assert_eq!(*seen.lock().unwrap(), vec![EventKind::MeasurementCreated]);
    }

    #[tokio::test]
    async fn test_sustained_dry_series_raises_alert() {
        let (service, seen) = service();
        let ctx = CorrelationContext::new("test");
        let field_id = Uuid::new_v4();
        let now = Utc::now();

        service
            .ingest(
                field_id,
                18.0,
                25.0,
                0.0,
                now - Duration::hours(3),
                "agronomist@example.com".to_string(),
                &ctx,
            )
            .await
            .unwrap();

        let (_, condition) = service
            .ingest(
                field_id,
                15.0,
                26.0,
                0.0,
                now - Duration::hours(1),
                "agronomist@example.com".to_string(),
                &ctx,
            )
            .await
            .unwrap();

        let condition = condition.unwrap();
        assert_eq!(condition.duration, Duration::hours(2));
        assert_eq!(
            *seen.lock().unwrap(),
            vec![
                EventKind::MeasurementCreated,
                EventKind::MeasurementCreated,
                EventKind::DroughtAlertRequired,
            ]
        );
    }

    #[tokio::test]
    async fn test_wet_reading_between_dry_ones_blocks_alert() {
        let (service, _) = service();
        let ctx = CorrelationContext::new("test");
        let field_id = Uuid::new_v4();

        for (hours_ago, moisture) in [(3i64, 18.0), (2, 35.0), (1, 15.0)] {
            let (_, condition) = service
                .ingest(
                    field_id,
                    moisture,
                    25.0,
                    0.0,
                    Utc::now() - Duration::hours(hours_ago),
                    "agronomist@example.com".to_string(),
                    &ctx,
                )
                .await
                .unwrap();
            assert!(condition.is_none());
        }
    }

    #[tokio::test]
    async fn test_readings_from_other_fields_are_ignored() {
        let (service, _) = service();
        let ctx = CorrelationContext::new("test");
        let dry_field = Uuid::new_v4();
        let other_field = Uuid::new_v4();

        service
            .ingest(
                other_field,
                10.0,
                25.0,
                0.0,
                Utc::now() - Duration::hours(5),
                "agronomist@example.com".to_string(),
                &ctx,
            )
            .await
            .unwrap();

        // Only one reading exists for dry_field, so no spell can form.
        let (_, condition) = service
            .ingest(
                dry_field,
                11.0,
                25.0,
                0.0,
                Utc::now() - Duration::hours(1),
                "agronomist@example.com".to_string(),
                &ctx,
            )
            .await
            .unwrap();
        assert!(condition.is_none());
    }

    #[tokio::test]
    async fn test_invalid_reading_is_rejected_before_persistence() {
        let (service, _) = service();
        let ctx = CorrelationContext::new("test");

        let result = service
            .ingest(
                Uuid::new_v4(),
                140.0,
                25.0,
                0.0,
                Utc::now() - Duration::hours(1),
                "agronomist@example.com".to_string(),
                &ctx,
            )
            .await;

        assert!(matches!(result, Err(ServiceError::Measurement(_))));
        assert_eq!(service.count_measurements().await.unwrap(), 0);
    }
}
