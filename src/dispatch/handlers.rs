use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::context::CorrelationContext;
use crate::domain::events::{DomainEvent, EventKind};
use crate::messaging::{
    BrokerKind, NotificationMetadata, NotificationRequest, PublisherFactory, Severity,
};

use super::{DispatchError, EventHandler};

// ============================================================================
// Event Handlers
// ============================================================================
//
// One handler per event variant. Each translates the event's fields into a
// NotificationRequest, obtains its publisher from the factory by a fixed
// broker kind, and publishes to its fixed destination. Publish failures are
// logged and re-thrown; deciding whether that is fatal belongs to the
// dispatcher's caller.
//
// ============================================================================

fn unexpected_event(handler: &'static str, event: &DomainEvent) -> DispatchError {
    DispatchError::Handler(format!(
        "{} received event of kind {:?}",
        handler,
        event.kind()
    ))
}

/// Drought alerts go through the durable queue so field staff notification
/// is never lost to a topic retention window.
pub struct DroughtAlertHandler {
    factory: Arc<PublisherFactory>,
    destination: String,
}

impl DroughtAlertHandler {
    pub fn new(factory: Arc<PublisherFactory>, destination: impl Into<String>) -> Self {
        Self {
            factory,
            destination: destination.into(),
        }
    }
}

#[async_trait]
impl EventHandler for DroughtAlertHandler {
    fn kind(&self) -> EventKind {
        EventKind::DroughtAlertRequired
    }

    fn name(&self) -> &'static str {
        "DroughtAlertHandler"
    }

    async fn handle(
        &self,
        event: &DomainEvent,
        ctx: &CorrelationContext,
    ) -> Result<(), DispatchError> {
        let e = match event {
            DomainEvent::DroughtAlertRequired(e) => e,
            other => return Err(unexpected_event(self.name(), other)),
        };

        let mut parameters = HashMap::new();
        parameters.insert("field_id".to_string(), e.field_id.to_string());
        parameters.insert("started_at".to_string(), e.drought_started_at.to_rfc3339());
        parameters.insert(
            "duration_hours".to_string(),
            e.drought_duration_hours.to_string(),
        );
        parameters.insert("threshold_pct".to_string(), e.threshold_pct.to_string());

        let request = NotificationRequest::from_template(
            vec![e.alert_recipient.clone()],
            "drought-alert",
            parameters,
            NotificationMetadata {
                correlation_id: ctx.correlation_id,
                alert_type: "DroughtAlert".to_string(),
                subject_entity_id: e.field_id,
                detected_at: e.occurred_at,
                severity: Severity::High,
            },
        );

        let mut properties = HashMap::new();
        properties.insert("alert-type".to_string(), "DroughtAlert".to_string());

        let publisher = self.factory.get_publisher(BrokerKind::Queue);
        if let Err(err) = publisher
            .publish_message(&self.destination, &request, Some(properties), ctx)
            .await
        {
            tracing::error!(
                field_id = %e.field_id,
                destination = %self.destination,
                error = %err,
                "Failed to publish drought alert"
            );
            return Err(err.into());
        }
        Ok(())
    }
}

/// Raw telemetry facts fan out on a topic for downstream analytics.
pub struct MeasurementCreatedHandler {
    factory: Arc<PublisherFactory>,
    destination: String,
}

impl MeasurementCreatedHandler {
    pub fn new(factory: Arc<PublisherFactory>, destination: impl Into<String>) -> Self {
        Self {
            factory,
            destination: destination.into(),
        }
    }
}

#[async_trait]
impl EventHandler for MeasurementCreatedHandler {
    fn kind(&self) -> EventKind {
        EventKind::MeasurementCreated
    }

    fn name(&self) -> &'static str {
        "MeasurementCreatedHandler"
    }

    async fn handle(
        &self,
        event: &DomainEvent,
        ctx: &CorrelationContext,
    ) -> Result<(), DispatchError> {
        let e = match event {
            DomainEvent::MeasurementCreated(e) => e,
            other => return Err(unexpected_event(self.name(), other)),
        };

        let request = NotificationRequest::direct(
            // Topic subscribers resolve their own recipients.
            Vec::new(),
            "Field measurement recorded",
            format!(
                "Field {}: soil moisture {:.1}%, air temperature {:.1}C at {}",
                e.field_id, e.soil_moisture_pct, e.air_temperature_c, e.collected_at
            ),
            NotificationMetadata {
                correlation_id: ctx.correlation_id,
                alert_type: "MeasurementCreated".to_string(),
                subject_entity_id: e.measurement_id,
                detected_at: e.occurred_at,
                severity: Severity::Low,
            },
        );

        let publisher = self.factory.get_publisher(BrokerKind::Topic);
        if let Err(err) = publisher
            .publish_message(&self.destination, &request, None, ctx)
            .await
        {
            tracing::error!(
                measurement_id = %e.measurement_id,
                destination = %self.destination,
                error = %err,
                "Failed to publish measurement notification"
            );
            return Err(err.into());
        }
        Ok(())
    }
}

pub struct OrderCreatedHandler {
    factory: Arc<PublisherFactory>,
    destination: String,
}

impl OrderCreatedHandler {
    pub fn new(factory: Arc<PublisherFactory>, destination: impl Into<String>) -> Self {
        Self {
            factory,
            destination: destination.into(),
        }
    }
}

#[async_trait]
impl EventHandler for OrderCreatedHandler {
    fn kind(&self) -> EventKind {
        EventKind::OrderCreated
    }

    fn name(&self) -> &'static str {
        "OrderCreatedHandler"
    }

    async fn handle(
        &self,
        event: &DomainEvent,
        ctx: &CorrelationContext,
    ) -> Result<(), DispatchError> {
        let e = match event {
            DomainEvent::OrderCreated(e) => e,
            other => return Err(unexpected_event(self.name(), other)),
        };

        let request = NotificationRequest::direct(
            vec![e.customer_email.clone()],
            "Order received",
            format!(
                "Your order {} for {:.2} has been received",
                e.order_id,
                e.total_cents as f64 / 100.0
            ),
            NotificationMetadata {
                correlation_id: ctx.correlation_id,
                alert_type: "OrderCreated".to_string(),
                subject_entity_id: e.order_id,
                detected_at: e.occurred_at,
                severity: Severity::Low,
            },
        );

        let publisher = self.factory.get_publisher(BrokerKind::Topic);
        if let Err(err) = publisher
            .publish_message(&self.destination, &request, None, ctx)
            .await
        {
            tracing::error!(
                order_id = %e.order_id,
                destination = %self.destination,
                error = %err,
                "Failed to publish order created notification"
            );
            return Err(err.into());
        }
        Ok(())
    }
}

pub struct OrderStatusChangedHandler {
    factory: Arc<PublisherFactory>,
    destination: String,
}

impl OrderStatusChangedHandler {
    pub fn new(factory: Arc<PublisherFactory>, destination: impl Into<String>) -> Self {
        Self {
            factory,
            destination: destination.into(),
        }
    }
}

#[async_trait]
impl EventHandler for OrderStatusChangedHandler {
    fn kind(&self) -> EventKind {
        EventKind::OrderStatusChanged
    }

    fn name(&self) -> &'static str {
        "OrderStatusChangedHandler"
    }

    async fn handle(
        &self,
        event: &DomainEvent,
        ctx: &CorrelationContext,
    ) -> Result<(), DispatchError> {
        let e = match event {
            DomainEvent::OrderStatusChanged(e) => e,
            other => return Err(unexpected_event(self.name(), other)),
        };

        let request = NotificationRequest::direct(
            vec![e.customer_email.clone()],
            "Order status updated",
            format!(
                "Order {} moved from {:?} to {:?}",
                e.order_id, e.old_status, e.new_status
            ),
            NotificationMetadata {
                correlation_id: ctx.correlation_id,
                alert_type: "OrderStatusChanged".to_string(),
                subject_entity_id: e.order_id,
                detected_at: e.occurred_at,
                severity: Severity::Medium,
            },
        );

        let publisher = self.factory.get_publisher(BrokerKind::Topic);
        if let Err(err) = publisher
            .publish_message(&self.destination, &request, None, ctx)
            .await
        {
            tracing::error!(
                order_id = %e.order_id,
                destination = %self.destination,
                error = %err,
                "Failed to publish order status notification"
            );
            return Err(err.into());
        }
        Ok(())
    }
}

pub struct PaymentMethodSetHandler {
    factory: Arc<PublisherFactory>,
    destination: String,
}

impl PaymentMethodSetHandler {
    pub fn new(factory: Arc<PublisherFactory>, destination: impl Into<String>) -> Self {
        Self {
            factory,
            destination: destination.into(),
        }
    }
}

#[async_trait]
impl EventHandler for PaymentMethodSetHandler {
    fn kind(&self) -> EventKind {
        EventKind::PaymentMethodSet
    }

    fn name(&self) -> &'static str {
        "PaymentMethodSetHandler"
    }

    async fn handle(
        &self,
        event: &DomainEvent,
        ctx: &CorrelationContext,
    ) -> Result<(), DispatchError> {
        let e = match event {
            DomainEvent::PaymentMethodSet(e) => e,
            other => return Err(unexpected_event(self.name(), other)),
        };

        let request = NotificationRequest::direct(
            vec![e.customer_email.clone()],
            "Payment method confirmed",
            format!(
                "Order {} will be paid by {:?}",
                e.order_id, e.payment_method
            ),
            NotificationMetadata {
                correlation_id: ctx.correlation_id,
                alert_type: "PaymentMethodSet".to_string(),
                subject_entity_id: e.order_id,
                detected_at: e.occurred_at,
                severity: Severity::Low,
            },
        );

        let publisher = self.factory.get_publisher(BrokerKind::Topic);
        if let Err(err) = publisher
            .publish_message(&self.destination, &request, None, ctx)
            .await
        {
            tracing::error!(
                order_id = %e.order_id,
                destination = %self.destination,
                error = %err,
                "Failed to publish payment method notification"
            );
            return Err(err.into());
        }
        Ok(())
    }
}
