use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::order::{OrderStatus, PaymentMethod};

// ============================================================================
// Domain Events
// ============================================================================
//
// Immutable facts raised by aggregates as side effects of state mutation.
// They sit in the owning aggregate's EventLog until the application service
// drains and dispatches them, after which they are owned by the handler
// invocation and never persisted.
//
// ============================================================================

/// Union of every domain event the system can raise.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum DomainEvent {
    OrderCreated(OrderCreated),
    OrderStatusChanged(OrderStatusChanged),
    PaymentMethodSet(PaymentMethodSet),
    MeasurementCreated(MeasurementCreated),
    DroughtAlertRequired(DroughtAlertRequired),
}

/// Fieldless tag mirroring the `DomainEvent` variants. Handler registration
/// keys on this, so routing never inspects payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    OrderCreated,
    OrderStatusChanged,
    PaymentMethodSet,
    MeasurementCreated,
    DroughtAlertRequired,
}

impl DomainEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            DomainEvent::OrderCreated(_) => EventKind::OrderCreated,
            DomainEvent::OrderStatusChanged(_) => EventKind::OrderStatusChanged,
            DomainEvent::PaymentMethodSet(_) => EventKind::PaymentMethodSet,
            DomainEvent::MeasurementCreated(_) => EventKind::MeasurementCreated,
            DomainEvent::DroughtAlertRequired(_) => EventKind::DroughtAlertRequired,
        }
    }

    /// UTC instant at which the triggering mutation occurred.
    pub fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            DomainEvent::OrderCreated(e) => e.occurred_at,
            DomainEvent::OrderStatusChanged(e) => e.occurred_at,
            DomainEvent::PaymentMethodSet(e) => e.occurred_at,
            DomainEvent::MeasurementCreated(e) => e.occurred_at,
            DomainEvent::DroughtAlertRequired(e) => e.occurred_at,
        }
    }

    /// Id of the aggregate the event belongs to.
    pub fn subject_entity_id(&self) -> Uuid {
        match self {
            DomainEvent::OrderCreated(e) => e.order_id,
            DomainEvent::OrderStatusChanged(e) => e.order_id,
            DomainEvent::PaymentMethodSet(e) => e.order_id,
            DomainEvent::MeasurementCreated(e) => e.measurement_id,
            DomainEvent::DroughtAlertRequired(e) => e.measurement_id,
        }
    }
}

// ============================================================================
// Event Payloads
// ============================================================================

/// First persistence of a new order completed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderCreated {
    pub order_id: Uuid,
    pub customer_email: String,
    pub total_cents: i64,
    pub occurred_at: DateTime<Utc>,
}

/// Order moved between lifecycle states.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderStatusChanged {
    pub order_id: Uuid,
    pub old_status: OrderStatus,
    pub new_status: OrderStatus,
    pub customer_email: String,
    pub occurred_at: DateTime<Utc>,
}

/// Payment method chosen for a freshly persisted order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentMethodSet {
    pub order_id: Uuid,
    pub payment_method: PaymentMethod,
    pub customer_email: String,
    pub occurred_at: DateTime<Utc>,
}

/// A field measurement was ingested and persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeasurementCreated {
    pub measurement_id: Uuid,
    pub field_id: Uuid,
    pub soil_moisture_pct: f64,
    pub air_temperature_c: f64,
    pub collected_at: DateTime<Utc>,
    pub occurred_at: DateTime<Utc>,
}

/// Drought detection found a qualifying dry spell ending at this measurement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DroughtAlertRequired {
    pub measurement_id: Uuid,
    pub field_id: Uuid,
    pub alert_recipient: String,
    pub drought_started_at: DateTime<Utc>,
    pub drought_duration_hours: i64,
    pub threshold_pct: f64,
    pub occurred_at: DateTime<Utc>,
}

// ============================================================================
// Event Log
// ============================================================================

/// Ordered buffer of pending domain events, composed as a field by each
/// aggregate. Append-only until drained; insertion order is dispatch order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventLog {
    pending: Vec<DomainEvent>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, event: DomainEvent) {
        self.pending.push(event);
    }

    pub fn pending(&self) -> &[DomainEvent] {
        &self.pending
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Hand the buffered events over for dispatch, leaving the log empty.
    pub fn drain(&mut self) -> Vec<DomainEvent> {
        std::mem::take(&mut self.pending)
    }
}
