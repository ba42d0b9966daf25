use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::context::CorrelationContext;
use crate::domain::events::{DomainEvent, EventKind};
use crate::messaging::PublishError;

// ============================================================================
// Domain Event Dispatcher
// ============================================================================
//
// Pure routing: the dispatcher knows only the capability "handles events of
// kind K", never event-specific semantics. Handlers are resolved into a
// typed registry at startup, so dispatch is a map lookup, not runtime type
// inspection. Per event, handlers run sequentially in registration order;
// the first failure aborts the remaining handlers and the rest of the batch.
//
// ============================================================================

pub mod handlers;

#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error(transparent)]
    Publish(#[from] PublishError),

    #[error("Handler failure: {0}")]
    Handler(String),
}

/// Capability: handle one specific DomainEvent variant.
#[async_trait]
pub trait EventHandler: Send + Sync {
    /// The event variant this handler subscribes to.
    fn kind(&self) -> EventKind;

    /// Handler name used in logs.
    fn name(&self) -> &'static str;

    async fn handle(
        &self,
        event: &DomainEvent,
        ctx: &CorrelationContext,
    ) -> Result<(), DispatchError>;
}

/// Startup-resolved mapping from event kind to its ordered handler list.
#[derive(Default)]
pub struct HandlerRegistry {
    handlers: HashMap<EventKind, Vec<Arc<dyn EventHandler>>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a handler for its declared kind. Registration order within a
    /// kind is invocation order.
    pub fn register(&mut self, handler: Arc<dyn EventHandler>) {
        self.handlers
            .entry(handler.kind())
            .or_default()
            .push(handler);
    }

    pub fn handlers_for(&self, kind: EventKind) -> &[Arc<dyn EventHandler>] {
        self.handlers.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }
}

pub struct EventDispatcher {
    registry: HandlerRegistry,
}

impl EventDispatcher {
    pub fn new(registry: HandlerRegistry) -> Self {
        Self { registry }
    }

    /// Route a drained event batch to its handlers, in original order,
    /// fail-fast on the first handler error.
    pub async fn process(
        &self,
        events: Vec<DomainEvent>,
        ctx: &CorrelationContext,
    ) -> Result<(), DispatchError> {
        if events.is_empty() {
            tracing::debug!(correlation_id = %ctx.correlation_id, "No domain events to dispatch");
            return Ok(());
        }

        for event in &events {
            let kind = event.kind();
            let handlers = self.registry.handlers_for(kind);

            if handlers.is_empty() {
                tracing::warn!(
                    event_kind = ?kind,
                    correlation_id = %ctx.correlation_id,
                    "No handler registered for event kind, skipping"
                );
                continue;
            }

            for handler in handlers {
                tracing::debug!(
                    event_kind = ?kind,
                    handler = handler.name(),
                    correlation_id = %ctx.correlation_id,
                    "Invoking event handler"
                );
                if let Err(err) = handler.handle(event, ctx).await {
                    tracing::error!(
                        event_kind = ?kind,
                        handler = handler.name(),
                        correlation_id = %ctx.correlation_id,
                        error = %err,
                        "Event handler failed, aborting batch"
                    );
                    return Err(err);
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::sync::Mutex;
    use uuid::Uuid;

    use crate::domain::events::{MeasurementCreated, OrderCreated};

    struct RecordingHandler {
        label: &'static str,
        kind: EventKind,
        calls: Arc<Mutex<Vec<&'static str>>>,
        fail: bool,
    }

    #[async_trait]
    impl EventHandler for RecordingHandler {
        fn kind(&self) -> EventKind {
            self.kind
        }

        fn name(&self) -> &'static str {
            self.label
        }

        async fn handle(
            &self,
            _event: &DomainEvent,
            _ctx: &CorrelationContext,
        ) -> Result<(), DispatchError> {
            self.calls.lock().unwrap().push(self.label);
            if self.fail {
                return Err(DispatchError::Handler(format!("{} exploded", self.label)));
            }
            Ok(())
        }
    }

    fn order_created() -> DomainEvent {
        DomainEvent::OrderCreated(OrderCreated {
            order_id: Uuid::new_v4(),
            customer_email: "buyer@example.com".to_string(),
            total_cents: 1000,
            occurred_at: Utc::now(),
        })
    }

    fn measurement_created() -> DomainEvent {
        DomainEvent::MeasurementCreated(MeasurementCreated {
            measurement_id: Uuid::new_v4(),
            field_id: Uuid::new_v4(),
            soil_moisture_pct: 40.0,
            air_temperature_c: 18.0,
            collected_at: Utc::now(),
            occurred_at: Utc::now(),
        })
    }

    fn handler(
        label: &'static str,
        kind: EventKind,
        calls: &Arc<Mutex<Vec<&'static str>>>,
        fail: bool,
    ) -> Arc<dyn EventHandler> {
        Arc::new(RecordingHandler {
            label,
            kind,
            calls: Arc::clone(calls),
            fail,
        })
    }

    #[tokio::test]
    async fn test_empty_batch_invokes_nothing() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let mut registry = HandlerRegistry::new();
        registry.register(handler("a", EventKind::OrderCreated, &calls, false));
        let dispatcher = EventDispatcher::new(registry);

        let ctx = CorrelationContext::new("test");
        dispatcher.process(vec![], &ctx).await.unwrap();
        assert!(calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_handlers_run_in_registration_order() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let mut registry = HandlerRegistry::new();
        registry.register(handler("first", EventKind::OrderCreated, &calls, false));
        registry.register(handler("second", EventKind::OrderCreated, &calls, false));
        registry.register(handler("third", EventKind::OrderCreated, &calls, false));
        let dispatcher = EventDispatcher::new(registry);

        let ctx = CorrelationContext::new("test");
        dispatcher.process(vec![order_created()], &ctx).await.unwrap();
        assert_eq!(*calls.lock().unwrap(), vec!["first", "second", "third"]);
    }

    #[tokio::test]
    async fn test_failure_aborts_remaining_handlers_and_events() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let mut registry = HandlerRegistry::new();
        registry.register(handler("first", EventKind::OrderCreated, &calls, false));
        registry.register(handler("second", EventKind::OrderCreated, &calls, true));
        registry.register(handler("third", EventKind::OrderCreated, &calls, false));
        registry.register(handler(
            "telemetry",
            EventKind::MeasurementCreated,
            &calls,
            false,
        ));
        let dispatcher = EventDispatcher::new(registry);

        let ctx = CorrelationContext::new("test");
        let result = dispatcher
            .process(vec![order_created(), measurement_created()], &ctx)
            .await;

        assert!(matches!(result, Err(DispatchError::Handler(_))));
        // Handler three never ran, nor did the second event's handler.
        assert_eq!(*calls.lock().unwrap(), vec!["first", "second"]);
    }

    #[tokio::test]
    async fn test_unhandled_kind_is_skipped_not_failed() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let mut registry = HandlerRegistry::new();
        registry.register(handler(
            "telemetry",
            EventKind::MeasurementCreated,
            &calls,
            false,
        ));
        let dispatcher = EventDispatcher::new(registry);

        let ctx = CorrelationContext::new("test");
        dispatcher
            .process(vec![order_created(), measurement_created()], &ctx)
            .await
            .unwrap();
        assert_eq!(*calls.lock().unwrap(), vec!["telemetry"]);
    }

    #[tokio::test]
    async fn test_events_dispatch_in_batch_order() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let mut registry = HandlerRegistry::new();
        registry.register(handler("orders", EventKind::OrderCreated, &calls, false));
        registry.register(handler(
            "telemetry",
            EventKind::MeasurementCreated,
            &calls,
            false,
        ));
        let dispatcher = EventDispatcher::new(registry);

        let ctx = CorrelationContext::new("test");
        dispatcher
            .process(vec![measurement_created(), order_created()], &ctx)
            .await
            .unwrap();
        assert_eq!(*calls.lock().unwrap(), vec!["telemetry", "orders"]);
    }
}
