use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use uuid::Uuid;

mod config;
mod context;
mod dispatch;
mod domain;
mod health;
mod messaging;
mod repository;
mod services;

use config::Config;
use context::CorrelationContext;
use dispatch::handlers::{
    DroughtAlertHandler, MeasurementCreatedHandler, OrderCreatedHandler,
    OrderStatusChangedHandler, PaymentMethodSetHandler,
};
use dispatch::{EventDispatcher, HandlerRegistry};
use domain::order::{Order, OrderGame, OrderStatus, PaymentMethod};
use domain::telemetry::FieldMeasurement;
use health::{HealthService, KafkaProbe, RedisProbe};
use messaging::PublisherFactory;
use repository::InMemoryRepository;
use services::{FieldMeasurementService, OrderService};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Structured logging with environment-based filtering; override with
    // RUST_LOG, e.g. RUST_LOG=debug cargo run.
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true))
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,agrolink=debug")),
        )
        .init();

    let config = Config::from_env();
    tracing::info!(
        redis = %config.redis_url,
        kafka = %config.kafka_brokers,
        "Starting agrolink"
    );

    // === 1. Publishers & factory (connections are lazy, nothing dials yet) ===
    let factory = Arc::new(PublisherFactory::from_config(&config));

    // === 2. Handler registry, resolved once at startup ===
    let mut registry = HandlerRegistry::new();
    registry.register(Arc::new(DroughtAlertHandler::new(
        Arc::clone(&factory),
        config.drought_alert_queue.clone(),
    )));
    registry.register(Arc::new(MeasurementCreatedHandler::new(
        Arc::clone(&factory),
        config.telemetry_topic.clone(),
    )));
    registry.register(Arc::new(OrderCreatedHandler::new(
        Arc::clone(&factory),
        config.order_notification_topic.clone(),
    )));
    registry.register(Arc::new(OrderStatusChangedHandler::new(
        Arc::clone(&factory),
        config.order_notification_topic.clone(),
    )));
    registry.register(Arc::new(PaymentMethodSetHandler::new(
        Arc::clone(&factory),
        config.order_notification_topic.clone(),
    )));
    let dispatcher = Arc::new(EventDispatcher::new(registry));

    // === 3. Application services over the persistence boundary ===
    let order_repository = Arc::new(InMemoryRepository::<Order>::new());
    let order_service = OrderService::new(Arc::clone(&order_repository), Arc::clone(&dispatcher));

    let measurement_repository = Arc::new(InMemoryRepository::<FieldMeasurement>::new());
    let measurement_service = FieldMeasurementService::new(
        Arc::clone(&measurement_repository),
        Arc::clone(&dispatcher),
        config.drought_threshold_pct,
        config.drought_min_duration_hours,
    );

    // === 4. Broker health ===
    let mut health = HealthService::new();
    health.register(Arc::new(RedisProbe::new(config.redis_url.clone(), true)));
    health.register(Arc::new(KafkaProbe::new(config.kafka_brokers.clone(), false)));
    let system_health = health.check_all().await;
    tracing::info!(
        overall = ?system_health.overall,
        probes = system_health.reports.len(),
        checked_at = %system_health.checked_at,
        "Broker health checked"
    );

    // === 5. One order lifecycle ===
    let ctx = CorrelationContext::new(config.service_name.clone());
    let order = order_service
        .create_order(
            "grower@example.com".to_string(),
            PaymentMethod::Cash,
            None,
            vec![OrderGame {
                game_id: Uuid::new_v4(),
                title: "Harvest Tycoon".to_string(),
                unit_price_cents: 2999,
                quantity: 1,
            }],
            &ctx,
        )
        .await?;
    let order_id = order.id().expect("persisted order has an id");

    order_service
        .update_status(order_id, OrderStatus::Paid, &ctx.child())
        .await?;
    order_service
        .update_status(order_id, OrderStatus::Processing, &ctx.child())
        .await?;

    // === 6. Telemetry ingestion ending in a drought alert ===
    let field_id = Uuid::new_v4();
    let ingest_ctx = CorrelationContext::new(config.service_name.clone());
    measurement_service
        .ingest(
            field_id,
            18.0,
            24.5,
            0.0,
            Utc::now() - Duration::hours(config.drought_min_duration_hours + 2),
            "agronomist@example.com".to_string(),
            &ingest_ctx,
        )
        .await?;
    let (_, condition) = measurement_service
        .ingest(
            field_id,
            15.0,
            26.0,
            0.0,
            Utc::now() - Duration::minutes(10),
            "agronomist@example.com".to_string(),
            &ingest_ctx.child(),
        )
        .await?;

    match condition {
        Some(condition) => tracing::info!(
            field_id = %field_id,
            started_at = %condition.started_at,
            duration_hours = condition.duration_hours(),
            "Drought alert published"
        ),
        None => tracing::info!(field_id = %field_id, "No drought condition detected"),
    }

    tracing::info!(
        orders = order_service.count_orders().await?,
        measurements = measurement_service.count_measurements().await?,
        "Done"
    );
    Ok(())
}
