use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use rdkafka::config::ClientConfig;
use rdkafka::message::{Header, OwnedHeaders};
use rdkafka::producer::{FutureProducer, FutureRecord};

use crate::context::CorrelationContext;

use super::errors::PublishError;
use super::lazy::LazyConnection;
use super::notification::NotificationRequest;
use super::MessagePublisher;

// ============================================================================
// Topic Publisher (Kafka)
// ============================================================================
//
// Topic-oriented delivery: the notification is sent as a JSON payload keyed
// by the subject entity id, with application properties attached as Kafka
// headers. The producer is created lazily on first publish and invalidated
// on any send failure.
//
// ============================================================================

pub struct TopicPublisher {
    brokers: String,
    producer: LazyConnection<FutureProducer>,
}

impl TopicPublisher {
    pub fn new(brokers: impl Into<String>) -> Self {
        Self {
            brokers: brokers.into(),
            producer: LazyConnection::new(),
        }
    }

    async fn producer(&self) -> Result<std::sync::Arc<FutureProducer>, PublishError> {
        let brokers = self.brokers.clone();
        self.producer
            .get_or_connect(|| async move {
                ClientConfig::new()
                    .set("bootstrap.servers", &brokers)
                    .set("message.timeout.ms", "5000")
                    .create()
                    .map_err(|e| PublishError::Transport {
                        destination: brokers.clone(),
                        message: format!("Kafka producer creation failed: {}", e),
                    })
            })
            .await
    }
}

#[async_trait]
impl MessagePublisher for TopicPublisher {
    async fn publish_message(
        &self,
        destination: &str,
        message: &NotificationRequest,
        properties: Option<HashMap<String, String>>,
        ctx: &CorrelationContext,
    ) -> Result<(), PublishError> {
        let payload = serde_json::to_string(message).map_err(|e| PublishError::Transport {
            destination: destination.to_string(),
            message: format!("Payload serialization failed: {}", e),
        })?;
        let key = message.metadata.subject_entity_id.to_string();

        let correlation_id = ctx.correlation_id.to_string();
        let mut headers = OwnedHeaders::new().insert(Header {
            key: "correlation-id",
            value: Some(&correlation_id),
        });
        for (name, value) in properties.unwrap_or_default() {
            headers = headers.insert(Header {
                key: &name,
                value: Some(&value),
            });
        }

        let producer = self.producer().await?;
        let record = FutureRecord::to(destination)
            .key(&key)
            .payload(&payload)
            .headers(headers);

        match producer
            .send(record, rdkafka::util::Timeout::After(Duration::from_secs(5)))
            .await
        {
            Ok(_) => {
                tracing::info!(
                    topic = %destination,
                    key = %key,
                    correlation_id = %ctx.correlation_id,
                    alert_type = %message.metadata.alert_type,
                    "Published to topic"
                );
                Ok(())
            }
            Err((e, _)) => {
                // Drop the producer so the next publish rebuilds it.
                self.producer.invalidate().await;
                tracing::error!(
                    topic = %destination,
                    correlation_id = %ctx.correlation_id,
                    error = %e,
                    "Topic publish failed, producer invalidated"
                );
                Err(PublishError::Transport {
                    destination: destination.to_string(),
                    message: format!("Kafka send failed: {}", e),
                })
            }
        }
    }

    async fn close(&self) {
        self.producer.invalidate().await;
    }
}
