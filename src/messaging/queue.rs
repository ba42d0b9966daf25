use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;
use serde::Serialize;

use crate::context::CorrelationContext;

use super::errors::PublishError;
use super::lazy::LazyConnection;
use super::notification::NotificationRequest;
use super::MessagePublisher;

// ============================================================================
// Queue Publisher (redis)
// ============================================================================
//
// Queue-oriented delivery: each message is RPUSHed as a JSON envelope onto
// the destination list, which redis creates on first push. Header properties
// ride inside the envelope. The multiplexed connection is established lazily
// on first publish and invalidated on any publish failure.
//
// ============================================================================

pub struct QueuePublisher {
    url: String,
    connection: LazyConnection<MultiplexedConnection>,
}

/// What actually lands on the queue: the notification plus transport-level
/// header properties and provenance.
#[derive(Serialize)]
struct QueueEnvelope<'a> {
    properties: HashMap<String, String>,
    published_by: &'a str,
    published_at: DateTime<Utc>,
    notification: &'a NotificationRequest,
}

impl QueuePublisher {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            connection: LazyConnection::new(),
        }
    }

    async fn connection(&self) -> Result<MultiplexedConnection, PublishError> {
        let url = self.url.clone();
        let shared = self
            .connection
            .get_or_connect(|| async move {
                let client =
                    redis::Client::open(url.as_str()).map_err(|e| PublishError::Transport {
                        destination: url.clone(),
                        message: format!("Invalid redis URL: {}", e),
                    })?;
                client
                    .get_multiplexed_async_connection()
                    .await
                    .map_err(|e| PublishError::Transport {
                        destination: url.clone(),
                        message: format!("Redis connect failed: {}", e),
                    })
            })
            .await?;
        // Clones share the underlying multiplexed pipeline.
        Ok((*shared).clone())
    }
}

#[async_trait]
impl MessagePublisher for QueuePublisher {
    async fn publish_message(
        &self,
        destination: &str,
        message: &NotificationRequest,
        properties: Option<HashMap<String, String>>,
        ctx: &CorrelationContext,
    ) -> Result<(), PublishError> {
        let envelope = QueueEnvelope {
            properties: properties.unwrap_or_default(),
            published_by: &ctx.service_name,
            published_at: Utc::now(),
            notification: message,
        };
        let payload = serde_json::to_string(&envelope).map_err(|e| PublishError::Transport {
            destination: destination.to_string(),
            message: format!("Payload serialization failed: {}", e),
        })?;

        let mut conn = self.connection().await?;
        match conn.rpush::<_, _, i64>(destination, payload).await {
            Ok(queue_len) => {
                tracing::info!(
                    queue = %destination,
                    queue_len,
                    correlation_id = %ctx.correlation_id,
                    alert_type = %message.metadata.alert_type,
                    "Published to queue"
                );
                Ok(())
            }
            Err(e) => {
                // Drop the connection so the next publish reconnects.
                self.connection.invalidate().await;
                tracing::error!(
                    queue = %destination,
                    correlation_id = %ctx.correlation_id,
                    error = %e,
                    "Queue publish failed, connection invalidated"
                );
                Err(PublishError::Transport {
                    destination: destination.to_string(),
                    message: format!("Redis push failed: {}", e),
                })
            }
        }
    }

    async fn close(&self) {
        self.connection.invalidate().await;
    }
}
