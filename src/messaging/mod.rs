use std::collections::HashMap;

use async_trait::async_trait;

use crate::context::CorrelationContext;

// ============================================================================
// Messaging - Broker Publishers
// ============================================================================
//
// One publish contract over two broker styles: a queue-oriented publisher
// (redis lists) and a topic-oriented publisher (Kafka). Both connect lazily
// on first publish and self-heal after transport failures by invalidating
// the held client. Selection happens through the PublisherFactory.
//
// ============================================================================

pub mod errors;
pub mod factory;
pub mod lazy;
pub mod notification;
pub mod queue;
pub mod topic;

pub use errors::PublishError;
pub use factory::{BrokerKind, PublisherFactory};
pub use lazy::LazyConnection;
pub use notification::{
    NotificationContent, NotificationMetadata, NotificationRequest, Severity,
};
pub use queue::QueuePublisher;
pub use topic::TopicPublisher;

/// Common publish contract both broker variants implement.
#[async_trait]
pub trait MessagePublisher: Send + Sync {
    /// Serialize and deliver one notification to a named destination,
    /// attaching optional transport-level properties.
    async fn publish_message(
        &self,
        destination: &str,
        message: &NotificationRequest,
        properties: Option<HashMap<String, String>>,
        ctx: &CorrelationContext,
    ) -> Result<(), PublishError>;

    /// Release the held connection, if any.
    async fn close(&self);
}
