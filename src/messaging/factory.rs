use std::str::FromStr;
use std::sync::Arc;

use crate::config::Config;

use super::errors::PublishError;
use super::queue::QueuePublisher;
use super::topic::TopicPublisher;
use super::MessagePublisher;

// ============================================================================
// Publisher Factory
// ============================================================================
//
// Broker selection is a closed set: handlers ask for a kind, never a
// free-form string. Strings only appear at the configuration boundary,
// where parsing an unknown kind fails fast.
//
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrokerKind {
    Queue,
    Topic,
}

impl FromStr for BrokerKind {
    type Err = PublishError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "queue" => Ok(BrokerKind::Queue),
            "topic" => Ok(BrokerKind::Topic),
            other => Err(PublishError::UnsupportedKind(other.to_string())),
        }
    }
}

pub struct PublisherFactory {
    queue: Arc<dyn MessagePublisher>,
    topic: Arc<dyn MessagePublisher>,
}

impl PublisherFactory {
    pub fn new(queue: Arc<dyn MessagePublisher>, topic: Arc<dyn MessagePublisher>) -> Self {
        Self { queue, topic }
    }

    /// Wire the real broker publishers from configuration. Neither connects
    /// until its first publish.
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            Arc::new(QueuePublisher::new(config.redis_url.clone())),
            Arc::new(TopicPublisher::new(config.kafka_brokers.clone())),
        )
    }

    pub fn get_publisher(&self, kind: BrokerKind) -> Arc<dyn MessagePublisher> {
        match kind {
            BrokerKind::Queue => Arc::clone(&self.queue),
            BrokerKind::Topic => Arc::clone(&self.topic),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_kinds_parse() {
        assert_eq!(BrokerKind::from_str("queue").unwrap(), BrokerKind::Queue);
        assert_eq!(BrokerKind::from_str("Topic").unwrap(), BrokerKind::Topic);
    }

    #[test]
    fn test_unknown_kind_is_rejected() {
        let err = BrokerKind::from_str("carrier-pigeon").unwrap_err();
        assert!(matches!(err, PublishError::UnsupportedKind(k) if k == "carrier-pigeon"));
    }
}
