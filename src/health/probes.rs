use std::time::{Duration, Instant};

use async_trait::async_trait;
use rdkafka::config::ClientConfig;
use rdkafka::consumer::{BaseConsumer, Consumer};

use super::{HealthProbe, HealthStatus, ProbeReport};

// ============================================================================
// Broker Probes
// ============================================================================

/// Pings the redis instance backing the queue publisher.
pub struct RedisProbe {
    url: String,
    critical: bool,
}

impl RedisProbe {
    pub fn new(url: impl Into<String>, critical: bool) -> Self {
        Self {
            url: url.into(),
            critical,
        }
    }

    async fn ping(&self) -> Result<Duration, String> {
        let started = Instant::now();
        let client = redis::Client::open(self.url.as_str()).map_err(|e| e.to_string())?;
        let mut conn = client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| e.to_string())?;
        redis::cmd("PING")
            .query_async::<String>(&mut conn)
            .await
            .map_err(|e| e.to_string())?;
        Ok(started.elapsed())
    }
}

#[async_trait]
impl HealthProbe for RedisProbe {
    fn name(&self) -> &str {
        "redis"
    }

    fn critical(&self) -> bool {
        self.critical
    }

    async fn check(&self) -> ProbeReport {
        match self.ping().await {
            Ok(latency) => ProbeReport {
                component: "redis".to_string(),
                status: HealthStatus::Healthy,
                latency: Some(latency),
                description: None,
            },
            Err(message) => ProbeReport {
                component: "redis".to_string(),
                status: HealthStatus::Unhealthy,
                latency: None,
                description: Some(message),
            },
        }
    }
}

/// Fetches cluster metadata from the Kafka brokers backing the topic
/// publisher. The librdkafka metadata call blocks, so it runs on the
/// blocking pool.
pub struct KafkaProbe {
    brokers: String,
    critical: bool,
}

impl KafkaProbe {
    pub fn new(brokers: impl Into<String>, critical: bool) -> Self {
        Self {
            brokers: brokers.into(),
            critical,
        }
    }
}

#[async_trait]
impl HealthProbe for KafkaProbe {
    fn name(&self) -> &str {
        "kafka"
    }

    fn critical(&self) -> bool {
        self.critical
    }

    async fn check(&self) -> ProbeReport {
        let brokers = self.brokers.clone();
        let result = tokio::task::spawn_blocking(move || {
            let started = Instant::now();
            let consumer: BaseConsumer = ClientConfig::new()
                .set("bootstrap.servers", &brokers)
                .create()
                .map_err(|e| e.to_string())?;
            consumer
                .fetch_metadata(None, Duration::from_secs(3))
                .map_err(|e| e.to_string())?;
            Ok::<Duration, String>(started.elapsed())
        })
        .await;

        match result {
            Ok(Ok(latency)) => ProbeReport {
                component: "kafka".to_string(),
                status: HealthStatus::Healthy,
                latency: Some(latency),
                description: None,
            },
            Ok(Err(message)) => ProbeReport {
                component: "kafka".to_string(),
                status: HealthStatus::Unhealthy,
                latency: None,
                description: Some(message),
            },
            Err(join_err) => ProbeReport {
                component: "kafka".to_string(),
                status: HealthStatus::Unknown,
                latency: None,
                description: Some(join_err.to_string()),
            },
        }
    }
}
