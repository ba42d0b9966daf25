// ============================================================================
// Application Configuration
// ============================================================================
//
// Everything is read from environment variables with local-dev defaults, so
// `cargo run` works against a local redis + kafka without any setup.
//
// ============================================================================

#[derive(Debug, Clone)]
pub struct Config {
    /// Redis connection URL for the queue-oriented publisher
    pub redis_url: String,
    /// Kafka bootstrap servers for the topic-oriented publisher
    pub kafka_brokers: String,
    /// Queue name drought alerts are pushed to
    pub drought_alert_queue: String,
    /// Topic order notifications are published to
    pub order_notification_topic: String,
    /// Topic raw telemetry notifications are published to
    pub telemetry_topic: String,
    /// Soil moisture percentage below which a reading counts as dry
    pub drought_threshold_pct: f64,
    /// Minimum unbroken dry spell, in hours, before an alert is raised
    pub drought_min_duration_hours: i64,
    /// Service name stamped into correlation contexts and outbound messages
    pub service_name: String,
}

impl Config {
    /// Load configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self {
            redis_url: std::env::var("REDIS_URL")
                .unwrap_or_else(|_| "redis://127.0.0.1:6379".to_string()),
            kafka_brokers: std::env::var("KAFKA_BROKERS")
                .unwrap_or_else(|_| "127.0.0.1:9092".to_string()),
            drought_alert_queue: std::env::var("DROUGHT_ALERT_QUEUE")
                .unwrap_or_else(|_| "drought-alerts".to_string()),
            order_notification_topic: std::env::var("ORDER_NOTIFICATION_TOPIC")
                .unwrap_or_else(|_| "order-notifications".to_string()),
            telemetry_topic: std::env::var("TELEMETRY_TOPIC")
                .unwrap_or_else(|_| "field-telemetry".to_string()),
            drought_threshold_pct: std::env::var("DROUGHT_THRESHOLD_PCT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(30.0),
            drought_min_duration_hours: std::env::var("DROUGHT_MIN_DURATION_HOURS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(24),
            service_name: std::env::var("SERVICE_NAME")
                .unwrap_or_else(|_| "agrolink".to_string()),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            redis_url: "redis://127.0.0.1:6379".to_string(),
            kafka_brokers: "127.0.0.1:9092".to_string(),
            drought_alert_queue: "drought-alerts".to_string(),
            order_notification_topic: "order-notifications".to_string(),
            telemetry_topic: "field-telemetry".to_string(),
            drought_threshold_pct: 30.0,
            drought_min_duration_hours: 24,
            service_name: "agrolink".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let config = Config::default();
        assert_eq!(config.redis_url, "redis://127.0.0.1:6379");
        assert_eq!(config.kafka_brokers, "127.0.0.1:9092");
        assert_eq!(config.drought_alert_queue, "drought-alerts");
        assert_eq!(config.drought_threshold_pct, 30.0);
        assert_eq!(config.drought_min_duration_hours, 24);
    }

    #[test]
    fn test_from_env_matches_defaults_when_unset() {
        // Env vars are not set in the test environment, so from_env should
        // produce the same values as Default.
        let config = Config::from_env();
        let default = Config::default();
        assert_eq!(config.order_notification_topic, default.order_notification_topic);
        assert_eq!(config.telemetry_topic, default.telemetry_topic);
        assert_eq!(config.service_name, default.service_name);
    }
}
