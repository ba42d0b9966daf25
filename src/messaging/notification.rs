use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// Outbound Notification Schema
// ============================================================================
//
// The wire contract every handler publishes. Either free-text subject/body
// or a template id with flat string parameters, plus routing metadata.
// Constructed fresh per handler invocation; never persisted by the core.
//
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum NotificationContent {
    Direct {
        subject: String,
        body: String,
    },
    Template {
        template_id: String,
        parameters: HashMap<String, String>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationMetadata {
    pub correlation_id: Uuid,
    pub alert_type: String,
    pub subject_entity_id: Uuid,
    pub detected_at: DateTime<Utc>,
    pub severity: Severity,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationRequest {
    pub recipients: Vec<String>,
    pub content: NotificationContent,
    pub metadata: NotificationMetadata,
}

impl NotificationRequest {
    pub fn direct(
        recipients: Vec<String>,
        subject: impl Into<String>,
        body: impl Into<String>,
        metadata: NotificationMetadata,
    ) -> Self {
        Self {
            recipients,
            content: NotificationContent::Direct {
                subject: subject.into(),
                body: body.into(),
            },
            metadata,
        }
    }

    pub fn from_template(
        recipients: Vec<String>,
        template_id: impl Into<String>,
        parameters: HashMap<String, String>,
        metadata: NotificationMetadata,
    ) -> Self {
        Self {
            recipients,
            content: NotificationContent::Template {
                template_id: template_id.into(),
                parameters,
            },
            metadata,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_notification_json_shape() {
        let mut parameters = HashMap::new();
        parameters.insert("field_id".to_string(), "abc".to_string());

        let request = NotificationRequest::from_template(
            vec!["agronomist@example.com".to_string()],
            "drought-alert",
            parameters,
            NotificationMetadata {
                correlation_id: Uuid::new_v4(),
                alert_type: "DroughtAlert".to_string(),
                subject_entity_id: Uuid::new_v4(),
                detected_at: Utc::now(),
                severity: Severity::High,
            },
        );

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["content"]["type"], "Template");
        assert_eq!(json["content"]["data"]["template_id"], "drought-alert");
        assert_eq!(json["metadata"]["severity"], "High");
        assert_eq!(json["metadata"]["alert_type"], "DroughtAlert");
        assert!(json["metadata"]["correlation_id"].is_string());
    }

    #[test]
    fn test_direct_notification_round_trip() {
        let request = NotificationRequest::direct(
            vec!["buyer@example.com".to_string()],
            "Order update",
            "Your order is on its way",
            NotificationMetadata {
                correlation_id: Uuid::new_v4(),
                alert_type: "OrderStatusChanged".to_string(),
                subject_entity_id: Uuid::new_v4(),
                detected_at: Utc::now(),
                severity: Severity::Medium,
            },
        );

        let json = serde_json::to_string(&request).unwrap();
        let back: NotificationRequest = serde_json::from_str(&json).unwrap();
        assert_eq!(back.recipients, request.recipients);
        assert_eq!(back.metadata.severity, Severity::Medium);
    }
}
