use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// Correlation Context
// ============================================================================
//
// Request-scoped identity carried explicitly through every operation call.
// Publishers and handlers read it to stamp outbound messages and logs, so
// one inbound request can be traced across persistence, dispatch and the
// broker hop. Passed by reference; never stored in task-local state.
//
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorrelationContext {
    pub log_id: Uuid,
    pub correlation_id: Uuid,
    pub service_name: String,
    pub user_id: Option<Uuid>,
}

impl CorrelationContext {
    /// Start a fresh context for one logical operation.
    pub fn new(service_name: impl Into<String>) -> Self {
        Self {
            log_id: Uuid::new_v4(),
            correlation_id: Uuid::new_v4(),
            service_name: service_name.into(),
            user_id: None,
        }
    }

    pub fn with_user(mut self, user_id: Uuid) -> Self {
        self.user_id = Some(user_id);
        self
    }

    /// Derive a context for a follow-on operation that shares the
    /// correlation id but gets its own log id.
    pub fn child(&self) -> Self {
        Self {
            log_id: Uuid::new_v4(),
            correlation_id: self.correlation_id,
            service_name: self.service_name.clone(),
            user_id: self.user_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_child_shares_correlation_id() {
        let ctx = CorrelationContext::new("agrolink").with_user(Uuid::new_v4());
        let child = ctx.child();

        assert_eq!(child.correlation_id, ctx.correlation_id);
        assert_eq!(child.user_id, ctx.user_id);
        assert_ne!(child.log_id, ctx.log_id);
    }
}
