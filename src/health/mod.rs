use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

// ============================================================================
// Health Probes
// ============================================================================
//
// Each probe checks one component and reports a status with optional
// latency. The aggregate service merges all reports; a probe flagged
// critical escalates any non-healthy result to an overall failure.
//
// ============================================================================

pub mod probes;

pub use probes::{KafkaProbe, RedisProbe};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
    Unknown,
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        matches!(self, HealthStatus::Healthy)
    }

    // Merge severity: Unknown counts as Degraded.
    fn rank(&self) -> u8 {
        match self {
            HealthStatus::Healthy => 0,
            HealthStatus::Degraded | HealthStatus::Unknown => 1,
            HealthStatus::Unhealthy => 2,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ProbeReport {
    pub component: String,
    pub status: HealthStatus,
    pub latency: Option<Duration>,
    pub description: Option<String>,
}

/// Capability: check one component.
#[async_trait]
pub trait HealthProbe: Send + Sync {
    fn name(&self) -> &str;

    /// Critical probes escalate any non-healthy result to overall failure.
    fn critical(&self) -> bool {
        false
    }

    async fn check(&self) -> ProbeReport;
}

#[derive(Debug, Clone)]
pub struct SystemHealth {
    pub overall: HealthStatus,
    pub reports: Vec<ProbeReport>,
    pub checked_at: DateTime<Utc>,
}

#[derive(Default)]
pub struct HealthService {
    probes: Vec<Arc<dyn HealthProbe>>,
}

impl HealthService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, probe: Arc<dyn HealthProbe>) {
        self.probes.push(probe);
    }

    /// Run every probe and merge the results.
    pub async fn check_all(&self) -> SystemHealth {
        let mut reports = Vec::with_capacity(self.probes.len());
        let mut overall = HealthStatus::Healthy;

        for probe in &self.probes {
            let report = probe.check().await;

            if probe.critical() && !report.status.is_healthy() {
                overall = HealthStatus::Unhealthy;
            } else if report.status.rank() > overall.rank() {
                overall = match report.status {
                    HealthStatus::Unknown => HealthStatus::Degraded,
                    other => other,
                };
            }

            tracing::debug!(
                component = probe.name(),
                critical = probe.critical(),
                status = ?report.status,
                latency = ?report.latency,
                "Health probe completed"
            );
            reports.push(report);
        }

        SystemHealth {
            overall,
            reports,
            checked_at: Utc::now(),
        }
    }
}
