use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::store::Store;

// ============================================================================
// Health Reporting
// ============================================================================

/// Health status of a component
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", content = "reason", rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded(String),
    Unhealthy(String),
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        matches!(self, HealthStatus::Healthy)
    }

    pub fn is_unhealthy(&self) -> bool {
        matches!(self, HealthStatus::Unhealthy(_))
    }
}

/// Health information for a component
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentHealth {
    pub name: String,
    pub status: HealthStatus,
    pub last_check: DateTime<Utc>,
    pub details: Option<String>,
}

impl ComponentHealth {
    pub fn new(name: impl Into<String>, status: HealthStatus) -> Self {
        Self {
            name: name.into(),
            status,
            last_check: Utc::now(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    pub healthy: bool,
    pub components: Vec<ComponentHealth>,
}

impl HealthReport {
    pub fn from_components(components: Vec<ComponentHealth>) -> Self {
        Self {
            healthy: components.iter().all(|c| !c.status.is_unhealthy()),
            components,
        }
    }
}

/// Slow round trips are reported as degraded, not failed
const SLOW_PING_MS: u128 = 500;

pub async fn check_store(store: &dyn Store) -> ComponentHealth {
    let started = Instant::now();
    match store.ping().await {
        Ok(()) => {
            let elapsed = started.elapsed().as_millis();
            let status = if elapsed > SLOW_PING_MS {
                HealthStatus::Degraded(format!("ping took {}ms", elapsed))
            } else {
                HealthStatus::Healthy
            };
            ComponentHealth::new("store", status).with_details(format!("{}ms", elapsed))
        }
        Err(e) => {
            tracing::warn!(error = %e, "Store health check failed");
            ComponentHealth::new("store", HealthStatus::Unhealthy(e.to_string()))
        }
    }
}
