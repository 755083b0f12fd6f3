//! Health report returned by `GET /health`

use serde::Serialize;

/// Overall service health.
///
/// # Example
/// ```
/// use costclose_api::utils::health::{ComponentHealth, HealthReport};
///
/// let report = HealthReport::from_database(ComponentHealth::unhealthy("database", "pool exhausted"));
/// assert_eq!(report.status, "degraded");
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    /// `"ok"` when every component is healthy, `"degraded"` otherwise
    pub status: &'static str,
    pub database: ComponentHealth,
}

impl HealthReport {
    pub fn from_database(database: ComponentHealth) -> Self {
        let status = if database.is_healthy { "ok" } else { "degraded" };
        Self { status, database }
    }

    pub fn is_healthy(&self) -> bool {
        self.database.is_healthy
    }
}

/// Health status of an individual component
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentHealth {
    /// Component identifier (e.g., "database")
    pub name: String,

    pub is_healthy: bool,

    /// Optional message describing health state or error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub active_connections: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_connections: Option<u32>,
}

impl ComponentHealth {
    /// Create a healthy component status
    pub fn healthy(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_healthy: true,
            message: None,
            active_connections: None,
            max_connections: None,
        }
    }

    /// Create an unhealthy component status with a message
    pub fn unhealthy(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self { is_healthy: false, message: Some(message.into()), ..Self::healthy(name) }
    }

    pub fn with_connections(mut self, active: u32, max: u32) -> Self {
        self.active_connections = Some(active);
        self.max_connections = Some(max);
        self
    }
}
