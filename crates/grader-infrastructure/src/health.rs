//! Health checks over the service container
//!
//! [`ServiceHealthChecker`] is read-only: it inspects stored instances
//! directly and never triggers fallback substitution.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use grader_domain::ServiceState;
use grader_domain::value_objects::{ServiceHealth, ServiceHealthReport};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::logging::log_health_check;
use crate::services::ServiceContainer;
use crate::utils::TimedOperation;

/// Aggregated health status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    /// Fully operational
    Up,
    /// Serving, but at least one service runs on a fallback
    Degraded,
    /// Not operational
    Down,
}

impl HealthStatus {
    /// Check if the status indicates the service is healthy
    pub fn is_healthy(self) -> bool {
        matches!(self, Self::Up)
    }

    /// Check if the service is operational (healthy or degraded)
    pub fn is_operational(self) -> bool {
        matches!(self, Self::Up | Self::Degraded)
    }
}

/// Result of checking one service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthCheck {
    /// Service name
    pub name: String,
    /// Status
    pub status: HealthStatus,
    /// When the check ran
    pub timestamp: DateTime<Utc>,
    /// Time spent in the check
    pub response_time_ms: u64,
    /// Failure description
    pub error: Option<String>,
    /// Extra information (lifecycle snapshot)
    pub details: Option<Value>,
}

impl HealthCheck {
    fn with_status<S: Into<String>>(name: S, status: HealthStatus, error: Option<String>) -> Self {
        Self {
            name: name.into(),
            status,
            timestamp: Utc::now(),
            response_time_ms: 0,
            error,
            details: None,
        }
    }

    /// Create a successful check
    pub fn healthy<S: Into<String>>(name: S) -> Self {
        Self::with_status(name, HealthStatus::Up, None)
    }

    /// Create a failed check
    pub fn failed<S: Into<String>>(name: S, error: Option<String>) -> Self {
        Self::with_status(name, HealthStatus::Down, error)
    }

    /// Create a degraded check
    pub fn degraded<S: Into<String>>(name: S, reason: Option<String>) -> Self {
        Self::with_status(name, HealthStatus::Degraded, reason)
    }

    /// Set response time
    pub fn with_response_time(mut self, duration: Duration) -> Self {
        self.response_time_ms = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Set additional details
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }
}

/// Overall health response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Worst status among the checks
    pub status: HealthStatus,
    /// When the response was assembled
    pub timestamp: DateTime<Utc>,
    /// Total time spent
    pub response_time_ms: u64,
    /// Individual checks keyed by service name
    pub checks: HashMap<String, HealthCheck>,
    /// Crate version
    pub version: String,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self::new()
    }
}

impl HealthResponse {
    /// Empty response with status `up`
    pub fn new() -> Self {
        Self {
            status: HealthStatus::Up,
            timestamp: Utc::now(),
            response_time_ms: 0,
            checks: HashMap::new(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// Add a check, lowering the overall status if needed
    pub fn add_check(mut self, check: HealthCheck) -> Self {
        if check.status == HealthStatus::Down {
            self.status = HealthStatus::Down;
        } else if check.status == HealthStatus::Degraded && self.status == HealthStatus::Up {
            self.status = HealthStatus::Degraded;
        }
        self.checks.insert(check.name.clone(), check);
        self
    }

    /// Set response time
    pub fn with_response_time(mut self, duration: Duration) -> Self {
        self.response_time_ms = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Check if the overall system is healthy
    pub fn is_healthy(&self) -> bool {
        self.status.is_healthy()
    }
}

/// Probe helpers for orchestration endpoints
pub struct HealthUtils;

impl HealthUtils {
    /// Ready for traffic: up or degraded
    pub fn is_ready(response: &HealthResponse) -> bool {
        response.status.is_operational()
    }

    /// Alive: anything but down
    pub fn is_alive(response: &HealthResponse) -> bool {
        response.status != HealthStatus::Down
    }
}

/// Health checker over a container's services
pub struct ServiceHealthChecker {
    container: Arc<ServiceContainer>,
}

impl ServiceHealthChecker {
    /// Create a checker for `container`
    pub fn new(container: Arc<ServiceContainer>) -> Self {
        Self { container }
    }

    /// Health of one service
    ///
    /// Uses the instance's own check when it declares one; otherwise a
    /// registered instance counts as healthy. Unregistered names are
    /// unhealthy.
    pub async fn check_service_health(&self, name: &str) -> bool {
        let Some(instance) = self.container.instance(name) else {
            return false;
        };
        match instance.as_health_checkable() {
            Some(checkable) => checkable.health_check().await,
            None => true,
        }
    }

    /// Health of every registered service
    pub async fn check_all_services(&self) -> BTreeMap<String, ServiceHealthReport> {
        let mut reports = BTreeMap::new();
        for name in self.container.registered_names() {
            let healthy = self.check_service_health(&name).await;
            log_health_check(&name, healthy, None);
            reports.insert(
                name,
                ServiceHealthReport {
                    status: ServiceHealth::from_check(healthy),
                    last_check: Utc::now(),
                },
            );
        }
        reports
    }

    /// Metrics of every registered service that exposes them
    ///
    /// Services without metrics, or whose metrics call fails, are left out.
    pub fn get_service_metrics(&self) -> BTreeMap<String, Value> {
        let mut metrics = BTreeMap::new();
        for name in self.container.registered_names() {
            let Some(instance) = self.container.instance(&name) else {
                continue;
            };
            let Some(source) = instance.as_metrics_source() else {
                continue;
            };
            match source.metrics() {
                Ok(value) => {
                    metrics.insert(name, value);
                }
                Err(e) => debug!(service = %name, error = %e, "Metrics collection failed"),
            }
        }
        metrics
    }

    /// Aggregated response over every known service
    ///
    /// A service served by its fallback is `degraded`; a registered
    /// service failing its check, or a service with no instance, is `down`.
    pub async fn health_response(&self) -> HealthResponse {
        let timer = TimedOperation::start();
        let states = self.container.states();
        let recovery = self.container.fallbacks().recovery_status();
        let mut response = HealthResponse::new();

        for (name, snapshot) in states {
            let check_timer = TimedOperation::start();
            let check = match snapshot.status {
                ServiceState::Degraded => HealthCheck::degraded(
                    &name,
                    Some(
                        recovery
                            .get(&name)
                            .and_then(|r| r.degraded_reason.clone())
                            .unwrap_or_else(|| "served by fallback".to_string()),
                    ),
                ),
                _ if self.container.is_registered(&name) => {
                    if self.check_service_health(&name).await {
                        HealthCheck::healthy(&name)
                    } else {
                        HealthCheck::failed(&name, Some("health check failed".to_string()))
                    }
                }
                state => HealthCheck::failed(&name, Some(format!("service is {state}"))),
            };
            log_health_check(
                &name,
                check.status.is_healthy(),
                check.error.as_deref(),
            );
            let details = serde_json::to_value(&snapshot).unwrap_or(Value::Null);
            response = response.add_check(
                check
                    .with_response_time(check_timer.elapsed())
                    .with_details(details),
            );
        }

        response.with_response_time(timer.elapsed())
    }
}
