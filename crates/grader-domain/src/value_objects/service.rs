//! Service lifecycle value objects

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Lifecycle stage of a named service
///
/// Any state may follow any other; the tracker does not police transitions
/// so that concurrent initialization paths never fail on ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceState {
    /// Known by name only
    #[default]
    Unregistered,
    /// Instance is being recorded in the container
    Registering,
    /// Initializer is running
    Initializing,
    /// Real instance available
    Ready,
    /// A fallback is being served in place of the real instance
    Degraded,
    /// Initialization or recovery failed
    Error,
    /// Being torn down
    Stopping,
    /// Torn down
    Stopped,
}

impl ServiceState {
    /// Stable lowercase name, matches the serialized form
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unregistered => "unregistered",
            Self::Registering => "registering",
            Self::Initializing => "initializing",
            Self::Ready => "ready",
            Self::Degraded => "degraded",
            Self::Error => "error",
            Self::Stopping => "stopping",
            Self::Stopped => "stopped",
        }
    }

    /// Check if the service is fully usable
    pub fn is_ready(self) -> bool {
        matches!(self, Self::Ready)
    }

    /// Check if something (real or fallback) is being served
    pub fn is_serving(self) -> bool {
        matches!(self, Self::Ready | Self::Degraded)
    }
}

impl fmt::Display for ServiceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One named service as seen by the state tracker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceDescriptor {
    /// Unique service name
    pub name: String,
    /// Current lifecycle state
    pub state: ServiceState,
    /// Services this one requires to be ready
    pub dependencies: BTreeSet<String>,
    /// Services that declared this one as a dependency
    pub dependents: BTreeSet<String>,
    /// Number of transitions into [`ServiceState::Error`]
    pub error_count: u32,
    /// Message of the most recent error
    pub last_error: Option<String>,
    /// When the state last changed
    pub last_state_change: DateTime<Utc>,
    /// When the descriptor was materialized
    pub registered_at: DateTime<Utc>,
}

impl ServiceDescriptor {
    /// Create a descriptor in the `unregistered` state
    pub fn new<S: Into<String>>(name: S) -> Self {
        let now = Utc::now();
        Self {
            name: name.into(),
            state: ServiceState::Unregistered,
            dependencies: BTreeSet::new(),
            dependents: BTreeSet::new(),
            error_count: 0,
            last_error: None,
            last_state_change: now,
            registered_at: now,
        }
    }

    /// Serializable view of this descriptor
    pub fn snapshot(&self) -> ServiceStatusSnapshot {
        ServiceStatusSnapshot {
            status: self.state,
            dependencies: self.dependencies.iter().cloned().collect(),
            dependents: self.dependents.iter().cloned().collect(),
            error_count: self.error_count,
            last_error: self.last_error.clone(),
            last_state_change: self.last_state_change,
            registered_at: self.registered_at,
        }
    }
}

/// Serializable status of one service, used by observability endpoints
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceStatusSnapshot {
    /// Current lifecycle state
    pub status: ServiceState,
    /// Declared dependencies
    pub dependencies: Vec<String>,
    /// Reverse edges
    pub dependents: Vec<String>,
    /// Number of errors recorded
    pub error_count: u32,
    /// Most recent error message
    pub last_error: Option<String>,
    /// Timestamp of the last transition
    pub last_state_change: DateTime<Utc>,
    /// Timestamp the descriptor was created
    pub registered_at: DateTime<Utc>,
}

/// Health of a single registered service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceHealth {
    /// Health check passed (or the service declares no check)
    Healthy,
    /// Health check failed
    Unhealthy,
}

impl ServiceHealth {
    /// Map a boolean check result
    pub fn from_check(passed: bool) -> Self {
        if passed { Self::Healthy } else { Self::Unhealthy }
    }

    /// Check if healthy
    pub fn is_healthy(self) -> bool {
        matches!(self, Self::Healthy)
    }
}

/// Result of checking one service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceHealthReport {
    /// Health status
    pub status: ServiceHealth,
    /// When the check ran
    pub last_check: DateTime<Utc>,
}
