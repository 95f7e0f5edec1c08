//! Service capability ports
//!
//! Every instance stored in the service container implements
//! [`ManagedService`]. Optional capabilities are declared explicitly by
//! overriding the `as_*` accessors instead of being probed at runtime.

use crate::error::Result;
use async_trait::async_trait;
use downcast_rs::{DowncastSync, impl_downcast};
use serde_json::Value;
use std::sync::Arc;

/// A service instance owned by the container
///
/// # Example
///
/// ```
/// use grader_domain::ports::{HealthCheckable, ManagedService};
/// use async_trait::async_trait;
///
/// struct Clock;
///
/// #[async_trait]
/// impl HealthCheckable for Clock {
///     async fn health_check(&self) -> bool {
///         true
///     }
/// }
///
/// impl ManagedService for Clock {
///     fn as_health_checkable(&self) -> Option<&dyn HealthCheckable> {
///         Some(self)
///     }
/// }
/// ```
pub trait ManagedService: DowncastSync {
    /// Side effect run while the container records the instance
    ///
    /// An error here leaves the service in the `error` state.
    fn on_register(&self) -> Result<()> {
        Ok(())
    }

    /// Health check capability, if the service declares one
    fn as_health_checkable(&self) -> Option<&dyn HealthCheckable> {
        None
    }

    /// Metrics capability, if the service declares one
    fn as_metrics_source(&self) -> Option<&dyn MetricsSource> {
        None
    }
}
impl_downcast!(sync ManagedService);

/// Shared handle to a container-owned service
pub type SharedService = Arc<dyn ManagedService>;

/// Services that can report their own health
#[async_trait]
pub trait HealthCheckable: Send + Sync {
    /// Return true when the service is usable
    async fn health_check(&self) -> bool;
}

/// Services that expose operational metrics
pub trait MetricsSource: Send + Sync {
    /// Current metrics as a JSON object
    fn metrics(&self) -> Result<Value>;
}
