//! Domain Port Interfaces
//!
//! Defines the boundary contracts between the service container and the
//! services it manages.
//!
//! ## Organization
//!
//! - **service** - capabilities a container-managed instance may declare
//! - **recovery** - callbacks used to restore degraded services
//! - **providers** - external collaborators (LLM clients, pub/sub)

/// External provider ports
pub mod providers;
/// Recovery handler port
pub mod recovery;
/// Service capability ports
pub mod service;

pub use providers::{LlmClient, NotificationPublisher, SharedLlmClient};
pub use recovery::{
    FnRecoveryHandler, RecoveryHandler, RecoveryParams, SharedRecoveryHandler, recovery_fn,
};
pub use service::{HealthCheckable, ManagedService, MetricsSource, SharedService};
