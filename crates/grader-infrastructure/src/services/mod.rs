//! Service lifecycle management
//!
//! | Module | Role |
//! |--------|------|
//! | [`state`] | per-service lifecycle state and dependency edges |
//! | [`graph`] | cycle detection and initialization order |
//! | [`fallback`] | fallback instances, recovery handlers, recovery loop |
//! | [`container`] | live instance registry with readiness checks |
//! | [`bootstrap`] | static initializer table for the well-known services |

pub mod bootstrap;
pub mod container;
pub mod fallback;
pub mod graph;
pub mod state;

pub use bootstrap::{BootstrapReport, FallbackFactory, Initializer, ServiceBootstrap, ServiceEntry};
pub use container::ServiceContainer;
pub use fallback::{
    FallbackBinding, FallbackRegistry, RecoveryState, RecoveryStatus, RecoveryStatusSnapshot,
};
pub use graph::DependencyGraph;
pub use state::ServiceStateTracker;
