//! # Grader
//!
//! Service lifecycle core of an essay-grading backend: a container that
//! owns Redis, LLM, correction, notification and source-type services,
//! initializes them in dependency order, substitutes fallbacks while they
//! are unavailable and retries them in the background.
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use grader::infrastructure::config::ConfigLoader;
//! use grader::infrastructure::services::ServiceContainer;
//! use grader::providers::CorrectionService;
//!
//! # async fn example() -> grader::Result<()> {
//! let config = ConfigLoader::new().load()?;
//! let container = Arc::new(ServiceContainer::new(config));
//! container.initialize().await?;
//!
//! // Real service, or the mock-backed fallback while the LLM is unavailable
//! let correction = container.require::<CorrectionService>("correction_service")?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - `domain` - error type, lifecycle value objects, capability ports
//! - `providers` - the concrete services (Redis, LLM clients, correction, ...)
//! - `infrastructure` - configuration, logging, service container, health
//! - `cli` - the `grader` command line

pub mod cli;

/// Domain layer - core types and ports
///
/// Re-exports from the domain crate for convenience
pub mod domain {
    pub use grader_domain::*;
}

/// Provider layer - container-managed service implementations
///
/// Re-exports from the providers crate for convenience
pub mod providers {
    pub use grader_providers::*;
}

/// Infrastructure layer - config, logging, container and health
///
/// Re-exports from the infrastructure crate for convenience
pub mod infrastructure {
    pub use grader_infrastructure::*;
}

// Re-export commonly used domain types at the crate root
pub use domain::{Error, Result, ServiceState};

// Re-export the container at the crate root
pub use infrastructure::services::{ServiceBootstrap, ServiceContainer};
