//! # Infrastructure Layer
//!
//! Runtime plumbing for Grader: configuration, logging and the service
//! container that owns every long-lived collaborator.
//!
//! ### Configuration & Observability
//! | Module | Description |
//! |--------|-------------|
//! | [`config`] | Figment-layered TOML + environment configuration |
//! | [`logging`] | Structured logging with tracing |
//! | [`health`] | Service health aggregation and metrics |
//! | [`constants`] | Centralized configuration constants |
//!
//! ### Service Lifecycle
//! | Module | Description |
//! |--------|-------------|
//! | [`services`] | State tracking, dependency ordering, fallbacks, container, bootstrap |

pub mod config;
pub mod constants;
pub mod error_ext;
pub mod health;
pub mod logging;
pub mod services;
pub mod utils;

pub use error_ext::ErrorContext;
pub use services::ServiceContainer;
pub use utils::TimedOperation;
