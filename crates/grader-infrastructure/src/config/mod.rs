//! Configuration management
//!
//! Layered configuration: defaults, then `grader.toml`, then `GRADER__*`
//! environment variables.

pub mod loader;
pub mod types;

pub use loader::{ConfigBuilder, ConfigLoader};
pub use types::{
    AiConfig, AppConfig, LoggingConfig, NotificationConfig, RecoveryConfig, RedisConfig,
    ServicesConfig,
};
