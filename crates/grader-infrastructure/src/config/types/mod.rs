//! Configuration types

mod ai;
mod app;
mod logging;
mod recovery;
mod services;

pub use ai::AiConfig;
pub use app::AppConfig;
pub use logging::LoggingConfig;
pub use recovery::RecoveryConfig;
pub use services::{NotificationConfig, RedisConfig, ServicesConfig};
