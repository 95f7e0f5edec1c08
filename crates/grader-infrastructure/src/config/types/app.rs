//! Root application configuration

use serde::{Deserialize, Serialize};

use super::{AiConfig, LoggingConfig, RecoveryConfig, ServicesConfig};

/// Complete Grader configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Logging output
    pub logging: LoggingConfig,
    /// Service connection settings
    pub services: ServicesConfig,
    /// LLM provider settings
    pub ai: AiConfig,
    /// Fallback recovery loop policy
    pub recovery: RecoveryConfig,
}
