//! Service connection configuration

use grader_providers::constants::{DEFAULT_SOURCE_TYPES, NOTIFICATION_DEFAULT_CHANNEL};
use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_REDIS_URL;

/// Settings for the container-managed collaborator services
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServicesConfig {
    /// Redis connection
    pub redis: RedisConfig,
    /// Notification delivery
    pub notification: NotificationConfig,
    /// Enabled essay source types
    pub source_types: Vec<String>,
}

impl Default for ServicesConfig {
    fn default() -> Self {
        Self {
            redis: RedisConfig::default(),
            notification: NotificationConfig::default(),
            source_types: DEFAULT_SOURCE_TYPES.iter().map(|s| (*s).to_string()).collect(),
        }
    }
}

/// Redis connection settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RedisConfig {
    /// Connection URL
    pub url: String,
    /// PING timeout for health checks in milliseconds
    pub ping_timeout_ms: u64,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_REDIS_URL.to_string(),
            ping_timeout_ms: grader_providers::constants::REDIS_PING_TIMEOUT_MS,
        }
    }
}

/// Notification settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationConfig {
    /// Pub/sub channel
    pub channel: String,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            channel: NOTIFICATION_DEFAULT_CHANNEL.to_string(),
        }
    }
}
