//! Recovery loop configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::constants::{
    RECOVERY_BACKOFF_MULTIPLIER, RECOVERY_BASE_DELAY_MS, RECOVERY_CHECK_INTERVAL_SECS,
    RECOVERY_MAX_ATTEMPTS, RECOVERY_MAX_DELAY_MS,
};

/// Policy for the background recovery of degraded services
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecoveryConfig {
    /// Whether degraded services are retried automatically
    pub enabled: bool,
    /// Seconds between loop ticks
    pub check_interval_secs: u64,
    /// Attempts per service before it is marked permanently failed (0 = unlimited)
    pub max_attempts: u32,
    /// Backoff after the first failed attempt
    pub base_delay_ms: u64,
    /// Backoff ceiling
    pub max_delay_ms: u64,
    /// Backoff growth factor per consecutive failure
    pub backoff_multiplier: f64,
}

impl Default for RecoveryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            check_interval_secs: RECOVERY_CHECK_INTERVAL_SECS,
            max_attempts: RECOVERY_MAX_ATTEMPTS,
            base_delay_ms: RECOVERY_BASE_DELAY_MS,
            max_delay_ms: RECOVERY_MAX_DELAY_MS,
            backoff_multiplier: RECOVERY_BACKOFF_MULTIPLIER,
        }
    }
}

impl RecoveryConfig {
    /// Loop tick interval
    pub fn check_interval(&self) -> Duration {
        Duration::from_secs(self.check_interval_secs)
    }

    /// Delay required before the next attempt after `failures` consecutive failures
    pub fn calculate_backoff(&self, failures: u32) -> Duration {
        if failures == 0 {
            return Duration::ZERO;
        }
        let exponent = i32::try_from(failures - 1).unwrap_or(i32::MAX);
        let delay = self.base_delay_ms as f64 * self.backoff_multiplier.powi(exponent);
        let capped = if delay.is_finite() {
            delay.min(self.max_delay_ms as f64)
        } else {
            self.max_delay_ms as f64
        };
        Duration::from_millis(capped as u64)
    }

    /// True when `attempts` has reached the configured ceiling
    pub fn is_exhausted(&self, attempts: u32) -> bool {
        self.max_attempts > 0 && attempts >= self.max_attempts
    }
}
