//! Infrastructure layer constants
//!
//! Contains constants that are part of the infrastructure implementation.
//! Service names and grading limits are defined in `grader_domain::constants`.

// ============================================================================
// CONFIGURATION CONSTANTS
// ============================================================================

/// Default configuration file name
pub const DEFAULT_CONFIG_FILENAME: &str = "grader.toml";

/// Default configuration directory name
pub const DEFAULT_CONFIG_DIR: &str = "grader";

/// Environment variable prefix for configuration
pub const CONFIG_ENV_PREFIX: &str = "GRADER";

/// Separator between nested keys in environment variable names
pub const CONFIG_ENV_SEPARATOR: &str = "__";

// ============================================================================
// LOGGING CONSTANTS
// ============================================================================

/// Default log level
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Environment variable overriding the log filter
pub const LOG_FILTER_ENV: &str = "GRADER_LOG";

/// Log file name stem used when the configured path has none
pub const LOG_FILE_STEM: &str = "grader";

// ============================================================================
// SERVICE CONSTANTS
// ============================================================================

/// Default Redis connection URL
pub const DEFAULT_REDIS_URL: &str = "redis://127.0.0.1:6379/0";

// ============================================================================
// RECOVERY CONSTANTS
// ============================================================================

/// Seconds between recovery loop ticks
pub const RECOVERY_CHECK_INTERVAL_SECS: u64 = 30;

/// Recovery attempts per service before giving up (0 = unlimited)
pub const RECOVERY_MAX_ATTEMPTS: u32 = 10;

/// Delay after the first failed recovery attempt in milliseconds
pub const RECOVERY_BASE_DELAY_MS: u64 = 30_000;

/// Upper bound for the recovery backoff delay in milliseconds
pub const RECOVERY_MAX_DELAY_MS: u64 = 600_000;

/// Growth factor applied per consecutive recovery failure
pub const RECOVERY_BACKOFF_MULTIPLIER: f64 = 2.0;
