//! Structured logging with tracing
//!
//! Configures `tracing-subscriber` from [`LoggingConfig`]: level filter
//! (overridable through `GRADER_LOG`), plain or JSON output, and an
//! optional daily rolling file.

use grader_domain::ServiceState;
use grader_domain::error::{Error, Result};

pub use crate::config::LoggingConfig;
use crate::constants::{LOG_FILE_STEM, LOG_FILTER_ENV};
use tracing::{Level, debug, error, info, warn};
use tracing_subscriber::{EnvFilter, Registry, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the global subscriber
///
/// Fails if the level is invalid or a global subscriber is already set.
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let level = parse_log_level(&config.level)?;
    let filter =
        EnvFilter::try_from_env(LOG_FILTER_ENV).unwrap_or_else(|_| EnvFilter::new(&config.level));

    let file_appender = config.file_output.as_ref().map(|path| {
        tracing_appender::rolling::daily(
            path.parent().unwrap_or_else(|| std::path::Path::new(".")),
            path.file_stem()
                .unwrap_or_else(|| std::ffi::OsStr::new(LOG_FILE_STEM)),
        )
    });

    // The json and plain layers have different types, hence the branches
    let registry = Registry::default().with(filter);
    let result = if config.json_format {
        let stdout = fmt::layer().json().with_target(true);
        match file_appender {
            Some(appender) => {
                let file = fmt::layer()
                    .json()
                    .with_writer(appender)
                    .with_ansi(false);
                registry.with(stdout).with(file).try_init()
            }
            None => registry.with(stdout).try_init(),
        }
    } else {
        let stdout = fmt::layer().with_target(true);
        match file_appender {
            Some(appender) => {
                let file = fmt::layer().with_writer(appender).with_ansi(false);
                registry.with(stdout).with(file).try_init()
            }
            None => registry.with(stdout).try_init(),
        }
    };
    result.map_err(|e| Error::config(format!("Failed to initialize logging: {e}")))?;

    info!("Logging initialized with level: {}", level);
    Ok(())
}

/// Parse log level string to tracing Level
pub fn parse_log_level(level: &str) -> Result<Level> {
    match level.to_lowercase().as_str() {
        "trace" => Ok(Level::TRACE),
        "debug" => Ok(Level::DEBUG),
        "info" => Ok(Level::INFO),
        "warn" | "warning" => Ok(Level::WARN),
        "error" => Ok(Level::ERROR),
        _ => Err(Error::config(format!(
            "Invalid log level: {level}. Use trace, debug, info, warn, or error"
        ))),
    }
}

/// Log configuration loading status
pub fn log_config_loaded(config_path: &std::path::Path, success: bool) {
    if success {
        info!("Configuration loaded from {}", config_path.display());
    } else {
        warn!("Configuration file not found: {}", config_path.display());
    }
}

/// Log health check result
pub fn log_health_check(component: &str, healthy: bool, details: Option<&str>) {
    if healthy {
        debug!(component = component, "Health check passed");
    } else {
        error!(
            component = component,
            details = details.unwrap_or("Unknown failure"),
            "Health check failed"
        );
    }
}

/// Log a lifecycle transition
pub fn log_state_transition(
    service: &str,
    from: ServiceState,
    to: ServiceState,
    error: Option<&str>,
) {
    match to {
        ServiceState::Error => warn!(
            service = %service,
            from = %from,
            to = %to,
            error = error.unwrap_or("unknown"),
            "Service state changed"
        ),
        ServiceState::Degraded => warn!(
            service = %service,
            from = %from,
            to = %to,
            reason = error.unwrap_or("unspecified"),
            "Service state changed"
        ),
        _ => debug!(service = %service, from = %from, to = %to, "Service state changed"),
    }
}
