//! Configuration loader
//!
//! Merges, in increasing priority:
//! 1. `AppConfig::default()`
//! 2. a TOML file (explicit path, or `grader.toml` in the usual places)
//! 3. environment variables such as `GRADER__SERVICES__REDIS__URL`

use crate::config::{AiConfig, AppConfig, LoggingConfig, RecoveryConfig, ServicesConfig};
use crate::constants::{
    CONFIG_ENV_PREFIX, CONFIG_ENV_SEPARATOR, DEFAULT_CONFIG_DIR, DEFAULT_CONFIG_FILENAME,
};
use crate::error_ext::ErrorContext;
use crate::logging::{log_config_loaded, parse_log_level};
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use grader_domain::error::{Error, Result};
use grader_providers::LlmClientSettings;
use std::env;
use std::path::{Path, PathBuf};

/// Configuration loader service
#[derive(Clone)]
pub struct ConfigLoader {
    config_path: Option<PathBuf>,
    env_prefix: String,
}

impl ConfigLoader {
    /// Create a loader with the default search paths and `GRADER` prefix
    pub fn new() -> Self {
        Self {
            config_path: None,
            env_prefix: CONFIG_ENV_PREFIX.to_string(),
        }
    }

    /// Set the configuration file path
    pub fn with_config_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Set the environment variable prefix
    pub fn with_env_prefix<S: Into<String>>(mut self, prefix: S) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    /// Get the configured file path, if any
    pub fn config_path(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }

    /// Load and validate configuration from all sources
    pub fn load(&self) -> Result<AppConfig> {
        let mut figment = Figment::new().merge(Serialized::defaults(AppConfig::default()));

        match &self.config_path {
            Some(path) if path.exists() => {
                figment = figment.merge(Toml::file(path));
                log_config_loaded(path, true);
            }
            Some(path) => {
                return Err(Error::config(format!(
                    "Configuration file not found: {}",
                    path.display()
                )));
            }
            None => {
                if let Some(path) = Self::find_default_config_path() {
                    figment = figment.merge(Toml::file(&path));
                    log_config_loaded(&path, true);
                }
            }
        }

        figment = figment.merge(
            Env::prefixed(&format!("{}{}", self.env_prefix, CONFIG_ENV_SEPARATOR))
                .split(CONFIG_ENV_SEPARATOR),
        );

        let config: AppConfig = figment
            .extract()
            .config_context("Failed to extract configuration")?;

        validate_app_config(&config)?;
        Ok(config)
    }

    /// Write a configuration as pretty TOML
    pub fn save_to_file<P: AsRef<Path>>(&self, config: &AppConfig, path: P) -> Result<()> {
        let toml_string =
            toml::to_string_pretty(config).context("Failed to serialize config to TOML")?;
        std::fs::write(path.as_ref(), toml_string).io_context("Failed to write config file")?;
        Ok(())
    }

    fn find_default_config_path() -> Option<PathBuf> {
        let current_dir = env::current_dir().ok()?;

        let candidates = [
            Some(current_dir.join(DEFAULT_CONFIG_FILENAME)),
            Some(current_dir.join("config").join(DEFAULT_CONFIG_FILENAME)),
            dirs::config_dir().map(|d| d.join(DEFAULT_CONFIG_DIR).join(DEFAULT_CONFIG_FILENAME)),
        ];

        candidates.into_iter().flatten().find(|path| path.exists())
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

/// Validate every configuration section
pub fn validate_app_config(config: &AppConfig) -> Result<()> {
    validate_logging_config(&config.logging)?;
    validate_services_config(&config.services)?;
    validate_ai_config(&config.ai)?;
    validate_recovery_config(&config.recovery)?;
    Ok(())
}

fn validate_logging_config(config: &LoggingConfig) -> Result<()> {
    parse_log_level(&config.level).map(|_| ())
}

fn validate_services_config(config: &ServicesConfig) -> Result<()> {
    if config.redis.url.trim().is_empty() {
        return Err(Error::config("Redis URL cannot be empty"));
    }
    if config.redis.ping_timeout_ms == 0 {
        return Err(Error::config("Redis ping timeout cannot be 0"));
    }
    if config.notification.channel.trim().is_empty() {
        return Err(Error::config("Notification channel cannot be empty"));
    }
    Ok(())
}

fn validate_ai_config(config: &AiConfig) -> Result<()> {
    if config.default_provider.trim().is_empty() {
        return Err(Error::config("Default LLM provider cannot be empty"));
    }
    if let Some((name, _)) = config
        .providers
        .iter()
        .find(|(_, p)| p.timeout_secs == Some(0))
    {
        return Err(Error::config(format!(
            "Request timeout for LLM provider '{name}' cannot be 0"
        )));
    }
    Ok(())
}

fn validate_recovery_config(config: &RecoveryConfig) -> Result<()> {
    if !config.enabled {
        return Ok(());
    }
    if config.check_interval_secs == 0 {
        return Err(Error::config(
            "Recovery check interval cannot be 0 when recovery is enabled",
        ));
    }
    if config.max_delay_ms < config.base_delay_ms {
        return Err(Error::config(
            "Recovery max_delay_ms cannot be smaller than base_delay_ms",
        ));
    }
    if config.backoff_multiplier < 1.0 {
        return Err(Error::config("Recovery backoff multiplier must be >= 1.0"));
    }
    Ok(())
}

/// Configuration builder for programmatic configuration
pub struct ConfigBuilder {
    config: AppConfig,
}

impl ConfigBuilder {
    /// Start from defaults
    pub fn new() -> Self {
        Self {
            config: AppConfig::default(),
        }
    }

    /// Set logging configuration
    pub fn with_logging(mut self, logging: LoggingConfig) -> Self {
        self.config.logging = logging;
        self
    }

    /// Set the Redis URL
    pub fn with_redis_url<S: Into<String>>(mut self, url: S) -> Self {
        self.config.services.redis.url = url.into();
        self
    }

    /// Set the default LLM provider
    pub fn with_default_provider<S: Into<String>>(mut self, provider: S) -> Self {
        self.config.ai.default_provider = provider.into();
        self
    }

    /// Add an LLM provider
    pub fn with_llm_provider<S: Into<String>>(
        mut self,
        name: S,
        settings: LlmClientSettings,
    ) -> Self {
        self.config.ai.providers.insert(name.into(), settings);
        self
    }

    /// Set recovery policy
    pub fn with_recovery(mut self, recovery: RecoveryConfig) -> Self {
        self.config.recovery = recovery;
        self
    }

    /// Set enabled source types
    pub fn with_source_types<S: AsRef<str>>(mut self, source_types: &[S]) -> Self {
        self.config.services.source_types =
            source_types.iter().map(|s| s.as_ref().to_string()).collect();
        self
    }

    /// Finish building
    pub fn build(self) -> AppConfig {
        self.config
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
