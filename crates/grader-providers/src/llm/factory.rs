//! AI client factory
//!
//! Owns one reqwest client and hands out [`LlmClient`]s per provider name,
//! caching each after first construction.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use grader_domain::constants::{
    PROVIDER_DEEPSEEK, PROVIDER_MOCK, PROVIDER_OPENAI, PROVIDER_QIANWEN, SERVICE_AI_CLIENT_FACTORY,
};
use grader_domain::error::{Error, Result};
use grader_domain::ports::{
    HealthCheckable, LlmClient, ManagedService, MetricsSource, SharedLlmClient,
};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{MockLlmClient, OpenAiCompatibleClient};
use crate::constants::{
    DEEPSEEK_BASE_URL, DEEPSEEK_DEFAULT_MODEL, LLM_DEFAULT_TIMEOUT_SECS, OPENAI_BASE_URL,
    OPENAI_DEFAULT_MODEL, QIANWEN_BASE_URL, QIANWEN_DEFAULT_MODEL,
};

/// Connection settings for one LLM provider
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmClientSettings {
    /// API key; a provider without one is not available
    pub api_key: Option<String>,
    /// Override for the provider's API root
    pub base_url: Option<String>,
    /// Override for the provider's default model
    pub model: Option<String>,
    /// Request timeout in seconds
    pub timeout_secs: Option<u64>,
}

impl LlmClientSettings {
    fn has_api_key(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.trim().is_empty())
    }
}

/// Default base URL and model for a known provider
fn provider_defaults(provider: &str) -> Option<(&'static str, &'static str)> {
    match provider {
        PROVIDER_DEEPSEEK => Some((DEEPSEEK_BASE_URL, DEEPSEEK_DEFAULT_MODEL)),
        PROVIDER_OPENAI => Some((OPENAI_BASE_URL, OPENAI_DEFAULT_MODEL)),
        PROVIDER_QIANWEN => Some((QIANWEN_BASE_URL, QIANWEN_DEFAULT_MODEL)),
        _ => None,
    }
}

/// Factory producing LLM clients per provider
pub struct AiClientFactory {
    settings: BTreeMap<String, LlmClientSettings>,
    default_provider: String,
    mock_only: bool,
    http_client: Client,
    clients: RwLock<HashMap<String, SharedLlmClient>>,
    clients_created: AtomicU64,
}

impl AiClientFactory {
    /// Create a factory for the configured providers
    ///
    /// Fails when the default provider is unknown, or when no real provider
    /// has an API key and the default is not `mock`.
    pub fn new(
        settings: BTreeMap<String, LlmClientSettings>,
        default_provider: &str,
    ) -> Result<Self> {
        if default_provider != PROVIDER_MOCK && provider_defaults(default_provider).is_none() {
            return Err(Error::config(format!(
                "Unknown default LLM provider '{default_provider}'"
            )));
        }

        let configured = settings
            .iter()
            .filter(|(name, s)| provider_defaults(name).is_some() && s.has_api_key())
            .count();
        if configured == 0 && default_provider != PROVIDER_MOCK {
            return Err(Error::service_unavailable(
                SERVICE_AI_CLIENT_FACTORY,
                "no LLM provider has an API key configured",
            ));
        }

        let http_client = Client::builder().build().map_err(|e| {
            Error::infrastructure_with_source("Failed to build HTTP client", e)
        })?;

        info!(
            default_provider = %default_provider,
            configured_providers = configured,
            "AI client factory created"
        );

        Ok(Self {
            settings,
            default_provider: default_provider.to_string(),
            mock_only: false,
            http_client,
            clients: RwLock::new(HashMap::new()),
            clients_created: AtomicU64::new(0),
        })
    }

    /// Create a factory that only serves the mock client
    ///
    /// Used as the degraded stand-in when no real provider can be reached.
    pub fn mock_only() -> Self {
        Self {
            settings: BTreeMap::new(),
            default_provider: PROVIDER_MOCK.to_string(),
            mock_only: true,
            http_client: Client::new(),
            clients: RwLock::new(HashMap::new()),
            clients_created: AtomicU64::new(0),
        }
    }

    /// True when every request is answered by the mock client
    pub fn is_mock_only(&self) -> bool {
        self.mock_only
    }

    /// Provider used when the caller names none
    pub fn default_provider(&self) -> &str {
        &self.default_provider
    }

    /// Providers that can currently produce a client, `mock` always last
    pub fn available_providers(&self) -> Vec<String> {
        let mut providers: Vec<String> = if self.mock_only {
            Vec::new()
        } else {
            self.settings
                .iter()
                .filter(|(name, s)| provider_defaults(name).is_some() && s.has_api_key())
                .map(|(name, _)| name.clone())
                .collect()
        };
        providers.push(PROVIDER_MOCK.to_string());
        providers
    }

    /// Get (or build) the client for a provider
    ///
    /// `None` selects the default provider.
    pub fn get_client(&self, provider: Option<&str>) -> Result<SharedLlmClient> {
        let name = if self.mock_only {
            PROVIDER_MOCK
        } else {
            provider.unwrap_or(&self.default_provider)
        };

        if let Ok(clients) = self.clients.read()
            && let Some(client) = clients.get(name)
        {
            return Ok(Arc::clone(client));
        }

        let client = self.build_client(name)?;
        let mut clients = self
            .clients
            .write()
            .map_err(|_| Error::internal("AI client cache lock poisoned"))?;
        let client = clients
            .entry(name.to_string())
            .or_insert_with(|| {
                self.clients_created.fetch_add(1, Ordering::Relaxed);
                client
            })
            .clone();
        Ok(client)
    }

    fn build_client(&self, name: &str) -> Result<SharedLlmClient> {
        if name == PROVIDER_MOCK {
            return Ok(Arc::new(MockLlmClient::new()));
        }

        let (default_url, default_model) = provider_defaults(name)
            .ok_or_else(|| Error::not_found(format!("LLM provider '{name}'")))?;
        let settings = self
            .settings
            .get(name)
            .filter(|s| s.has_api_key())
            .ok_or_else(|| {
                Error::service_unavailable(name, "API key not configured for provider")
            })?;

        debug!(provider = %name, "Building LLM client");
        let client: Arc<dyn LlmClient> = Arc::new(OpenAiCompatibleClient::new(
            name,
            settings.api_key.clone().unwrap_or_default(),
            settings
                .base_url
                .clone()
                .unwrap_or_else(|| default_url.to_string()),
            settings
                .model
                .clone()
                .unwrap_or_else(|| default_model.to_string()),
            Duration::from_secs(settings.timeout_secs.unwrap_or(LLM_DEFAULT_TIMEOUT_SECS)),
            self.http_client.clone(),
        ));
        Ok(client)
    }
}

#[async_trait]
impl HealthCheckable for AiClientFactory {
    async fn health_check(&self) -> bool {
        self.get_client(None).is_ok()
    }
}

impl MetricsSource for AiClientFactory {
    fn metrics(&self) -> Result<serde_json::Value> {
        Ok(serde_json::json!({
            "default_provider": self.default_provider,
            "mock_only": self.mock_only,
            "available_providers": self.available_providers(),
            "clients_created": self.clients_created.load(Ordering::Relaxed),
        }))
    }
}

impl ManagedService for AiClientFactory {
    fn as_health_checkable(&self) -> Option<&dyn HealthCheckable> {
        Some(self)
    }

    fn as_metrics_source(&self) -> Option<&dyn MetricsSource> {
        Some(self)
    }
}
