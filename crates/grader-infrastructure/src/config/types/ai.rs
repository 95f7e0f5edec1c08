//! LLM provider configuration

use std::collections::BTreeMap;

use grader_domain::constants::PROVIDER_DEEPSEEK;
use grader_providers::LlmClientSettings;
use serde::{Deserialize, Serialize};

/// LLM provider settings
///
/// ```toml
/// [ai]
/// default_provider = "deepseek"
///
/// [ai.providers.deepseek]
/// api_key = "sk-..."
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    /// Provider used when a caller names none
    pub default_provider: String,
    /// Per-provider connection settings keyed by provider name
    pub providers: BTreeMap<String, LlmClientSettings>,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            default_provider: PROVIDER_DEEPSEEK.to_string(),
            providers: BTreeMap::new(),
        }
    }
}
