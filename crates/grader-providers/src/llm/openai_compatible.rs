//! OpenAI-compatible chat completion client
//!
//! DeepSeek, OpenAI and Aliyun Qianwen (DashScope compatible mode) all
//! accept the same `/chat/completions` request shape, so one client serves
//! the three providers with different base URLs and models.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use grader_domain::error::{Error, Result};
use grader_domain::ports::LlmClient;

use crate::constants::{CONTENT_TYPE_JSON, LLM_TEMPERATURE};
use crate::utils::HttpResponseUtils;

/// Chat-completions client for an OpenAI-compatible API
///
/// ## Example
///
/// ```rust,no_run
/// use grader_providers::OpenAiCompatibleClient;
/// use reqwest::Client;
/// use std::time::Duration;
///
/// let client = OpenAiCompatibleClient::new(
///     "deepseek",
///     "sk-your-api-key".to_string(),
///     "https://api.deepseek.com/v1".to_string(),
///     "deepseek-chat".to_string(),
///     Duration::from_secs(60),
///     Client::new(),
/// );
/// ```
pub struct OpenAiCompatibleClient {
    provider: String,
    api_key: String,
    base_url: String,
    model: String,
    timeout: Duration,
    http_client: Client,
}

impl OpenAiCompatibleClient {
    /// Create a new client
    ///
    /// # Arguments
    /// * `provider` - Provider name reported in errors and metrics
    /// * `api_key` - Bearer token
    /// * `base_url` - API root, without the `/chat/completions` suffix
    /// * `model` - Model name
    /// * `timeout` - Per-request timeout
    /// * `http_client` - Shared reqwest client
    pub fn new<P: Into<String>>(
        provider: P,
        api_key: String,
        base_url: String,
        model: String,
        timeout: Duration,
        http_client: Client,
    ) -> Self {
        Self {
            provider: provider.into(),
            api_key: api_key.trim().to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
            timeout,
            http_client,
        }
    }

    /// Get the base URL for this client
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Get the request timeout
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    fn parse_content(&self, body: &serde_json::Value) -> Result<String> {
        body["choices"]
            .get(0)
            .and_then(|choice| choice["message"]["content"].as_str())
            .map(str::to_string)
            .ok_or_else(|| {
                Error::llm(
                    &self.provider,
                    "Invalid response format: missing choices[0].message.content",
                )
            })
    }
}

#[async_trait]
impl LlmClient for OpenAiCompatibleClient {
    async fn complete(&self, system_prompt: &str, user_prompt: &str) -> Result<String> {
        let payload = serde_json::json!({
            "model": self.model,
            "temperature": LLM_TEMPERATURE,
            "messages": [
                {"role": "system", "content": system_prompt},
                {"role": "user", "content": user_prompt},
            ],
        });

        let response = self
            .http_client
            .post(self.completions_url())
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", CONTENT_TYPE_JSON)
            .timeout(self.timeout)
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    Error::llm(
                        &self.provider,
                        format!("request timed out after {:?}", self.timeout),
                    )
                } else {
                    Error::llm(&self.provider, format!("HTTP request failed: {e}"))
                }
            })?;

        let body = HttpResponseUtils::check_and_parse(response, &self.provider).await?;
        self.parse_content(&body)
    }

    fn provider_name(&self) -> &str {
        &self.provider
    }

    fn model(&self) -> &str {
        &self.model
    }
}
