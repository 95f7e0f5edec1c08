//! External provider ports

use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Chat-completion style LLM client
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Send a system + user prompt and return the raw completion text
    async fn complete(&self, system_prompt: &str, user_prompt: &str) -> Result<String>;

    /// Provider name (deepseek, openai, qianwen, mock)
    fn provider_name(&self) -> &str;

    /// Model identifier used for requests
    fn model(&self) -> &str;
}

/// Shared LLM client
pub type SharedLlmClient = Arc<dyn LlmClient>;

/// Pub/sub transport used to deliver notifications
#[async_trait]
pub trait NotificationPublisher: Send + Sync {
    /// Publish a payload to a channel
    async fn publish(&self, channel: &str, payload: &str) -> Result<()>;
}
