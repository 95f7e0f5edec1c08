//! Essay correction service
//!
//! Sends an essay to an [`LlmClient`] and turns the JSON grading block in
//! the reply into a [`CorrectionResult`].

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use grader_domain::constants::{ESSAY_MAX_SCORE, PROVIDER_MOCK};
use grader_domain::error::{Error, Result};
use grader_domain::ports::{HealthCheckable, ManagedService, MetricsSource, SharedLlmClient};
use grader_domain::value_objects::{CorrectionResult, EssayRequest};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, warn};

use crate::llm::{AiClientFactory, MockLlmClient};

const SYSTEM_PROMPT: &str = "You are an experienced Chinese composition teacher. \
Grade the essay and reply with a JSON object: \
{\"score\": number 0-100, \"summary\": string, \"suggestions\": [string]}.";

#[derive(Debug, Deserialize)]
struct GradingBlock {
    score: f64,
    #[serde(default)]
    summary: String,
    #[serde(default)]
    suggestions: Vec<String>,
}

/// Essay correction service
pub struct CorrectionService {
    llm: SharedLlmClient,
    corrections: AtomicU64,
    failures: AtomicU64,
}

impl CorrectionService {
    /// Create a service backed by a specific client
    pub fn new(llm: SharedLlmClient) -> Self {
        Self {
            llm,
            corrections: AtomicU64::new(0),
            failures: AtomicU64::new(0),
        }
    }

    /// Create a service using the factory's default provider
    pub fn from_factory(factory: &AiClientFactory) -> Result<Self> {
        Ok(Self::new(factory.get_client(None)?))
    }

    /// Create the offline stand-in backed by [`MockLlmClient`]
    pub fn mock() -> Self {
        Self::new(Arc::new(MockLlmClient::new()))
    }

    /// True when results come from the mock client
    pub fn is_degraded(&self) -> bool {
        self.llm.provider_name() == PROVIDER_MOCK
    }

    /// Name of the provider grading essays
    pub fn provider(&self) -> &str {
        self.llm.provider_name()
    }

    /// Grade one essay
    pub async fn correct(&self, request: &EssayRequest) -> Result<CorrectionResult> {
        if request.content.trim().is_empty() {
            return Err(Error::invalid_argument("essay content is empty"));
        }

        let user_prompt = build_user_prompt(request);
        let outcome = async {
            let reply = self.llm.complete(SYSTEM_PROMPT, &user_prompt).await?;
            parse_grading(&reply, self.llm.provider_name())
        }
        .await;

        match outcome {
            Ok(block) => {
                self.corrections.fetch_add(1, Ordering::Relaxed);
                info!(
                    provider = %self.llm.provider_name(),
                    score = block.score,
                    chars = request.char_count(),
                    "Essay corrected"
                );
                Ok(CorrectionResult {
                    score: block.score.clamp(0.0, ESSAY_MAX_SCORE),
                    summary: block.summary,
                    suggestions: block.suggestions,
                    provider: self.llm.provider_name().to_string(),
                    degraded: self.is_degraded(),
                })
            }
            Err(e) => {
                self.failures.fetch_add(1, Ordering::Relaxed);
                warn!(provider = %self.llm.provider_name(), error = %e, "Essay correction failed");
                Err(e)
            }
        }
    }
}

fn build_user_prompt(request: &EssayRequest) -> String {
    let mut prompt = format!("Title: {}\n", request.title);
    if let Some(grade) = &request.grade_level {
        prompt.push_str(&format!("Grade level: {grade}\n"));
    }
    prompt.push_str(&format!(
        "Length: {} characters\n\n{}",
        request.char_count(),
        request.content
    ));
    prompt
}

/// Extract the first `{...}` block from a completion and decode it
fn parse_grading(reply: &str, provider: &str) -> Result<GradingBlock> {
    let start = reply.find('{');
    let end = reply.rfind('}');
    let json = match (start, end) {
        (Some(start), Some(end)) if end > start => &reply[start..=end],
        _ => {
            return Err(Error::llm(provider, "reply contains no JSON grading block"));
        }
    };
    serde_json::from_str(json)
        .map_err(|e| Error::llm(provider, format!("invalid grading block: {e}")))
}

#[async_trait]
impl HealthCheckable for CorrectionService {
    async fn health_check(&self) -> bool {
        !self.is_degraded()
    }
}

impl MetricsSource for CorrectionService {
    fn metrics(&self) -> Result<serde_json::Value> {
        Ok(serde_json::json!({
            "provider": self.llm.provider_name(),
            "model": self.llm.model(),
            "degraded": self.is_degraded(),
            "corrections": self.corrections.load(Ordering::Relaxed),
            "failures": self.failures.load(Ordering::Relaxed),
        }))
    }
}

impl ManagedService for CorrectionService {
    fn as_health_checkable(&self) -> Option<&dyn HealthCheckable> {
        Some(self)
    }

    fn as_metrics_source(&self) -> Option<&dyn MetricsSource> {
        Some(self)
    }
}
