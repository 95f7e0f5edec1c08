//! Tests for the correction service

use std::sync::Arc;

use async_trait::async_trait;
use grader_domain::Result;
use grader_domain::ports::LlmClient;
use grader_domain::value_objects::EssayRequest;
use grader_providers::{CorrectionService, MetricsSource};

struct ScriptedClient {
    reply: String,
}

#[async_trait]
impl LlmClient for ScriptedClient {
    async fn complete(&self, _system_prompt: &str, _user_prompt: &str) -> Result<String> {
        Ok(self.reply.clone())
    }

    fn provider_name(&self) -> &str {
        "openai"
    }

    fn model(&self) -> &str {
        "gpt-4o-mini"
    }
}

fn essay() -> EssayRequest {
    EssayRequest::new("我的家乡", "我的家乡在江南，那里有小桥流水。")
}

#[tokio::test]
async fn test_mock_correction_is_degraded() {
    let service = CorrectionService::mock();
    assert!(service.is_degraded());

    let result = service.correct(&essay()).await.expect("correction");
    assert!(result.degraded);
    assert_eq!(result.provider, "mock");
    assert_eq!(result.score, 60.0);
}

#[tokio::test]
async fn test_real_provider_result() {
    let service = CorrectionService::new(Arc::new(ScriptedClient {
        reply: r#"{"score": 92, "summary": "生动", "suggestions": ["结尾再点题"]}"#.to_string(),
    }));

    let result = service.correct(&essay()).await.expect("correction");
    assert!(!result.degraded);
    assert_eq!(result.score, 92.0);
    assert_eq!(result.suggestions.len(), 1);
}

#[tokio::test]
async fn test_score_is_clamped() {
    let service = CorrectionService::new(Arc::new(ScriptedClient {
        reply: r#"{"score": 140}"#.to_string(),
    }));
    let result = service.correct(&essay()).await.expect("correction");
    assert_eq!(result.score, 100.0);
}

#[tokio::test]
async fn test_empty_essay_is_rejected() {
    let service = CorrectionService::mock();
    let result = service.correct(&EssayRequest::new("t", "   ")).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_failures_are_counted() {
    let service = CorrectionService::new(Arc::new(ScriptedClient {
        reply: "I cannot grade this".to_string(),
    }));
    assert!(service.correct(&essay()).await.is_err());

    let metrics = service.metrics().expect("metrics");
    assert_eq!(metrics["failures"], 1);
    assert_eq!(metrics["corrections"], 0);
}
