//! Tests for the AI client factory

use std::collections::BTreeMap;

use grader_domain::Error;
use grader_providers::{AiClientFactory, LlmClientSettings, MetricsSource};

fn settings_with_key(provider: &str) -> BTreeMap<String, LlmClientSettings> {
    let mut settings = BTreeMap::new();
    settings.insert(
        provider.to_string(),
        LlmClientSettings {
            api_key: Some("sk-test".to_string()),
            ..Default::default()
        },
    );
    settings
}

#[test]
fn test_factory_requires_an_api_key() {
    let result = AiClientFactory::new(BTreeMap::new(), "deepseek");
    assert!(matches!(result, Err(Error::ServiceUnavailable { .. })));
}

#[test]
fn test_factory_rejects_unknown_default_provider() {
    let result = AiClientFactory::new(settings_with_key("openai"), "gemini");
    assert!(matches!(result, Err(Error::Configuration { .. })));
}

#[test]
fn test_mock_default_needs_no_keys() {
    let factory = AiClientFactory::new(BTreeMap::new(), "mock").expect("factory");
    let client = factory.get_client(None).expect("client");
    assert_eq!(client.provider_name(), "mock");
}

#[test]
fn test_get_client_uses_provider_defaults() {
    let factory = AiClientFactory::new(settings_with_key("deepseek"), "deepseek").expect("factory");
    let client = factory.get_client(None).expect("client");
    assert_eq!(client.provider_name(), "deepseek");
    assert_eq!(client.model(), "deepseek-chat");
}

#[test]
fn test_get_client_honors_model_override() {
    let mut settings = settings_with_key("qianwen");
    if let Some(qianwen) = settings.get_mut("qianwen") {
        qianwen.model = Some("qwen-max".to_string());
    }
    let factory = AiClientFactory::new(settings, "qianwen").expect("factory");
    let client = factory.get_client(Some("qianwen")).expect("client");
    assert_eq!(client.model(), "qwen-max");
}

#[test]
fn test_unconfigured_provider_is_unavailable() {
    let factory = AiClientFactory::new(settings_with_key("openai"), "openai").expect("factory");
    assert!(factory.get_client(Some("deepseek")).is_err());
    assert!(matches!(
        factory.get_client(Some("unknown")),
        Err(Error::NotFound { .. })
    ));
}

#[test]
fn test_clients_are_cached() {
    let factory = AiClientFactory::new(settings_with_key("openai"), "openai").expect("factory");
    let first = factory.get_client(None).expect("client");
    let second = factory.get_client(Some("openai")).expect("client");
    assert!(std::sync::Arc::ptr_eq(&first, &second));

    let metrics = factory.metrics().expect("metrics");
    assert_eq!(metrics["clients_created"], 1);
}

#[test]
fn test_available_providers_lists_mock_last() {
    let factory = AiClientFactory::new(settings_with_key("openai"), "openai").expect("factory");
    assert_eq!(factory.available_providers(), vec!["openai", "mock"]);
}

#[test]
fn test_mock_only_factory_ignores_requested_provider() {
    let factory = AiClientFactory::mock_only();
    assert!(factory.is_mock_only());
    let client = factory.get_client(Some("openai")).expect("client");
    assert_eq!(client.provider_name(), "mock");
    assert_eq!(factory.available_providers(), vec!["mock"]);
}
