//! Unit tests for domain error types

use grader_domain::Error;

#[test]
fn test_not_found_error() {
    let error = Error::not_found("service:redis");
    match error {
        Error::NotFound { resource } => assert_eq!(resource, "service:redis"),
        _ => panic!("Expected NotFound error"),
    }
}

#[test]
fn test_circular_dependency_display() {
    let error = Error::circular_dependency(vec![
        "X".to_string(),
        "Y".to_string(),
        "X".to_string(),
    ]);
    assert_eq!(error.to_string(), "Circular dependency detected: X -> Y -> X");
    assert!(error.is_structural());
}

#[test]
fn test_service_unavailable_is_not_structural() {
    let error = Error::service_unavailable("redis", "connection refused");
    assert!(!error.is_structural());
    assert!(error.to_string().contains("redis"));
    assert!(error.to_string().contains("connection refused"));
}

#[test]
fn test_config_error_with_source() {
    let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
    let error = Error::config_with_source("cannot read grader.toml", io);
    match &error {
        Error::Configuration { message, source } => {
            assert_eq!(message, "cannot read grader.toml");
            assert!(source.is_some());
        }
        _ => panic!("Expected Configuration error"),
    }
}

#[test]
fn test_llm_error() {
    let error = Error::llm("deepseek", "rate limited");
    assert_eq!(error.to_string(), "LLM provider 'deepseek' error: rate limited");
}

#[test]
fn test_from_string() {
    let error: Error = "boom".into();
    assert!(matches!(error, Error::String(ref s) if s == "boom"));
}
