//! Unit tests for service lifecycle value objects

use grader_domain::value_objects::{ServiceHealth, ServiceStatusSnapshot};
use grader_domain::{ServiceDescriptor, ServiceState};

#[test]
fn test_default_state_is_unregistered() {
    assert_eq!(ServiceState::default(), ServiceState::Unregistered);
}

#[test]
fn test_state_serialization_is_snake_case() {
    let json = serde_json::to_string(&ServiceState::Degraded).expect("serialization failed");
    assert_eq!(json, "\"degraded\"");

    let state: ServiceState = serde_json::from_str("\"stopping\"").expect("deserialization failed");
    assert_eq!(state, ServiceState::Stopping);
}

#[test]
fn test_state_display_matches_serialized_form() {
    for state in [
        ServiceState::Unregistered,
        ServiceState::Registering,
        ServiceState::Initializing,
        ServiceState::Ready,
        ServiceState::Degraded,
        ServiceState::Error,
        ServiceState::Stopping,
        ServiceState::Stopped,
    ] {
        let json = serde_json::to_string(&state).expect("serialization failed");
        assert_eq!(json, format!("\"{}\"", state));
    }
}

#[test]
fn test_serving_states() {
    assert!(ServiceState::Ready.is_ready());
    assert!(ServiceState::Ready.is_serving());
    assert!(ServiceState::Degraded.is_serving());
    assert!(!ServiceState::Degraded.is_ready());
    assert!(!ServiceState::Error.is_serving());
}

#[test]
fn test_new_descriptor() {
    let descriptor = ServiceDescriptor::new("redis");
    assert_eq!(descriptor.name, "redis");
    assert_eq!(descriptor.state, ServiceState::Unregistered);
    assert!(descriptor.dependencies.is_empty());
    assert!(descriptor.dependents.is_empty());
    assert_eq!(descriptor.error_count, 0);
    assert!(descriptor.last_error.is_none());
}

#[test]
fn test_descriptor_snapshot() {
    let mut descriptor = ServiceDescriptor::new("correction_service");
    descriptor.dependencies.insert("ai_client_factory".to_string());
    descriptor.state = ServiceState::Error;
    descriptor.error_count = 2;
    descriptor.last_error = Some("timeout".to_string());

    let snapshot: ServiceStatusSnapshot = descriptor.snapshot();
    assert_eq!(snapshot.status, ServiceState::Error);
    assert_eq!(snapshot.dependencies, vec!["ai_client_factory"]);
    assert!(snapshot.dependents.is_empty());
    assert_eq!(snapshot.error_count, 2);

    let json = serde_json::to_value(&snapshot).expect("serialization failed");
    assert_eq!(json["status"], "error");
    assert_eq!(json["last_error"], "timeout");
}

#[test]
fn test_service_health_from_check() {
    assert_eq!(ServiceHealth::from_check(true), ServiceHealth::Healthy);
    assert_eq!(ServiceHealth::from_check(false), ServiceHealth::Unhealthy);
    assert_eq!(
        serde_json::to_string(&ServiceHealth::Unhealthy).expect("serialization failed"),
        "\"unhealthy\""
    );
}
