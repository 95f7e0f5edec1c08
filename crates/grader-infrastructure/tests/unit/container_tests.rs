//! Unit tests for the service container

use async_trait::async_trait;
use grader_domain::error::{Error, Result};
use grader_domain::ports::{HealthCheckable, ManagedService, SharedService};
use grader_domain::ServiceState;
use grader_infrastructure::config::{AppConfig, ConfigBuilder, RecoveryConfig};
use grader_infrastructure::services::{ServiceBootstrap, ServiceContainer, ServiceEntry};
use std::sync::Arc;

struct Probe {
    label: &'static str,
}

#[async_trait]
impl HealthCheckable for Probe {
    async fn health_check(&self) -> bool {
        true
    }
}

impl ManagedService for Probe {
    fn as_health_checkable(&self) -> Option<&dyn HealthCheckable> {
        Some(self)
    }
}

struct Other;
impl ManagedService for Other {}

struct RejectsRegistration;
impl ManagedService for RejectsRegistration {
    fn on_register(&self) -> Result<()> {
        Err(Error::internal("registration hook failed"))
    }
}

fn probe(label: &'static str) -> Arc<Probe> {
    Arc::new(Probe { label })
}

/// Config with the recovery loop switched off
fn quiet_config() -> AppConfig {
    ConfigBuilder::new()
        .with_recovery(RecoveryConfig {
            enabled: false,
            ..RecoveryConfig::default()
        })
        .build()
}

fn container() -> ServiceContainer {
    ServiceContainer::empty(quiet_config())
}

// ============================================================================
// Registration
// ============================================================================

#[test]
fn test_register_marks_ready() {
    let container = container();
    container.register("svc", probe("real")).expect("register");

    assert_eq!(container.tracker().state("svc"), Some(ServiceState::Ready));
    assert!(container.is_registered("svc"));
    assert!(container.has("svc"));
}

#[test]
fn test_failed_registration_hook_marks_error() {
    let container = container();
    let result = container.register("svc", Arc::new(RejectsRegistration));

    assert!(matches!(result, Err(Error::Internal { .. })));
    assert!(!container.is_registered("svc"));
    let descriptor = container.tracker().descriptor("svc").expect("descriptor");
    assert_eq!(descriptor.state, ServiceState::Error);
    assert_eq!(descriptor.error_count, 1);
}

#[test]
fn test_registered_names_are_sorted() {
    let container = container();
    container.register("zeta", Arc::new(Other)).expect("register");
    container.register("alpha", Arc::new(Other)).expect("register");
    assert_eq!(container.registered_names(), vec!["alpha", "zeta"]);
}

#[test]
fn test_reregistering_replaces_instance() {
    let container = container();
    let first: SharedService = probe("first");
    let second: SharedService = probe("second");
    container.register("svc", Arc::clone(&first)).expect("register");
    container.register("svc", Arc::clone(&second)).expect("register");

    let served = container.get("svc").expect("served");
    assert!(Arc::ptr_eq(&served, &second));
}

// ============================================================================
// Readiness
// ============================================================================

#[test]
fn test_has_requires_ready_dependencies() {
    let container = container();
    container.declare_dependencies("app", &["db"]);
    container.register("app", probe("app")).expect("register");

    assert!(!container.has("app"));
    assert!(container.get("app").is_none());

    container.register("db", probe("db")).expect("register");
    assert!(container.has("app"));
}

#[test]
fn test_has_is_false_for_unknown_service() {
    let container = container();
    assert!(!container.has("ghost"));
    assert!(container.get("ghost").is_none());
}

#[test]
fn test_has_is_false_when_ready_without_instance() {
    let container = container();
    container
        .tracker()
        .update_service_state("svc", ServiceState::Ready, None);
    assert!(!container.has("svc"));
}

#[test]
fn test_degraded_dependency_with_fallback_satisfies_readiness() {
    let container = container();
    container.declare_dependencies("app", &["db"]);
    container.register_fallback("db", probe("db-fallback"));
    container.register("app", probe("app")).expect("register");

    // Serving the fallback degrades db
    assert!(container.get("db").is_some());
    assert_eq!(container.tracker().state("db"), Some(ServiceState::Degraded));
    assert!(container.has("app"));
}

#[test]
fn test_degraded_dependency_without_fallback_blocks_readiness() {
    let container = container();
    container.declare_dependencies("app", &["db"]);
    container.register("app", probe("app")).expect("register");
    container
        .tracker()
        .update_service_state("db", ServiceState::Degraded, None);
    assert!(!container.has("app"));
}

// ============================================================================
// Fallback substitution
// ============================================================================

#[test]
fn test_get_serves_fallback_and_degrades() {
    let container = container();
    let fallback: SharedService = probe("fallback");
    container.register_fallback("svc", Arc::clone(&fallback));

    let served = container.get("svc").expect("fallback served");
    assert!(Arc::ptr_eq(&served, &fallback));
    assert_eq!(container.tracker().state("svc"), Some(ServiceState::Degraded));

    let status = container.fallbacks().recovery_status();
    assert_eq!(
        status["svc"].degraded_reason.as_deref(),
        Some("service is unregistered")
    );
}

#[test]
fn test_get_prefers_ready_instance_over_fallback() {
    let container = container();
    let real: SharedService = probe("real");
    container.register_fallback("svc", probe("fallback"));
    container.register("svc", Arc::clone(&real)).expect("register");

    let served = container.get("svc").expect("served");
    assert!(Arc::ptr_eq(&served, &real));
    assert_eq!(container.tracker().state("svc"), Some(ServiceState::Ready));
}

#[test]
fn test_fallback_reason_names_unready_dependency() {
    let container = container();
    container.declare_dependencies("app", &["db"]);
    container.register("app", probe("app")).expect("register");
    container.register_fallback("app", probe("app-fallback"));
    container
        .tracker()
        .update_service_state("db", ServiceState::Error, Some("refused"));

    let served = container.get_as::<Probe>("app").expect("fallback");
    assert_eq!(served.label, "app-fallback");
    let status = container.fallbacks().recovery_status();
    assert_eq!(
        status["app"].degraded_reason.as_deref(),
        Some("dependency 'db' is error")
    );
}

#[test]
fn test_registering_real_instance_ends_degradation() {
    let container = container();
    container.register_fallback("svc", probe("fallback"));
    container.get("svc");
    assert_eq!(container.tracker().state("svc"), Some(ServiceState::Degraded));

    container.register("svc", probe("real")).expect("register");
    assert_eq!(container.tracker().state("svc"), Some(ServiceState::Ready));
    assert_eq!(container.get_as::<Probe>("svc").expect("real").label, "real");
}

// ============================================================================
// Typed access
// ============================================================================

#[test]
fn test_get_as_downcasts() {
    let container = container();
    container.register("svc", probe("typed")).expect("register");

    assert_eq!(container.get_as::<Probe>("svc").expect("probe").label, "typed");
    assert!(container.get_as::<Other>("svc").is_none());
}

#[test]
fn test_require_reports_unavailable() {
    let container = container();
    container.declare_dependencies("app", &["db"]);
    container.register("app", probe("app")).expect("register");

    match container.require::<Probe>("app") {
        Err(Error::ServiceUnavailable { service, message }) => {
            assert_eq!(service, "app");
            assert_eq!(message, "dependency 'db' is unregistered");
        }
        other => panic!("expected unavailable, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_require_reports_type_mismatch() {
    let container = container();
    container.register("svc", Arc::new(Other)).expect("register");
    let result = container.require::<Probe>("svc");
    assert!(matches!(result, Err(Error::TypeMismatch { .. })));
}

// ============================================================================
// Lifecycle
// ============================================================================

#[tokio::test]
async fn test_initialize_runs_once() {
    let bootstrap = ServiceBootstrap::empty()
        .with_service(ServiceEntry::new("svc", |_, _| Ok(Arc::new(Other) as SharedService)));
    let container = Arc::new(ServiceContainer::with_bootstrap(quiet_config(), bootstrap));
    assert!(!container.is_initialized().await);

    let first = container.initialize().await.expect("initialize");
    assert_eq!(first.initialized, vec!["svc"]);
    assert!(container.is_initialized().await);

    let second = container.initialize().await.expect("initialize");
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_initialize_reports_cycle_every_time() {
    let bootstrap = ServiceBootstrap::empty()
        .with_service(ServiceEntry::new("X", |_, _| Ok(Arc::new(Other) as SharedService)).depends_on(&["Y"]))
        .with_service(ServiceEntry::new("Y", |_, _| Ok(Arc::new(Other) as SharedService)).depends_on(&["X"]));
    let container = Arc::new(ServiceContainer::with_bootstrap(quiet_config(), bootstrap));

    for _ in 0..2 {
        match container.initialize().await {
            Err(Error::CircularDependency { cycle }) => assert_eq!(cycle, vec!["X", "Y", "X"]),
            other => panic!("expected cycle, got {:?}", other.map(|r| r.order)),
        }
    }
    assert!(container.is_initialized().await);

    let report = container.bootstrap_report().await.expect("stored report");
    assert!(report.critical_only);
    assert_eq!(report.cycle, Some(vec!["X".to_string(), "Y".to_string(), "X".to_string()]));
}

#[tokio::test]
async fn test_bootstrap_report_cleared_by_reset() {
    let container = Arc::new(ServiceContainer::empty(quiet_config()));
    assert!(container.bootstrap_report().await.is_none());

    let report = container.initialize().await.expect("initialize");
    assert_eq!(container.bootstrap_report().await, Some(report));

    container.reset().await;
    assert!(container.bootstrap_report().await.is_none());
}

#[tokio::test]
async fn test_reset_clears_everything() {
    let container = Arc::new(ServiceContainer::empty(AppConfig::default()));
    container.declare_dependencies("app", &["db"]);
    container.register("db", probe("db")).expect("register");
    container.register("app", probe("app")).expect("register");
    container.register_fallback("cache", probe("cache-fallback"));
    container.get("cache");
    assert!(container.fallbacks().is_recovery_running());
    container.initialize().await.expect("initialize");

    container.reset().await;

    assert!(!container.has("app"));
    assert!(!container.has("db"));
    assert!(container.registered_names().is_empty());
    assert!(container.get("cache").is_none());
    assert!(!container.fallbacks().is_recovery_running());
    assert!(!container.is_initialized().await);
    assert!(
        container
            .states()
            .values()
            .all(|s| s.status == ServiceState::Stopped)
    );
}
