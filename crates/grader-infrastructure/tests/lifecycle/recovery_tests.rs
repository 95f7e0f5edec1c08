//! Recovery loop driven through the container

use grader_domain::error::Error;
use async_trait::async_trait;
use grader_domain::ports::{
    ManagedService, RecoveryHandler, RecoveryParams, SharedService, recovery_fn,
};
use grader_domain::ServiceState;
use grader_infrastructure::config::{ConfigBuilder, RecoveryConfig};
use grader_infrastructure::services::{RecoveryStatus, ServiceBootstrap, ServiceContainer, ServiceEntry};
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

struct Backend(&'static str);
impl ManagedService for Backend {}

fn fast_recovery() -> RecoveryConfig {
    RecoveryConfig {
        enabled: true,
        check_interval_secs: 5,
        max_attempts: 4,
        base_delay_ms: 5_000,
        max_delay_ms: 20_000,
        backoff_multiplier: 2.0,
    }
}

#[tokio::test(start_paused = true)]
async fn test_degraded_service_is_restored_by_reinitializing() {
    let online = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&online);
    let bootstrap = ServiceBootstrap::empty().with_service(
        ServiceEntry::new("backend", move |_, _| {
            if flag.load(Ordering::SeqCst) {
                Ok(Arc::new(Backend("primary")) as SharedService)
            } else {
                Err(Error::network("connection refused"))
            }
        })
        .with_fallback(|| Arc::new(Backend("standby")))
        .recoverable(),
    );
    let config = ConfigBuilder::new().with_recovery(fast_recovery()).build();
    let container = Arc::new(ServiceContainer::with_bootstrap(config, bootstrap));

    let report = container.initialize().await.expect("initialize");
    assert!(report.failed.contains_key("backend"));

    assert_eq!(container.get_as::<Backend>("backend").expect("standby").0, "standby");
    assert!(container.fallbacks().is_recovery_running());

    // First tick fails while the backend is still offline
    tokio::time::sleep(Duration::from_secs(6)).await;
    assert_eq!(container.tracker().state("backend"), Some(ServiceState::Degraded));
    assert_eq!(container.fallbacks().recovery_status()["backend"].attempts, 1);

    online.store(true, Ordering::SeqCst);
    tokio::time::sleep(Duration::from_secs(5)).await;
    assert_eq!(container.tracker().state("backend"), Some(ServiceState::Ready));
    assert_eq!(container.get_as::<Backend>("backend").expect("primary").0, "primary");
    assert_eq!(
        container.fallbacks().recovery_status()["backend"].status,
        RecoveryStatus::Healthy
    );

    container.reset().await;
    assert!(!container.fallbacks().is_recovery_running());
}

#[tokio::test(start_paused = true)]
async fn test_exhausted_service_ends_in_error_but_keeps_fallback() {
    let container = Arc::new(ServiceContainer::empty(
        ConfigBuilder::new().with_recovery(fast_recovery()).build(),
    ));
    let calls = Arc::new(AtomicU32::new(0));
    let counter = Arc::clone(&calls);
    container.register_fallback("search", Arc::new(Backend("cached")));
    container.register_recovery_handler(
        "search",
        recovery_fn(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(false)
        }),
        RecoveryParams::new(),
    );

    assert!(container.get("search").is_some());

    // Ticks every 5s; backoff 5s, 10s, 20s between attempts
    tokio::time::sleep(Duration::from_secs(120)).await;
    assert_eq!(calls.load(Ordering::SeqCst), 4);
    let descriptor = container.tracker().descriptor("search").expect("descriptor");
    assert_eq!(descriptor.state, ServiceState::Error);
    assert!(
        descriptor
            .last_error
            .expect("error")
            .starts_with("recovery exhausted after 4 attempts")
    );

    // The fallback is still served; the service stays failed and is not retried
    assert_eq!(container.get_as::<Backend>("search").expect("fallback").0, "cached");
    assert_eq!(container.tracker().state("search"), Some(ServiceState::Error));
    assert_eq!(
        container.fallbacks().recovery_status()["search"].status,
        RecoveryStatus::Exhausted
    );
    tokio::time::sleep(Duration::from_secs(120)).await;
    assert_eq!(calls.load(Ordering::SeqCst), 4);
    assert_eq!(container.tracker().state("search"), Some(ServiceState::Error));

    container.reset().await;
}

/// Handler that takes a second to bring the service back, then registers it
struct SlowRestart {
    container: Weak<ServiceContainer>,
}

#[async_trait]
impl RecoveryHandler for SlowRestart {
    async fn recover(&self, _params: &RecoveryParams) -> grader_domain::Result<bool> {
        tokio::time::sleep(Duration::from_secs(1)).await;
        let Some(container) = self.container.upgrade() else {
            return Ok(false);
        };
        container.register("queue", Arc::new(Backend("restarted")))?;
        Ok(true)
    }
}

#[tokio::test(start_paused = true)]
async fn test_reset_waits_for_in_flight_recovery() {
    let container = Arc::new(ServiceContainer::empty(
        ConfigBuilder::new().with_recovery(fast_recovery()).build(),
    ));
    container.register_fallback("queue", Arc::new(Backend("standby")));
    container.register_recovery_handler(
        "queue",
        Arc::new(SlowRestart {
            container: Arc::downgrade(&container),
        }),
        RecoveryParams::new(),
    );
    assert!(container.get("queue").is_some());

    // First tick at 5s; the handler is still sleeping at 5.5s
    tokio::time::sleep(Duration::from_millis(5_500)).await;
    container.reset().await;

    assert!(container.registered_names().is_empty());
    assert_eq!(container.tracker().state("queue"), Some(ServiceState::Stopped));
    assert!(!container.has("queue"));
    assert!(!container.fallbacks().is_recovery_running());
    assert!(container.get("queue").is_none());

    // A fresh registration after reset is not shadowed by the old instance
    container
        .register("queue", Arc::new(Backend("fresh")))
        .expect("register");
    assert_eq!(container.get_as::<Backend>("queue").expect("fresh").0, "fresh");
}
