//! Service bootstrap
//!
//! Static table of the application's services: name, dependencies,
//! initializer and optional fallback. [`ServiceBootstrap::standard`] wires
//! the five well-known services:
//!
//! | Service | Depends on | Fallback |
//! |---------|------------|----------|
//! | `redis` | - | - |
//! | `ai_client_factory` | - | mock-only factory |
//! | `source_type_manager` | - | - |
//! | `correction_service` | `ai_client_factory` | mock correction |
//! | `notification_service` | `redis` | - |

use std::collections::BTreeMap;
use std::sync::{Arc, Weak};
use std::time::Duration;

use async_trait::async_trait;
use grader_domain::constants::{
    CRITICAL_SERVICES, SERVICE_AI_CLIENT_FACTORY, SERVICE_CORRECTION, SERVICE_NOTIFICATION,
    SERVICE_REDIS, SERVICE_SOURCE_TYPE_MANAGER,
};
use grader_domain::error::{Error, Result};
use grader_domain::ports::{RecoveryHandler, RecoveryParams, SharedService};
use grader_domain::ServiceState;
use grader_providers::{
    AiClientFactory, CorrectionService, NotificationService, RedisService, SourceTypeManager,
};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use super::container::ServiceContainer;
use crate::config::AppConfig;
use crate::utils::TimedOperation;

/// Builds a service instance; `Err` marks the service failed
pub type Initializer =
    Arc<dyn Fn(&AppConfig, &ServiceContainer) -> Result<SharedService> + Send + Sync>;

/// Builds a fallback instance
pub type FallbackFactory = Arc<dyn Fn() -> SharedService + Send + Sync>;

/// One row of the bootstrap table
#[derive(Clone)]
pub struct ServiceEntry {
    name: String,
    dependencies: Vec<String>,
    initializer: Initializer,
    fallback: Option<FallbackFactory>,
    recoverable: bool,
}

impl ServiceEntry {
    /// Entry with no dependencies and no fallback
    pub fn new<N, F>(name: N, initializer: F) -> Self
    where
        N: Into<String>,
        F: Fn(&AppConfig, &ServiceContainer) -> Result<SharedService> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            dependencies: Vec::new(),
            initializer: Arc::new(initializer),
            fallback: None,
            recoverable: false,
        }
    }

    /// Declare dependencies
    pub fn depends_on(mut self, dependencies: &[&str]) -> Self {
        self.dependencies
            .extend(dependencies.iter().map(|d| (*d).to_string()));
        self
    }

    /// Register a fallback built by `factory`
    pub fn with_fallback<F>(mut self, factory: F) -> Self
    where
        F: Fn() -> SharedService + Send + Sync + 'static,
    {
        self.fallback = Some(Arc::new(factory));
        self
    }

    /// Retry the initializer from the recovery loop while degraded
    pub fn recoverable(mut self) -> Self {
        self.recoverable = true;
        self
    }

    /// Service name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared dependencies
    pub fn dependencies(&self) -> &[String] {
        &self.dependencies
    }
}

/// Outcome of a bootstrap run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BootstrapReport {
    /// Order the services were visited in
    pub order: Vec<String>,
    /// Services whose initializer succeeded
    pub initialized: Vec<String>,
    /// Services that were already registered
    pub skipped: Vec<String>,
    /// Failed services and their error messages
    pub failed: BTreeMap<String, String>,
    /// True when only the critical services were attempted
    pub critical_only: bool,
    /// Cycle that prevented ordered initialization
    pub cycle: Option<Vec<String>>,
    /// Wall time in milliseconds
    pub duration_ms: u64,
}

impl BootstrapReport {
    /// True when every service initialized or was already present
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty() && !self.critical_only
    }
}

/// Recovery handler that re-runs a service's initializer
struct ReinitializeHandler {
    name: String,
    initializer: Initializer,
    container: Weak<ServiceContainer>,
}

#[async_trait]
impl RecoveryHandler for ReinitializeHandler {
    async fn recover(&self, _params: &RecoveryParams) -> Result<bool> {
        let container = self
            .container
            .upgrade()
            .ok_or_else(|| Error::internal("service container dropped"))?;
        let instance = (self.initializer)(container.config(), container.as_ref())?;
        container.register(&self.name, instance)?;
        Ok(true)
    }
}

/// Static initializer table
#[derive(Clone, Default)]
pub struct ServiceBootstrap {
    entries: Vec<ServiceEntry>,
}

impl ServiceBootstrap {
    /// Table with no entries
    pub fn empty() -> Self {
        Self::default()
    }

    /// Table with the application's well-known services
    pub fn standard() -> Self {
        Self::empty()
            .with_service(ServiceEntry::new(SERVICE_REDIS, init_redis))
            .with_service(
                ServiceEntry::new(SERVICE_AI_CLIENT_FACTORY, init_ai_client_factory)
                    .with_fallback(|| Arc::new(AiClientFactory::mock_only()))
                    .recoverable(),
            )
            .with_service(ServiceEntry::new(
                SERVICE_SOURCE_TYPE_MANAGER,
                init_source_type_manager,
            ))
            .with_service(
                ServiceEntry::new(SERVICE_CORRECTION, init_correction_service)
                    .depends_on(&[SERVICE_AI_CLIENT_FACTORY])
                    .with_fallback(|| Arc::new(CorrectionService::mock()))
                    .recoverable(),
            )
            .with_service(
                ServiceEntry::new(SERVICE_NOTIFICATION, init_notification_service)
                    .depends_on(&[SERVICE_REDIS]),
            )
    }

    /// Add or replace an entry
    pub fn with_service(mut self, entry: ServiceEntry) -> Self {
        self.entries.retain(|e| e.name != entry.name);
        self.entries.push(entry);
        self
    }

    /// Entry for a service
    pub fn entry(&self, name: &str) -> Option<&ServiceEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    /// Entries in table order
    pub fn entries(&self) -> &[ServiceEntry] {
        &self.entries
    }

    /// Declare edges, register fallbacks and recovery handlers
    fn prepare(&self, container: &Arc<ServiceContainer>) {
        for entry in &self.entries {
            let dependencies: Vec<&str> = entry.dependencies.iter().map(String::as_str).collect();
            container.declare_dependencies(&entry.name, &dependencies);

            if let Some(factory) = &entry.fallback {
                container.register_fallback(&entry.name, factory());
            }
            if entry.recoverable {
                container.register_recovery_handler(
                    &entry.name,
                    Arc::new(ReinitializeHandler {
                        name: entry.name.clone(),
                        initializer: Arc::clone(&entry.initializer),
                        container: Arc::downgrade(container),
                    }),
                    RecoveryParams::new(),
                );
            }
        }
    }

    /// Initialize every service in dependency order
    ///
    /// A failing initializer marks its service `error` and the pass
    /// continues. If no order can be computed, only the critical services
    /// are initialized and the cycle is recorded in the report.
    pub fn initialize_services(&self, container: &Arc<ServiceContainer>) -> BootstrapReport {
        let timer = TimedOperation::start();
        self.prepare(container);

        let mut report = BootstrapReport::default();
        match container.graph().calculate_initialization_order() {
            Ok(order) => {
                for name in &order {
                    self.initialize_one(container, name, &mut report);
                }
                report.order = order;
            }
            Err(e) => {
                error!(error = %e, "Ordered initialization failed, starting critical services only");
                if let Error::CircularDependency { cycle } = &e {
                    report.cycle = Some(cycle.clone());
                }
                report.critical_only = true;
                for name in CRITICAL_SERVICES {
                    self.initialize_one(container, name, &mut report);
                    report.order.push(name.to_string());
                }
            }
        }

        report.duration_ms = timer.elapsed_ms();
        info!(
            initialized = report.initialized.len(),
            skipped = report.skipped.len(),
            failed = report.failed.len(),
            critical_only = report.critical_only,
            duration_ms = report.duration_ms,
            "Service bootstrap finished"
        );
        report
    }

    fn initialize_one(
        &self,
        container: &ServiceContainer,
        name: &str,
        report: &mut BootstrapReport,
    ) {
        if container.is_registered(name) {
            report.skipped.push(name.to_string());
            return;
        }
        let Some(entry) = self.entry(name) else {
            // Known only as someone's dependency
            let message = "no initializer registered".to_string();
            container
                .tracker()
                .update_service_state(name, ServiceState::Error, Some(&message));
            report.failed.insert(name.to_string(), message);
            return;
        };

        container
            .tracker()
            .update_service_state(name, ServiceState::Initializing, None);
        let result = (entry.initializer)(container.config(), container)
            .and_then(|instance| container.register(name, instance));

        match result {
            Ok(()) => report.initialized.push(name.to_string()),
            Err(e) => {
                let message = e.to_string();
                if container.tracker().state(name) != Some(ServiceState::Error) {
                    container
                        .tracker()
                        .update_service_state(name, ServiceState::Error, Some(&message));
                }
                warn!(service = %name, error = %message, "Service initialization failed");
                report.failed.insert(name.to_string(), message);
            }
        }
    }
}

fn init_redis(config: &AppConfig, _container: &ServiceContainer) -> Result<SharedService> {
    let redis = RedisService::new(&config.services.redis.url)?
        .with_ping_timeout(Duration::from_millis(config.services.redis.ping_timeout_ms));
    Ok(Arc::new(redis))
}

fn init_ai_client_factory(
    config: &AppConfig,
    _container: &ServiceContainer,
) -> Result<SharedService> {
    let factory = AiClientFactory::new(config.ai.providers.clone(), &config.ai.default_provider)?;
    Ok(Arc::new(factory))
}

fn init_source_type_manager(
    config: &AppConfig,
    _container: &ServiceContainer,
) -> Result<SharedService> {
    Ok(Arc::new(SourceTypeManager::new(
        &config.services.source_types,
    )?))
}

fn init_correction_service(
    _config: &AppConfig,
    container: &ServiceContainer,
) -> Result<SharedService> {
    // A mock-only factory served as fallback must not produce a "ready" service
    if !container.has(SERVICE_AI_CLIENT_FACTORY) {
        return Err(Error::service_unavailable(
            SERVICE_CORRECTION,
            "dependency ai_client_factory is not ready",
        ));
    }
    let factory = container.require::<AiClientFactory>(SERVICE_AI_CLIENT_FACTORY)?;
    Ok(Arc::new(CorrectionService::from_factory(&factory)?))
}

fn init_notification_service(
    config: &AppConfig,
    container: &ServiceContainer,
) -> Result<SharedService> {
    if !container.has(SERVICE_REDIS) {
        return Err(Error::service_unavailable(
            SERVICE_NOTIFICATION,
            "dependency redis is not ready",
        ));
    }
    let redis = container.require::<RedisService>(SERVICE_REDIS)?;
    Ok(Arc::new(NotificationService::new(
        redis,
        config.services.notification.channel.clone(),
    )))
}
