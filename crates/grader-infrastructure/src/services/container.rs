//! Service container
//!
//! The runtime-facing registry: records live instances, answers readiness
//! questions and substitutes fallbacks when a service is not ready.
//! Containers are ordinary values shared by `Arc`; there is no global
//! instance.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use grader_domain::error::{Error, Result};
use grader_domain::ports::{
    ManagedService, RecoveryParams, SharedRecoveryHandler, SharedService,
};
use grader_domain::value_objects::ServiceStatusSnapshot;
use grader_domain::ServiceState;
use tracing::{debug, info, warn};

use super::bootstrap::{BootstrapReport, ServiceBootstrap};
use super::fallback::FallbackRegistry;
use super::graph::DependencyGraph;
use super::state::ServiceStateTracker;
use crate::config::AppConfig;

/// Registry of live service instances
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use grader_domain::ports::ManagedService;
/// use grader_infrastructure::config::AppConfig;
/// use grader_infrastructure::services::ServiceContainer;
///
/// struct Clock;
/// impl ManagedService for Clock {}
///
/// let container = ServiceContainer::empty(AppConfig::default());
/// container.declare_dependencies("scheduler", &["clock"]);
/// container.register("clock", Arc::new(Clock)).expect("register clock");
///
/// assert!(container.has("clock"));
/// assert!(!container.has("scheduler"));
/// assert!(container.get_as::<Clock>("clock").is_some());
/// ```
pub struct ServiceContainer {
    config: AppConfig,
    tracker: Arc<ServiceStateTracker>,
    graph: DependencyGraph,
    fallbacks: Arc<FallbackRegistry>,
    services: RwLock<HashMap<String, SharedService>>,
    bootstrap: ServiceBootstrap,
    /// Report of the completed bootstrap; `None` until `initialize` runs
    initialized: tokio::sync::Mutex<Option<BootstrapReport>>,
}

impl ServiceContainer {
    /// Container wired with the application's standard services
    pub fn new(config: AppConfig) -> Self {
        let bootstrap = ServiceBootstrap::standard();
        Self::with_bootstrap(config, bootstrap)
    }

    /// Container with no initializers; services are registered by hand
    pub fn empty(config: AppConfig) -> Self {
        Self::with_bootstrap(config, ServiceBootstrap::empty())
    }

    /// Container using a custom initializer table
    pub fn with_bootstrap(config: AppConfig, bootstrap: ServiceBootstrap) -> Self {
        let tracker = Arc::new(ServiceStateTracker::new());
        let fallbacks = Arc::new(FallbackRegistry::new(
            Arc::clone(&tracker),
            config.recovery.clone(),
        ));
        Self {
            graph: DependencyGraph::new(Arc::clone(&tracker)),
            tracker,
            fallbacks,
            services: RwLock::new(HashMap::new()),
            bootstrap,
            initialized: tokio::sync::Mutex::new(None),
            config,
        }
    }

    fn services(&self) -> RwLockReadGuard<'_, HashMap<String, SharedService>> {
        self.services
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn services_mut(&self) -> RwLockWriteGuard<'_, HashMap<String, SharedService>> {
        self.services
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Configuration the container was built with
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Lifecycle tracker
    pub fn tracker(&self) -> &Arc<ServiceStateTracker> {
        &self.tracker
    }

    /// Dependency graph resolver
    pub fn graph(&self) -> &DependencyGraph {
        &self.graph
    }

    /// Fallback registry
    pub fn fallbacks(&self) -> &Arc<FallbackRegistry> {
        &self.fallbacks
    }

    /// Run the bootstrap sequence once
    ///
    /// Later calls return the first report without re-running anything,
    /// until [`Self::reset`] re-arms the container. A circular dependency
    /// is returned as [`Error::CircularDependency`] on every call.
    pub async fn initialize(self: &Arc<Self>) -> Result<BootstrapReport> {
        let mut initialized = self.initialized.lock().await;
        let report = match initialized.as_ref() {
            Some(report) => report.clone(),
            None => {
                let report = self.bootstrap.initialize_services(self);
                *initialized = Some(report.clone());
                report
            }
        };
        match &report.cycle {
            Some(cycle) => Err(Error::circular_dependency(cycle.clone())),
            None => Ok(report),
        }
    }

    /// Report stored by the last bootstrap run, including a partial
    /// critical-only run that ended in a cycle error
    pub async fn bootstrap_report(&self) -> Option<BootstrapReport> {
        self.initialized.lock().await.clone()
    }

    /// Check if [`Self::initialize`] has completed
    pub async fn is_initialized(&self) -> bool {
        self.initialized.lock().await.is_some()
    }

    /// Declare dependency edges
    pub fn declare_dependencies(&self, service: &str, dependencies: &[&str]) {
        self.graph.declare_dependencies(service, dependencies);
    }

    /// Record a live instance
    ///
    /// The service passes through `registering` to `ready`. If the
    /// instance's registration hook fails it is not stored and the service
    /// moves to `error`.
    pub fn register(&self, name: &str, instance: SharedService) -> Result<()> {
        self.tracker.register_service(name);
        self.tracker
            .update_service_state(name, ServiceState::Registering, None);

        if let Err(e) = instance.on_register() {
            let message = e.to_string();
            self.tracker
                .update_service_state(name, ServiceState::Error, Some(&message));
            warn!(service = %name, error = %message, "Service registration failed");
            return Err(e);
        }

        self.services_mut().insert(name.to_string(), instance);
        self.fallbacks.reset_recovery(name);
        self.tracker
            .update_service_state(name, ServiceState::Ready, None);
        info!(service = %name, "Service registered");
        Ok(())
    }

    /// Store a fallback instance for a service
    pub fn register_fallback(&self, name: &str, instance: SharedService) {
        self.tracker.register_service(name);
        self.fallbacks.register_fallback(name, instance);
    }

    /// Store a recovery handler for a service
    pub fn register_recovery_handler(
        &self,
        name: &str,
        handler: SharedRecoveryHandler,
        params: RecoveryParams,
    ) {
        self.tracker.register_service(name);
        self.fallbacks
            .register_recovery_handler(name, handler, params);
    }

    /// Check if a real instance is stored, regardless of readiness
    pub fn is_registered(&self, name: &str) -> bool {
        self.services().contains_key(name)
    }

    /// Names with a stored instance, sorted
    pub fn registered_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.services().keys().cloned().collect();
        names.sort();
        names
    }

    /// Stored instance regardless of readiness
    pub fn instance(&self, name: &str) -> Option<SharedService> {
        self.services().get(name).cloned()
    }

    fn is_ready(&self, name: &str) -> bool {
        let fallback_names = self.fallbacks.fallback_names();
        self.tracker.validate_service_ready_with(name, |dep, state| {
            state == ServiceState::Degraded && fallback_names.contains(dep)
        })
    }

    fn unready_reason(&self, name: &str) -> String {
        match self.tracker.state(name) {
            Some(ServiceState::Ready) => match self.tracker.first_unready_dependency(name) {
                Some(dep) => format!(
                    "dependency '{dep}' is {}",
                    self.tracker
                        .state(&dep)
                        .unwrap_or(ServiceState::Unregistered)
                ),
                None => "no instance registered".to_string(),
            },
            Some(state) => format!("service is {state}"),
            None => "service is unregistered".to_string(),
        }
    }

    /// Get a usable instance
    ///
    /// Returns the real instance when the service and its dependencies are
    /// ready, else the fallback (marking the service `degraded`), else
    /// `None`. Never fails.
    pub fn get(&self, name: &str) -> Option<SharedService> {
        if self.is_ready(name)
            && let Some(instance) = self.instance(name)
        {
            return Some(instance);
        }

        match self.fallbacks.fallback(name) {
            Some(fallback) => {
                let reason = self.unready_reason(name);
                self.fallbacks.degrade_service(name, Some(&reason));
                Some(fallback)
            }
            None => {
                debug!(service = %name, "No service available");
                None
            }
        }
    }

    /// Typed [`Self::get`]
    ///
    /// `None` also when the served instance is not a `T`.
    pub fn get_as<T: ManagedService>(&self, name: &str) -> Option<Arc<T>> {
        self.get(name)?.downcast_arc::<T>().ok()
    }

    /// Typed [`Self::get`] that explains why nothing was served
    pub fn require<T: ManagedService>(&self, name: &str) -> Result<Arc<T>> {
        let instance = self.get(name).ok_or_else(|| {
            Error::service_unavailable(name, self.unready_reason(name))
        })?;
        instance
            .downcast_arc::<T>()
            .map_err(|_| Error::type_mismatch(name, std::any::type_name::<T>()))
    }

    /// Full readiness check without taking the fallback path
    pub fn has(&self, name: &str) -> bool {
        self.is_ready(name) && self.is_registered(name)
    }

    /// Snapshot of every known service
    pub fn states(&self) -> BTreeMap<String, ServiceStatusSnapshot> {
        self.tracker.get_all_states()
    }

    /// Tear everything down
    ///
    /// The recovery loop is stopped first, after any in-flight pass has
    /// finished, so a handler cannot register an instance after the clear.
    /// Registered services then pass through `stopping`, the registry and
    /// fallback bindings are cleared, every known service ends `stopped`
    /// and `initialize` is re-armed.
    pub async fn reset(&self) {
        self.fallbacks.stop_recovery_loop().await;
        let names = self.registered_names();
        for name in &names {
            self.tracker
                .update_service_state(name, ServiceState::Stopping, None);
        }
        self.services_mut().clear();
        self.fallbacks.clear();
        self.tracker.mark_all(ServiceState::Stopped);
        *self.initialized.lock().await = None;
        info!(services = names.len(), "Service container reset");
    }
}
