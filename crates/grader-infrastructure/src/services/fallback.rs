//! Fallback / degradation registry
//!
//! Holds per-service fallback instances and recovery handlers, and runs a
//! single background task that periodically retries degraded services.
//!
//! Retries are rate limited twice: at most one attempt per service per
//! tick, and an exponential backoff after consecutive failures. Once
//! `max_attempts` is reached the binding is exhausted and the service is
//! moved to [`ServiceState::Error`].

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, Weak};

use grader_domain::ServiceState;
use grader_domain::ports::{RecoveryParams, SharedRecoveryHandler, SharedService};
use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::state::ServiceStateTracker;
use crate::config::RecoveryConfig;

/// Recovery progress of one binding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecoveryStatus {
    /// Not degraded, or recovered
    #[default]
    Healthy,
    /// Degraded and being retried
    Recovering,
    /// Attempt ceiling reached; no further automatic retries
    Exhausted,
}

/// Retry bookkeeping for one service
#[derive(Debug, Clone, Default)]
pub struct RecoveryState {
    /// Current status
    pub status: RecoveryStatus,
    /// Attempts since the service was last healthy
    pub attempts: u32,
    /// Failed attempts in a row
    pub consecutive_failures: u32,
    /// When the last attempt ran
    pub last_attempt: Option<Instant>,
    /// Error or falsy-result description of the last failed attempt
    pub last_error: Option<String>,
    /// Why the service was degraded
    pub degraded_reason: Option<String>,
}

impl RecoveryState {
    fn record_degraded(&mut self, reason: Option<&str>) {
        if self.status == RecoveryStatus::Healthy {
            self.status = RecoveryStatus::Recovering;
        }
        if let Some(reason) = reason {
            self.degraded_reason = Some(reason.to_string());
        }
    }

    fn record_failure(&mut self, error: String) {
        self.attempts += 1;
        self.consecutive_failures += 1;
        self.last_attempt = Some(Instant::now());
        self.last_error = Some(error);
    }

    fn record_success(&mut self) {
        *self = Self::default();
    }

    /// True when the backoff since the last failure has elapsed
    pub fn is_due(&self, policy: &RecoveryConfig, now: Instant) -> bool {
        if self.status == RecoveryStatus::Exhausted {
            return false;
        }
        match self.last_attempt {
            Some(last) => {
                now.saturating_duration_since(last)
                    >= policy.calculate_backoff(self.consecutive_failures)
            }
            None => true,
        }
    }
}

/// Fallback and recovery configuration for one service
#[derive(Clone, Default)]
pub struct FallbackBinding {
    /// Substitute served while the real instance is unavailable
    pub fallback: Option<SharedService>,
    /// Callback that tries to restore the real instance
    pub handler: Option<SharedRecoveryHandler>,
    /// Parameters passed to `handler` on every attempt
    pub params: RecoveryParams,
    /// Retry bookkeeping
    pub recovery: RecoveryState,
}

/// Serializable view of a binding
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecoveryStatusSnapshot {
    /// Recovery status
    pub status: RecoveryStatus,
    /// Attempts since last healthy
    pub attempts: u32,
    /// Failed attempts in a row
    pub consecutive_failures: u32,
    /// Last failure description
    pub last_error: Option<String>,
    /// Why the service was degraded
    pub degraded_reason: Option<String>,
    /// Whether a fallback instance is registered
    pub has_fallback: bool,
    /// Whether a recovery handler is registered
    pub has_handler: bool,
}

struct RecoveryTask {
    token: CancellationToken,
    handle: JoinHandle<()>,
}

/// Registry of fallbacks and recovery handlers
pub struct FallbackRegistry {
    tracker: Arc<ServiceStateTracker>,
    policy: RecoveryConfig,
    bindings: Mutex<HashMap<String, FallbackBinding>>,
    task: Mutex<Option<RecoveryTask>>,
}

impl FallbackRegistry {
    /// Create a registry reporting to `tracker`
    pub fn new(tracker: Arc<ServiceStateTracker>, policy: RecoveryConfig) -> Self {
        Self {
            tracker,
            policy,
            bindings: Mutex::new(HashMap::new()),
            task: Mutex::new(None),
        }
    }

    /// Recovery policy in effect
    pub fn policy(&self) -> &RecoveryConfig {
        &self.policy
    }

    fn bindings(&self) -> MutexGuard<'_, HashMap<String, FallbackBinding>> {
        self.bindings
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn task(&self) -> MutexGuard<'_, Option<RecoveryTask>> {
        self.task
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Store a substitute instance; the service state is not touched
    pub fn register_fallback(&self, name: &str, instance: SharedService) {
        self.bindings()
            .entry(name.to_string())
            .or_default()
            .fallback = Some(instance);
        debug!(service = %name, "Fallback registered");
    }

    /// Store a recovery handler and the parameters it is called with
    pub fn register_recovery_handler(
        &self,
        name: &str,
        handler: SharedRecoveryHandler,
        params: RecoveryParams,
    ) {
        let mut bindings = self.bindings();
        let binding = bindings.entry(name.to_string()).or_default();
        binding.handler = Some(handler);
        binding.params = params;
        debug!(service = %name, "Recovery handler registered");
    }

    /// Registered fallback instance, if any
    pub fn fallback(&self, name: &str) -> Option<SharedService> {
        self.bindings().get(name).and_then(|b| b.fallback.clone())
    }

    /// Check if a fallback instance is registered
    pub fn has_fallback(&self, name: &str) -> bool {
        self.bindings()
            .get(name)
            .is_some_and(|b| b.fallback.is_some())
    }

    /// Names that have a fallback instance registered
    pub fn fallback_names(&self) -> HashSet<String> {
        self.bindings()
            .iter()
            .filter(|(_, b)| b.fallback.is_some())
            .map(|(name, _)| name.clone())
            .collect()
    }

    /// Mark a service degraded and make sure the recovery loop runs
    ///
    /// The loop is only started from inside a Tokio runtime; elsewhere the
    /// degradation is recorded and a warning logged.
    ///
    /// An exhausted service keeps its `error` state; the fallback is still
    /// served but nothing retries it until [`reset_recovery`](Self::reset_recovery).
    pub fn degrade_service(self: &Arc<Self>, name: &str, reason: Option<&str>) {
        {
            let mut bindings = self.bindings();
            let recovery = &mut bindings.entry(name.to_string()).or_default().recovery;
            if recovery.status == RecoveryStatus::Exhausted {
                debug!(service = %name, "Recovery exhausted, state left unchanged");
                return;
            }
            recovery.record_degraded(reason);
            if self.tracker.state(name) != Some(ServiceState::Degraded) {
                self.tracker
                    .update_service_state(name, ServiceState::Degraded, reason);
            }
        }
        if self.policy.enabled {
            self.ensure_recovery_loop();
        }
    }

    /// Try to restore one service now
    ///
    /// A truthy handler result moves the service to `ready`. Errors and
    /// falsy results are logged and counted; the service stays degraded
    /// unless the attempt ceiling is reached.
    pub async fn attempt_recovery(&self, name: &str) -> bool {
        let (handler, params) = {
            let bindings = self.bindings();
            let Some(binding) = bindings.get(name) else {
                return false;
            };
            if binding.recovery.status == RecoveryStatus::Exhausted {
                return false;
            }
            match &binding.handler {
                Some(handler) => (Arc::clone(handler), binding.params.clone()),
                None => {
                    debug!(service = %name, "No recovery handler registered");
                    return false;
                }
            }
        };

        let failure = match handler.recover(&params).await {
            Ok(true) => None,
            Ok(false) => Some("recovery handler reported failure".to_string()),
            Err(e) => Some(e.to_string()),
        };

        let mut bindings = self.bindings();
        let binding = bindings.entry(name.to_string()).or_default();
        match failure {
            None => {
                binding.recovery.record_success();
                self.tracker
                    .update_service_state(name, ServiceState::Ready, None);
                info!(service = %name, "Service recovered");
                true
            }
            Some(message) => {
                binding.recovery.record_failure(message.clone());
                let attempts = binding.recovery.attempts;
                if self.policy.is_exhausted(attempts) {
                    binding.recovery.status = RecoveryStatus::Exhausted;
                    let reason = format!("recovery exhausted after {attempts} attempts: {message}");
                    self.tracker
                        .update_service_state(name, ServiceState::Error, Some(&reason));
                    error!(service = %name, attempts, "Recovery attempts exhausted");
                } else {
                    warn!(
                        service = %name,
                        attempts,
                        error = %message,
                        next_delay_ms = u64::try_from(
                            self.policy
                                .calculate_backoff(binding.recovery.consecutive_failures)
                                .as_millis()
                        )
                        .unwrap_or(u64::MAX),
                        "Recovery attempt failed"
                    );
                }
                false
            }
        }
    }

    /// Degraded services whose backoff has elapsed
    fn due_for_recovery(&self) -> Vec<String> {
        let bindings = self.bindings();
        let now = Instant::now();
        self.tracker
            .services_in_state(ServiceState::Degraded)
            .into_iter()
            .filter(|name| {
                bindings
                    .get(name)
                    .is_some_and(|b| b.handler.is_some() && b.recovery.is_due(&self.policy, now))
            })
            .collect()
    }

    /// Run one pass over degraded services, returning the recovered names
    pub async fn run_recovery_cycle(&self) -> Vec<String> {
        let mut recovered = Vec::new();
        for name in self.due_for_recovery() {
            if self.attempt_recovery(&name).await {
                recovered.push(name);
            }
        }
        recovered
    }

    fn ensure_recovery_loop(self: &Arc<Self>) {
        let mut task = self.task();
        if task.as_ref().is_some_and(|t| !t.handle.is_finished()) {
            return;
        }
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            warn!("No Tokio runtime available, recovery loop not started");
            return;
        };

        let token = CancellationToken::new();
        let handle = runtime.spawn(recovery_loop(
            Arc::downgrade(self),
            self.policy.check_interval(),
            token.clone(),
        ));
        *task = Some(RecoveryTask { token, handle });
        info!(
            interval_secs = self.policy.check_interval_secs,
            "Recovery loop started"
        );
    }

    /// Check if the background loop is alive
    pub fn is_recovery_running(&self) -> bool {
        self.task()
            .as_ref()
            .is_some_and(|t| !t.handle.is_finished() && !t.token.is_cancelled())
    }

    /// Stop the background loop and wait for it to exit
    ///
    /// Safe to call when the loop was never started.
    pub async fn stop_recovery_loop(&self) {
        let task = self.task().take();
        if let Some(task) = task {
            task.token.cancel();
            if let Err(e) = task.handle.await
                && !e.is_cancelled()
            {
                warn!(error = %e, "Recovery loop ended abnormally");
            }
            info!("Recovery loop stopped");
        }
    }

    /// Signal the loop to stop without waiting for it
    pub fn cancel_recovery_loop(&self) {
        if let Some(task) = self.task().take() {
            task.token.cancel();
        }
    }

    /// Recovery bookkeeping per service
    pub fn recovery_status(&self) -> BTreeMap<String, RecoveryStatusSnapshot> {
        self.bindings()
            .iter()
            .map(|(name, b)| {
                (
                    name.clone(),
                    RecoveryStatusSnapshot {
                        status: b.recovery.status,
                        attempts: b.recovery.attempts,
                        consecutive_failures: b.recovery.consecutive_failures,
                        last_error: b.recovery.last_error.clone(),
                        degraded_reason: b.recovery.degraded_reason.clone(),
                        has_fallback: b.fallback.is_some(),
                        has_handler: b.handler.is_some(),
                    },
                )
            })
            .collect()
    }

    /// Drop all bindings
    pub fn clear(&self) {
        self.bindings().clear();
    }

    /// Reset retry bookkeeping for a service, allowing exhausted services to retry
    pub fn reset_recovery(&self, name: &str) {
        if let Some(binding) = self.bindings().get_mut(name) {
            binding.recovery = RecoveryState::default();
        }
    }
}

impl Drop for FallbackRegistry {
    fn drop(&mut self) {
        if let Ok(mut guard) = self.task.lock()
            && let Some(task) = guard.take()
        {
            task.token.cancel();
        }
    }
}

async fn recovery_loop(
    registry: Weak<FallbackRegistry>,
    interval: std::time::Duration,
    token: CancellationToken,
) {
    loop {
        tokio::select! {
            () = token.cancelled() => break,
            () = tokio::time::sleep(interval) => {}
        }
        let Some(registry) = registry.upgrade() else {
            break;
        };
        let recovered = registry.run_recovery_cycle().await;
        if !recovered.is_empty() {
            info!(services = ?recovered, "Recovery cycle restored services");
        }
    }
    debug!("Recovery loop exited");
}
