//! Service state tracker
//!
//! Single source of truth for each service's lifecycle stage, failure
//! history and declared dependency edges. Descriptors are created lazily
//! and never removed; teardown moves them to [`ServiceState::Stopped`].

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::Utc;
use grader_domain::value_objects::ServiceStatusSnapshot;
use grader_domain::{ServiceDescriptor, ServiceState};

use crate::logging::log_state_transition;

#[derive(Default)]
struct TrackerInner {
    descriptors: HashMap<String, ServiceDescriptor>,
    /// Names in first-seen order, used for deterministic traversal
    insertion_order: Vec<String>,
    /// Bumped whenever a node or edge is added
    topology_version: u64,
}

impl TrackerInner {
    fn materialize(&mut self, name: &str) -> &mut ServiceDescriptor {
        if !self.descriptors.contains_key(name) {
            self.insertion_order.push(name.to_string());
            self.topology_version += 1;
        }
        self.descriptors
            .entry(name.to_string())
            .or_insert_with(|| ServiceDescriptor::new(name))
    }
}

/// Per-service lifecycle tracker
#[derive(Default)]
pub struct ServiceStateTracker {
    inner: RwLock<TrackerInner>,
}

impl ServiceStateTracker {
    /// Create an empty tracker
    pub fn new() -> Self {
        Self::default()
    }

    // Poisoning only happens if a panic escaped while the lock was held;
    // the maps are still structurally valid, so keep serving them.
    fn read(&self) -> RwLockReadGuard<'_, TrackerInner> {
        self.inner
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, TrackerInner> {
        self.inner
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Create the descriptor if missing and return a copy of it
    ///
    /// Idempotent: an existing descriptor is returned unchanged.
    pub fn register_service(&self, name: &str) -> ServiceDescriptor {
        self.write().materialize(name).clone()
    }

    /// Transition a service to `state`
    ///
    /// Any transition is accepted. Entering [`ServiceState::Error`] bumps
    /// `error_count` and records `error` as `last_error`; for other states
    /// `error` is only logged.
    pub fn update_service_state(&self, name: &str, state: ServiceState, error: Option<&str>) {
        let previous = {
            let mut inner = self.write();
            let descriptor = inner.materialize(name);
            let previous = descriptor.state;
            descriptor.state = state;
            descriptor.last_state_change = Utc::now();
            if state == ServiceState::Error {
                descriptor.error_count += 1;
                descriptor.last_error = Some(error.unwrap_or("unknown error").to_string());
            }
            previous
        };
        log_state_transition(name, previous, state, error);
    }

    /// Current state, `None` for a name never seen
    pub fn state(&self, name: &str) -> Option<ServiceState> {
        self.read().descriptors.get(name).map(|d| d.state)
    }

    /// Copy of a descriptor
    pub fn descriptor(&self, name: &str) -> Option<ServiceDescriptor> {
        self.read().descriptors.get(name).cloned()
    }

    /// Every known name in first-seen order
    pub fn names(&self) -> Vec<String> {
        self.read().insertion_order.clone()
    }

    /// Names currently in `state`, in first-seen order
    pub fn services_in_state(&self, state: ServiceState) -> Vec<String> {
        let inner = self.read();
        inner
            .insertion_order
            .iter()
            .filter(|name| inner.descriptors.get(*name).is_some_and(|d| d.state == state))
            .cloned()
            .collect()
    }

    /// Move every known service to `state`
    pub fn mark_all(&self, state: ServiceState) {
        for name in self.names() {
            self.update_service_state(&name, state, None);
        }
    }

    /// Ready check: the service and all transitive dependencies are `ready`
    pub fn validate_service_ready(&self, name: &str) -> bool {
        self.validate_service_ready_with(name, |_, _| false)
    }

    /// Ready check with a substitute rule for dependencies
    ///
    /// A dependency that is not `ready` still satisfies the check when
    /// `substitute(dep, state)` returns true; its own dependencies are then
    /// not visited. The named service itself must always be `ready`.
    ///
    /// `substitute` runs under the tracker's read lock and must not call
    /// back into the tracker.
    pub fn validate_service_ready_with<F>(&self, name: &str, substitute: F) -> bool
    where
        F: Fn(&str, ServiceState) -> bool,
    {
        let inner = self.read();
        let Some(root) = inner.descriptors.get(name) else {
            return false;
        };
        if !root.state.is_ready() {
            return false;
        }

        let mut visited: HashSet<&str> = HashSet::from([name]);
        let mut stack: Vec<&str> = root.dependencies.iter().map(String::as_str).collect();
        while let Some(dep) = stack.pop() {
            if !visited.insert(dep) {
                continue;
            }
            let Some(descriptor) = inner.descriptors.get(dep) else {
                return false;
            };
            if descriptor.state.is_ready() {
                stack.extend(descriptor.dependencies.iter().map(String::as_str));
            } else if !substitute(dep, descriptor.state) {
                return false;
            }
        }
        true
    }

    /// First dependency (transitively) that is not `ready`
    pub fn first_unready_dependency(&self, name: &str) -> Option<String> {
        let inner = self.read();
        let root = inner.descriptors.get(name)?;
        let mut visited: HashSet<&str> = HashSet::from([name]);
        let mut stack: Vec<&str> = root.dependencies.iter().rev().map(String::as_str).collect();
        while let Some(dep) = stack.pop() {
            if !visited.insert(dep) {
                continue;
            }
            match inner.descriptors.get(dep) {
                Some(d) if d.state.is_ready() => {
                    stack.extend(d.dependencies.iter().rev().map(String::as_str));
                }
                _ => return Some(dep.to_string()),
            }
        }
        None
    }

    /// Serializable snapshot of every descriptor keyed by name
    pub fn get_all_states(&self) -> BTreeMap<String, ServiceStatusSnapshot> {
        self.read()
            .descriptors
            .iter()
            .map(|(name, d)| (name.clone(), d.snapshot()))
            .collect()
    }

    /// JSON form of [`Self::get_all_states`]
    pub fn to_dict(&self) -> serde_json::Value {
        serde_json::to_value(self.get_all_states()).unwrap_or(serde_json::Value::Null)
    }

    /// Add `service -> dep` edges, keeping the reverse edges in sync
    ///
    /// Returns true if any edge was new.
    pub(crate) fn add_dependency_edges(&self, service: &str, dependencies: &[&str]) -> bool {
        let mut inner = self.write();
        inner.materialize(service);
        let mut changed = false;
        for dep in dependencies {
            inner.materialize(dep).dependents.insert(service.to_string());
            changed |= inner
                .materialize(service)
                .dependencies
                .insert((*dep).to_string());
        }
        if changed {
            inner.topology_version += 1;
        }
        changed
    }

    /// Adjacency list in first-seen order plus the topology version it reflects
    pub(crate) fn adjacency(&self) -> (u64, Vec<(String, Vec<String>)>) {
        let inner = self.read();
        let nodes = inner
            .insertion_order
            .iter()
            .map(|name| {
                let deps = inner
                    .descriptors
                    .get(name)
                    .map(|d| d.dependencies.iter().cloned().collect())
                    .unwrap_or_default();
                (name.clone(), deps)
            })
            .collect();
        (inner.topology_version, nodes)
    }

    /// Current topology version
    pub(crate) fn topology_version(&self) -> u64 {
        self.read().topology_version
    }
}
