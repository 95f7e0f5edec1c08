//! Dependency graph resolver
//!
//! Turns declared `service -> dependencies` edges into an initialization
//! order. The edges themselves live in the [`ServiceStateTracker`]
//! descriptors; this type only traverses them and caches the resulting
//! order.
//!
//! Traversal is an iterative depth-first search in first-seen node order,
//! with dependencies visited in name order, so the result is deterministic
//! for a fixed set of declarations and deep chains cannot overflow the
//! stack.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use grader_domain::error::{Error, Result};
use tracing::{debug, error};

use super::state::ServiceStateTracker;

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    InProgress,
    Done,
}

/// Outcome of one full traversal: post-order, or the first cycle found
type Traversal = std::result::Result<Vec<usize>, Vec<usize>>;

fn traverse(adjacency: &[Vec<usize>]) -> Traversal {
    let mut marks = vec![Mark::Unvisited; adjacency.len()];
    let mut post_order = Vec::with_capacity(adjacency.len());
    let mut path: Vec<usize> = Vec::new();
    // (node, index of the next dependency to visit)
    let mut frames: Vec<(usize, usize)> = Vec::new();

    for start in 0..adjacency.len() {
        if marks[start] != Mark::Unvisited {
            continue;
        }
        marks[start] = Mark::InProgress;
        path.push(start);
        frames.push((start, 0));

        while let Some(frame) = frames.last_mut() {
            let (node, next) = *frame;
            if let Some(&dep) = adjacency[node].get(next) {
                frame.1 += 1;
                match marks[dep] {
                    Mark::Unvisited => {
                        marks[dep] = Mark::InProgress;
                        path.push(dep);
                        frames.push((dep, 0));
                    }
                    Mark::InProgress => {
                        let entry = path.iter().position(|&n| n == dep).unwrap_or(0);
                        let mut cycle = path[entry..].to_vec();
                        cycle.push(dep);
                        return Err(cycle);
                    }
                    Mark::Done => {}
                }
            } else {
                marks[node] = Mark::Done;
                post_order.push(node);
                path.pop();
                frames.pop();
            }
        }
    }
    Ok(post_order)
}

/// Dependency graph resolver over the tracker's descriptors
pub struct DependencyGraph {
    tracker: Arc<ServiceStateTracker>,
    /// Last computed order tagged with the topology version it was built from
    order_cache: Mutex<Option<(u64, Vec<String>)>>,
}

impl DependencyGraph {
    /// Create a resolver over `tracker`
    pub fn new(tracker: Arc<ServiceStateTracker>) -> Self {
        Self {
            tracker,
            order_cache: Mutex::new(None),
        }
    }

    /// Union `dependencies` into the service's dependency set
    ///
    /// Unknown names are materialized. Reverse edges are kept in sync and
    /// any cached order is discarded.
    pub fn declare_dependencies(&self, service: &str, dependencies: &[&str]) {
        if self.tracker.add_dependency_edges(service, dependencies) {
            debug!(service = %service, dependencies = ?dependencies, "Dependencies declared");
        }
        if let Ok(mut cache) = self.order_cache.lock() {
            *cache = None;
        }
    }

    fn indexed(&self) -> (u64, Vec<String>, Vec<Vec<usize>>) {
        let (version, nodes) = self.tracker.adjacency();
        let index: HashMap<&str, usize> = nodes
            .iter()
            .enumerate()
            .map(|(i, (name, _))| (name.as_str(), i))
            .collect();
        let adjacency = nodes
            .iter()
            .map(|(_, deps)| {
                deps.iter()
                    .filter_map(|d| index.get(d.as_str()).copied())
                    .collect()
            })
            .collect();
        let names = nodes.into_iter().map(|(name, _)| name).collect();
        (version, names, adjacency)
    }

    /// First cycle found, as a path whose first and last names are equal
    pub fn check_circular_dependencies(&self) -> Option<Vec<String>> {
        let (_, names, adjacency) = self.indexed();
        traverse(&adjacency)
            .err()
            .map(|cycle| cycle.into_iter().map(|i| names[i].clone()).collect())
    }

    /// Every known service, each after all of its dependencies
    ///
    /// Fails with [`Error::CircularDependency`] instead of returning a
    /// partial order. Successful results are cached until the topology
    /// changes.
    pub fn calculate_initialization_order(&self) -> Result<Vec<String>> {
        let current = self.tracker.topology_version();
        if let Ok(cache) = self.order_cache.lock()
            && let Some((version, order)) = cache.as_ref()
            && *version == current
        {
            return Ok(order.clone());
        }

        let (version, names, adjacency) = self.indexed();
        match traverse(&adjacency) {
            Ok(post_order) => {
                let order: Vec<String> = post_order.into_iter().map(|i| names[i].clone()).collect();
                debug!(order = ?order, "Initialization order calculated");
                if let Ok(mut cache) = self.order_cache.lock() {
                    *cache = Some((version, order.clone()));
                }
                Ok(order)
            }
            Err(cycle) => {
                let cycle: Vec<String> = cycle.into_iter().map(|i| names[i].clone()).collect();
                error!(cycle = %cycle.join(" -> "), "Circular dependency detected");
                Err(Error::circular_dependency(cycle))
            }
        }
    }

    /// Direct dependencies of a service in name order
    pub fn dependencies_of(&self, name: &str) -> Vec<String> {
        self.tracker
            .descriptor(name)
            .map(|d| d.dependencies.into_iter().collect())
            .unwrap_or_default()
    }

    /// Every service that depends on `name`, directly or transitively
    pub fn dependents_of(&self, name: &str) -> Vec<String> {
        let mut seen: HashSet<String> = HashSet::new();
        let mut result = Vec::new();
        let mut stack = vec![name.to_string()];
        while let Some(current) = stack.pop() {
            let Some(descriptor) = self.tracker.descriptor(&current) else {
                continue;
            };
            for dependent in descriptor.dependents {
                if dependent != name && seen.insert(dependent.clone()) {
                    result.push(dependent.clone());
                    stack.push(dependent);
                }
            }
        }
        result
    }
}
