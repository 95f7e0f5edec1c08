//! Unit tests for the dependency graph resolver

use grader_domain::Error;
use grader_infrastructure::services::{DependencyGraph, ServiceStateTracker};
use std::sync::Arc;

fn graph() -> DependencyGraph {
    DependencyGraph::new(Arc::new(ServiceStateTracker::new()))
}

// ============================================================================
// Initialization order
// ============================================================================

#[test]
fn test_linear_chain_order() {
    let graph = graph();
    graph.declare_dependencies("A", &[]);
    graph.declare_dependencies("B", &["A"]);
    graph.declare_dependencies("C", &["B"]);

    let order = graph.calculate_initialization_order().expect("order");
    assert_eq!(order, vec!["A", "B", "C"]);
}

#[test]
fn test_dependencies_come_first_when_declared_late() {
    let graph = graph();
    graph.declare_dependencies("app", &["db", "cache"]);
    graph.declare_dependencies("db", &["config"]);

    let order = graph.calculate_initialization_order().expect("order");
    let pos = |n: &str| order.iter().position(|x| x == n).expect(n);
    assert_eq!(order.len(), 4);
    assert!(pos("config") < pos("db"));
    assert!(pos("db") < pos("app"));
    assert!(pos("cache") < pos("app"));
}

#[test]
fn test_diamond_visits_shared_dependency_once() {
    let graph = graph();
    graph.declare_dependencies("top", &["left", "right"]);
    graph.declare_dependencies("left", &["base"]);
    graph.declare_dependencies("right", &["base"]);

    let order = graph.calculate_initialization_order().expect("order");
    assert_eq!(order.iter().filter(|n| *n == "base").count(), 1);
    assert_eq!(order.first().map(String::as_str), Some("base"));
    assert_eq!(order.last().map(String::as_str), Some("top"));
}

#[test]
fn test_order_is_deterministic() {
    let build = || {
        let graph = graph();
        graph.declare_dependencies("x", &["b", "a"]);
        graph.declare_dependencies("y", &["a"]);
        graph.calculate_initialization_order().expect("order")
    };
    assert_eq!(build(), build());
}

#[test]
fn test_empty_graph_has_empty_order() {
    assert!(graph().calculate_initialization_order().expect("order").is_empty());
}

#[test]
fn test_declaring_again_unions_edges() {
    let graph = graph();
    graph.declare_dependencies("svc", &["a"]);
    graph.declare_dependencies("svc", &["b"]);
    graph.declare_dependencies("svc", &["a"]);
    assert_eq!(graph.dependencies_of("svc"), vec!["a", "b"]);
}

// ============================================================================
// Cache invalidation
// ============================================================================

#[test]
fn test_order_reflects_later_declarations() {
    let graph = graph();
    graph.declare_dependencies("B", &["A"]);
    assert_eq!(
        graph.calculate_initialization_order().expect("order"),
        vec!["A", "B"]
    );

    graph.declare_dependencies("A", &["Z"]);
    let order = graph.calculate_initialization_order().expect("order");
    assert_eq!(order, vec!["Z", "A", "B"]);
}

#[test]
fn test_order_reflects_services_added_through_tracker() {
    let tracker = Arc::new(ServiceStateTracker::new());
    let graph = DependencyGraph::new(Arc::clone(&tracker));
    graph.declare_dependencies("B", &["A"]);
    assert_eq!(graph.calculate_initialization_order().expect("order").len(), 2);

    tracker.register_service("standalone");
    let order = graph.calculate_initialization_order().expect("order");
    assert_eq!(order.len(), 3);
    assert!(order.contains(&"standalone".to_string()));
}

// ============================================================================
// Cycles
// ============================================================================

#[test]
fn test_two_node_cycle_is_reported() {
    let graph = graph();
    graph.declare_dependencies("X", &["Y"]);
    graph.declare_dependencies("Y", &["X"]);

    let cycle = graph.check_circular_dependencies().expect("cycle");
    assert_eq!(cycle, vec!["X", "Y", "X"]);

    match graph.calculate_initialization_order() {
        Err(Error::CircularDependency { cycle }) => assert_eq!(cycle, vec!["X", "Y", "X"]),
        other => panic!("expected circular dependency, got {other:?}"),
    }
}

#[test]
fn test_self_dependency_is_a_cycle() {
    let graph = graph();
    graph.declare_dependencies("loop", &["loop"]);
    assert_eq!(
        graph.check_circular_dependencies().expect("cycle"),
        vec!["loop", "loop"]
    );
}

#[test]
fn test_cycle_path_excludes_entry_nodes() {
    let graph = graph();
    graph.declare_dependencies("entry", &["a"]);
    graph.declare_dependencies("a", &["b"]);
    graph.declare_dependencies("b", &["c"]);
    graph.declare_dependencies("c", &["a"]);

    let cycle = graph.check_circular_dependencies().expect("cycle");
    assert_eq!(cycle, vec!["a", "b", "c", "a"]);
}

#[test]
fn test_cycle_introduced_after_cached_order() {
    let graph = graph();
    graph.declare_dependencies("B", &["A"]);
    assert!(graph.calculate_initialization_order().is_ok());

    graph.declare_dependencies("A", &["B"]);
    assert!(graph.calculate_initialization_order().is_err());
}

#[test]
fn test_acyclic_graph_has_no_cycle() {
    let graph = graph();
    graph.declare_dependencies("B", &["A"]);
    assert!(graph.check_circular_dependencies().is_none());
}

#[test]
fn test_deep_chain_does_not_overflow() {
    let graph = graph();
    let names: Vec<String> = (0..5_000).map(|i| format!("svc{i}")).collect();
    for pair in names.windows(2) {
        graph.declare_dependencies(&pair[1], &[pair[0].as_str()]);
    }
    let order = graph.calculate_initialization_order().expect("order");
    assert_eq!(order, names);
}

// ============================================================================
// Queries
// ============================================================================

#[test]
fn test_dependents_of_is_transitive() {
    let graph = graph();
    graph.declare_dependencies("B", &["A"]);
    graph.declare_dependencies("C", &["B"]);
    graph.declare_dependencies("D", &["A"]);

    let mut dependents = graph.dependents_of("A");
    dependents.sort();
    assert_eq!(dependents, vec!["B", "C", "D"]);
    assert!(graph.dependents_of("C").is_empty());
    assert!(graph.dependencies_of("missing").is_empty());
}
