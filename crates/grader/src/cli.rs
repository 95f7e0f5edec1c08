//! Command line interface
//!
//! | Command | Description |
//! |---------|-------------|
//! | `grader status` | Bootstrap every service and print its lifecycle state |
//! | `grader status --health` | Also run health checks and collect metrics |
//! | `grader order` | Print the initialization order without starting anything |

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use grader_domain::error::{Error, Result};
use grader_domain::value_objects::ServiceStatusSnapshot;
use grader_infrastructure::config::{AppConfig, ConfigLoader};
use grader_infrastructure::health::{HealthResponse, ServiceHealthChecker};
use grader_infrastructure::logging::init_logging;
use grader_infrastructure::services::{
    BootstrapReport, DependencyGraph, ServiceBootstrap, ServiceContainer, ServiceStateTracker,
};
use serde_json::{Value, json};
use tracing::{info, warn};

/// Command line interface for Grader
#[derive(Parser, Debug)]
#[command(name = "grader")]
#[command(about = "Grader - essay grading service lifecycle")]
#[command(version)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Bootstrap the services and report their state
    Status {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,

        /// Run health checks and collect metrics
        #[arg(long)]
        health: bool,
    },
    /// Print the dependency-respecting initialization order
    Order,
}

/// Everything `grader status` reports
#[derive(Debug)]
pub struct StatusReport {
    /// Outcome of the bootstrap pass
    pub bootstrap: BootstrapReport,
    /// Lifecycle snapshot per service
    pub states: BTreeMap<String, ServiceStatusSnapshot>,
    /// Aggregated health, when requested
    pub health: Option<HealthResponse>,
    /// Metrics per service, when requested
    pub metrics: BTreeMap<String, Value>,
}

impl StatusReport {
    /// JSON form used by `--json`
    pub fn to_json(&self) -> Value {
        json!({
            "bootstrap": self.bootstrap,
            "services": self.states,
            "health": self.health,
            "metrics": self.metrics,
        })
    }

    /// One line per service: name, state, error count, last error
    pub fn to_table(&self) -> String {
        let width = self.states.keys().map(String::len).max().unwrap_or(0);
        let mut out = String::new();
        for (name, snapshot) in &self.states {
            let health = self
                .health
                .as_ref()
                .and_then(|h| h.checks.get(name))
                .map(|c| format!(" [{}]", json!(c.status).as_str().unwrap_or("?")))
                .unwrap_or_default();
            out.push_str(&format!(
                "{name:<width$}  {:<12}{health}",
                snapshot.status.as_str()
            ));
            if let Some(error) = &snapshot.last_error {
                out.push_str(&format!("  errors={} last={error}", snapshot.error_count));
            }
            out.push('\n');
        }
        if let Some(cycle) = &self.bootstrap.cycle {
            out.push_str(&format!("circular dependency: {}\n", cycle.join(" -> ")));
        }
        if self.bootstrap.critical_only {
            out.push_str(&format!(
                "critical services only: initialized [{}]\n",
                self.bootstrap.initialized.join(", ")
            ));
        }
        out
    }
}

/// Load configuration from an optional explicit path
pub fn load_config(config_path: Option<&Path>) -> Result<AppConfig> {
    let loader = match config_path {
        Some(path) => ConfigLoader::new().with_config_path(path),
        None => ConfigLoader::new(),
    };
    loader.load()
}

/// Initialization order of a bootstrap table, computed on a scratch graph
pub fn initialization_order(bootstrap: &ServiceBootstrap) -> Result<Vec<String>> {
    let graph = DependencyGraph::new(Arc::new(ServiceStateTracker::new()));
    for entry in bootstrap.entries() {
        let dependencies: Vec<&str> = entry.dependencies().iter().map(String::as_str).collect();
        graph.declare_dependencies(entry.name(), &dependencies);
    }
    graph.calculate_initialization_order()
}

/// Bootstrap `container` and collect its status
///
/// A circular dependency is not returned as an error: the report of the
/// critical-only pass the container stored is shown instead.
pub async fn collect_status(container: &Arc<ServiceContainer>, health: bool) -> StatusReport {
    let bootstrap = match container.initialize().await {
        Ok(report) => report,
        Err(e) => {
            warn!(error = %e, "Bootstrap did not complete");
            let mut report = container.bootstrap_report().await.unwrap_or_default();
            if report.cycle.is_none()
                && let Error::CircularDependency { cycle } = e
            {
                report.cycle = Some(cycle);
            }
            report
        }
    };

    let (health, metrics) = if health {
        let checker = ServiceHealthChecker::new(Arc::clone(container));
        (
            Some(checker.health_response().await),
            checker.get_service_metrics(),
        )
    } else {
        (None, BTreeMap::new())
    };

    StatusReport {
        bootstrap,
        states: container.states(),
        health,
        metrics,
    }
}

/// Execute a parsed command line
pub async fn run(cli: Cli) -> std::result::Result<(), Box<dyn std::error::Error>> {
    let config = load_config(cli.config.as_deref())?;
    init_logging(&config.logging)?;

    match cli.command {
        Command::Order => {
            for (position, name) in initialization_order(&ServiceBootstrap::standard())?
                .iter()
                .enumerate()
            {
                println!("{:>2}. {name}", position + 1);
            }
        }
        Command::Status { json, health } => {
            info!("Starting service bootstrap");
            let container = Arc::new(ServiceContainer::new(config));
            let report = collect_status(&container, health).await;
            if json {
                println!("{}", serde_json::to_string_pretty(&report.to_json())?);
            } else {
                print!("{}", report.to_table());
            }
            container.reset().await;
        }
    }
    Ok(())
}
