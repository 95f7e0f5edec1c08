//! Grader - Entry Point
//!
//! Binary entry point for the `grader` command line. Lives in the facade
//! crate next to the library it drives.

use clap::Parser;
use grader::cli::{Cli, run};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    run(Cli::parse()).await
}
