//! Unit tests for error context helpers

use grader_domain::Error;
use grader_infrastructure::error_ext::ErrorContext;
use std::io;

fn io_failure() -> std::result::Result<(), io::Error> {
    Err(io::Error::new(io::ErrorKind::NotFound, "missing"))
}

#[test]
fn test_context_wraps_as_infrastructure() {
    let err = io_failure().context("Loading data").expect_err("error");
    assert!(matches!(err, Error::Infrastructure { .. }));
    assert_eq!(err.to_string(), "Infrastructure error: Loading data: missing");
}

#[test]
fn test_with_context_is_lazy() {
    let mut built = false;
    let ok: std::result::Result<u8, io::Error> = Ok(1);
    let value = ok
        .with_context(|| {
            built = true;
            "never"
        })
        .expect("ok");
    assert_eq!(value, 1);
    assert!(!built);

    let err = io_failure()
        .with_context(|| format!("Reading {}", "grader.toml"))
        .expect_err("error");
    assert!(err.to_string().contains("Reading grader.toml: missing"));
}

#[test]
fn test_io_context() {
    let err = io_failure().io_context("Writing file").expect_err("error");
    assert!(matches!(err, Error::Io { .. }));
}

#[test]
fn test_config_context_keeps_source() {
    let err = io_failure().config_context("Parsing").expect_err("error");
    assert!(matches!(err, Error::Configuration { .. }));
    assert!(std::error::Error::source(&err).is_some());
}
