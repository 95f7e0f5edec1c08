//! # Grader Domain
//!
//! Core types shared by every Grader layer:
//!
//! - [`error`] - the workspace error type
//! - [`value_objects`] - service lifecycle states, descriptors and essay payloads
//! - [`ports`] - capability traits implemented by container-managed services
//! - [`constants`] - well-known service and provider names

pub mod constants;
pub mod error;
pub mod ports;
pub mod value_objects;

pub use error::{Error, Result};
pub use value_objects::{ServiceDescriptor, ServiceState};
