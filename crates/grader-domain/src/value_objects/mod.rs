//! Domain value objects

/// Essay grading payloads
pub mod essay;
/// Service lifecycle types
pub mod service;

pub use essay::{CorrectionResult, EssayRequest, Notification};
pub use service::{
    ServiceDescriptor, ServiceHealth, ServiceHealthReport, ServiceState, ServiceStatusSnapshot,
};
