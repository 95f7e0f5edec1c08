//! Error handling types

use thiserror::Error;

/// Result type alias for operations that can fail
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for Grader
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error (simple form)
    #[error("I/O error: {source}")]
    IoSimple {
        /// The underlying I/O error
        #[from]
        source: std::io::Error,
    },

    /// I/O operation error (with context)
    #[error("I/O error: {message}")]
    Io {
        /// Description of the I/O error
        message: String,
        /// Optional source error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// JSON parsing or serialization error
    #[error("JSON parsing error: {source}")]
    Json {
        /// The underlying JSON error
        #[from]
        source: serde_json::Error,
    },

    /// Generic string-based error
    #[error("String error: {0}")]
    String(String),

    /// Resource not found error
    #[error("Not found: {resource}")]
    NotFound {
        /// The resource that was not found
        resource: String,
    },

    /// Invalid argument provided to a function
    #[error("Invalid argument: {message}")]
    InvalidArgument {
        /// Description of the invalid argument
        message: String,
    },

    /// Configuration-related error
    #[error("Configuration error: {message}")]
    Configuration {
        /// Description of the configuration error
        message: String,
        /// Optional source error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The declared service graph contains a cycle
    #[error("Circular dependency detected: {}", cycle.join(" -> "))]
    CircularDependency {
        /// Cycle path, first and last entries are the same service
        cycle: Vec<String>,
    },

    /// A service could not be constructed or is not available
    #[error("Service '{service}' unavailable: {message}")]
    ServiceUnavailable {
        /// Service name
        service: String,
        /// Why the service is unavailable
        message: String,
    },

    /// A registered instance was asked for as the wrong concrete type
    #[error("Service '{service}' is not of type {expected}")]
    TypeMismatch {
        /// Service name
        service: String,
        /// Requested type name
        expected: String,
    },

    /// LLM provider call failed
    #[error("LLM provider '{provider}' error: {message}")]
    Llm {
        /// Provider name (deepseek, openai, qianwen, mock)
        provider: String,
        /// Description of the failure
        message: String,
    },

    /// Network-related error
    #[error("Network error: {message}")]
    Network {
        /// Description of the network error
        message: String,
        /// Optional source error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Internal system error
    #[error("Internal error: {message}")]
    Internal {
        /// Description of the internal error
        message: String,
    },

    /// Infrastructure operation error
    #[error("Infrastructure error: {message}")]
    Infrastructure {
        /// Description of the infrastructure error
        message: String,
        /// Optional source error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

// Basic error creation methods
impl Error {
    /// Create a not found error
    pub fn not_found<S: Into<String>>(resource: S) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    /// Create an invalid argument error
    pub fn invalid_argument<S: Into<String>>(message: S) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Create an internal error
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

// Configuration error creation methods
impl Error {
    /// Create a configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
            source: None,
        }
    }

    /// Create a configuration error with source
    pub fn config_with_source<S: Into<String>, E: std::error::Error + Send + Sync + 'static>(
        message: S,
        source: E,
    ) -> Self {
        Self::Configuration {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}

// Service lifecycle error creation methods
impl Error {
    /// Create a circular dependency error from a cycle path
    pub fn circular_dependency(cycle: Vec<String>) -> Self {
        Self::CircularDependency { cycle }
    }

    /// Create a service unavailable error
    pub fn service_unavailable<S: Into<String>, M: Into<String>>(service: S, message: M) -> Self {
        Self::ServiceUnavailable {
            service: service.into(),
            message: message.into(),
        }
    }

    /// Create a type mismatch error for a downcast failure
    pub fn type_mismatch<S: Into<String>>(service: S, expected: &str) -> Self {
        Self::TypeMismatch {
            service: service.into(),
            expected: expected.to_string(),
        }
    }

    /// Check whether this error is a graph-level structural failure
    pub fn is_structural(&self) -> bool {
        matches!(self, Self::CircularDependency { .. })
    }
}

// Provider error creation methods
impl Error {
    /// Create an LLM provider error
    pub fn llm<P: Into<String>, M: Into<String>>(provider: P, message: M) -> Self {
        Self::Llm {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Create a network error
    pub fn network<S: Into<String>>(message: S) -> Self {
        Self::Network {
            message: message.into(),
            source: None,
        }
    }

    /// Create a network error with source
    pub fn network_with_source<S: Into<String>, E: std::error::Error + Send + Sync + 'static>(
        message: S,
        source: E,
    ) -> Self {
        Self::Network {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create an I/O error
    pub fn io<S: Into<String>>(message: S) -> Self {
        Self::Io {
            message: message.into(),
            source: None,
        }
    }

    /// Create an infrastructure error
    pub fn infrastructure<S: Into<String>>(message: S) -> Self {
        Self::Infrastructure {
            message: message.into(),
            source: None,
        }
    }

    /// Create an infrastructure error with source
    pub fn infrastructure_with_source<
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    >(
        message: S,
        source: E,
    ) -> Self {
        Self::Infrastructure {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for Error {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}
