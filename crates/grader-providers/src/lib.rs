//! # Grader - Provider Implementations
//!
//! Concrete collaborators managed by the service container. Each type
//! implements [`ManagedService`] and declares its optional capabilities
//! ([`HealthCheckable`], [`MetricsSource`]) explicitly.
//!
//! | Service | Type | Capabilities |
//! |---------|------|--------------|
//! | `redis` | [`RedisService`] | health (PING), metrics, pub/sub |
//! | `ai_client_factory` | [`AiClientFactory`] | health, metrics |
//! | `correction_service` | [`CorrectionService`] | health, metrics |
//! | `notification_service` | [`NotificationService`] | metrics |
//! | `source_type_manager` | [`SourceTypeManager`] | metrics |

pub use grader_domain::error::{Error, Result};
pub use grader_domain::ports::{HealthCheckable, ManagedService, MetricsSource};

/// Provider-specific constants
pub mod constants;

/// Shared utilities for provider implementations
pub mod utils;

/// LLM clients and the per-provider client factory
pub mod llm;

/// Redis connection service
pub mod redis;

/// Essay correction service
pub mod correction;

/// User notification service
pub mod notification;

/// Essay source-type registry
pub mod source_types;

pub use correction::CorrectionService;
pub use llm::{AiClientFactory, LlmClientSettings, MockLlmClient, OpenAiCompatibleClient};
pub use notification::NotificationService;
pub use redis::RedisService;
pub use source_types::{SourceType, SourceTypeManager};
