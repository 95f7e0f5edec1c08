//! Domain layer constants
//!
//! Well-known service names and grading limits shared by every layer.
//! Infrastructure-specific constants remain in `grader_infrastructure::constants`.

// ============================================================================
// SERVICE NAMES
// ============================================================================

/// Redis connection service
pub const SERVICE_REDIS: &str = "redis";

/// Factory producing LLM clients per provider
pub const SERVICE_AI_CLIENT_FACTORY: &str = "ai_client_factory";

/// Essay correction service (depends on the AI client factory)
pub const SERVICE_CORRECTION: &str = "correction_service";

/// Notification service (depends on Redis)
pub const SERVICE_NOTIFICATION: &str = "notification_service";

/// Essay source-type manager
pub const SERVICE_SOURCE_TYPE_MANAGER: &str = "source_type_manager";

/// Services the bootstrap falls back to when the ordered pass fails
pub const CRITICAL_SERVICES: [&str; 2] = [SERVICE_REDIS, SERVICE_AI_CLIENT_FACTORY];

// ============================================================================
// LLM PROVIDER NAMES
// ============================================================================

/// DeepSeek provider
pub const PROVIDER_DEEPSEEK: &str = "deepseek";

/// OpenAI provider
pub const PROVIDER_OPENAI: &str = "openai";

/// Aliyun Qianwen provider (OpenAI-compatible mode)
pub const PROVIDER_QIANWEN: &str = "qianwen";

/// Offline mock provider used for degraded grading
pub const PROVIDER_MOCK: &str = "mock";

// ============================================================================
// GRADING CONSTANTS
// ============================================================================

/// Maximum score for a composition
pub const ESSAY_MAX_SCORE: f64 = 100.0;

/// Score reported by the degraded (mock) grading path
pub const ESSAY_FALLBACK_SCORE: f64 = 60.0;
