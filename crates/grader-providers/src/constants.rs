//! Provider Constants
//!
//! Constants specific to provider implementations. Service and provider
//! names live in `grader_domain::constants`.

// ============================================================================
// LLM PROVIDER DEFAULTS
// ============================================================================

/// DeepSeek API base URL
pub const DEEPSEEK_BASE_URL: &str = "https://api.deepseek.com/v1";

/// DeepSeek default chat model
pub const DEEPSEEK_DEFAULT_MODEL: &str = "deepseek-chat";

/// OpenAI API base URL
pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// OpenAI default chat model
pub const OPENAI_DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Aliyun DashScope OpenAI-compatible base URL
pub const QIANWEN_BASE_URL: &str = "https://dashscope.aliyuncs.com/compatible-mode/v1";

/// Qianwen default chat model
pub const QIANWEN_DEFAULT_MODEL: &str = "qwen-plus";

/// Model name reported by the mock client
pub const MOCK_MODEL: &str = "mock-grader";

/// Default LLM request timeout in seconds
pub const LLM_DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Sampling temperature for grading prompts
pub const LLM_TEMPERATURE: f64 = 0.3;

/// Content type for JSON requests
pub const CONTENT_TYPE_JSON: &str = "application/json";

// ============================================================================
// REDIS CONSTANTS
// ============================================================================

/// Timeout applied to the Redis PING health check in milliseconds
pub const REDIS_PING_TIMEOUT_MS: u64 = 2000;

// ============================================================================
// NOTIFICATION CONSTANTS
// ============================================================================

/// Default pub/sub channel for user notifications
pub const NOTIFICATION_DEFAULT_CHANNEL: &str = "grader:notifications";

// ============================================================================
// SOURCE TYPE CONSTANTS
// ============================================================================

/// Source types enabled when configuration names none
pub const DEFAULT_SOURCE_TYPES: [&str; 4] = ["text", "file", "image", "pdf"];
