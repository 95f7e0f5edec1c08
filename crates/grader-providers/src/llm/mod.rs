//! LLM clients
//!
//! - [`OpenAiCompatibleClient`] talks to any chat-completions endpoint
//!   (DeepSeek, OpenAI, Qianwen compatible mode)
//! - [`MockLlmClient`] answers offline with a fixed grading payload
//! - [`AiClientFactory`] hands out clients per provider name

mod factory;
mod mock;
mod openai_compatible;

pub use factory::{AiClientFactory, LlmClientSettings};
pub use mock::MockLlmClient;
pub use openai_compatible::OpenAiCompatibleClient;
