//! HTTP Response Utilities
//!
//! Helper functions for processing responses from LLM provider APIs.

use grader_domain::error::{Error, Result};
use reqwest::Response;

/// Utilities for processing HTTP responses
pub struct HttpResponseUtils;

impl HttpResponseUtils {
    /// Check response status and parse JSON
    ///
    /// Non-success statuses become [`Error::Llm`] with a short reason
    /// derived from the status code.
    pub async fn check_and_parse(
        response: Response,
        provider_name: &str,
    ) -> Result<serde_json::Value> {
        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            let code = status.as_u16();
            let reason = match code {
                401 => "authentication failed".to_string(),
                429 => "rate limit exceeded".to_string(),
                500..=599 => format!("server error ({code})"),
                _ => format!("request failed ({code})"),
            };
            return Err(Error::llm(provider_name, format!("{reason}: {error_text}")));
        }

        response
            .json()
            .await
            .map_err(|e| Error::llm(provider_name, format!("response parse failed: {e}")))
    }
}
