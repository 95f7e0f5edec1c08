//! Essay grading value objects

use serde::{Deserialize, Serialize};

/// Essay submitted for correction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EssayRequest {
    /// Essay title
    pub title: String,
    /// Essay body text
    pub content: String,
    /// Grade level of the author (e.g. "junior_high")
    #[serde(default)]
    pub grade_level: Option<String>,
    /// Source type the text was extracted from
    #[serde(default = "default_source_type")]
    pub source_type: String,
}

fn default_source_type() -> String {
    "text".to_string()
}

impl EssayRequest {
    /// Create a plain-text essay request
    pub fn new<T: Into<String>, C: Into<String>>(title: T, content: C) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            grade_level: None,
            source_type: default_source_type(),
        }
    }

    /// Number of characters in the essay body (CJK aware)
    pub fn char_count(&self) -> usize {
        self.content.chars().filter(|c| !c.is_whitespace()).count()
    }
}

/// Outcome of correcting one essay
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrectionResult {
    /// Total score out of [`crate::constants::ESSAY_MAX_SCORE`]
    pub score: f64,
    /// Overall comment
    pub summary: String,
    /// Itemized suggestions
    #[serde(default)]
    pub suggestions: Vec<String>,
    /// Provider that produced the result
    pub provider: String,
    /// True when produced by the fallback path
    #[serde(default)]
    pub degraded: bool,
}

/// Notification sent to a user about a grading job
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    /// Recipient user id
    pub user_id: String,
    /// Notification kind (e.g. "correction_completed")
    pub kind: String,
    /// Free-form message
    pub message: String,
}
