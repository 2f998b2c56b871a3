//! Context window usage reporting
//!
//! Turns a token count into the numbers a usage indicator shows: how much of
//! the model's window a conversation takes and how close it is to the limit.

use crate::context::token_counter::{normalize_model, TokenCounter};
use crate::messages::Message;
use serde::Serialize;

/// Tokens kept free for the model's reply by default.
pub const DEFAULT_RESPONSE_RESERVED: usize = 1_000;

/// Context usage information
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContextUsage {
    /// Tokens used
    pub used: usize,
    /// Tokens available for messages
    pub available: usize,
    /// Total context window size
    pub total: usize,
    /// Percentage used (0-100, may exceed 100)
    pub percentage: f64,
    /// Warning level
    pub warning_level: WarningLevel,
}

impl ContextUsage {
    /// Usage of a `total`-token window by `used` tokens, keeping
    /// `response_reserved` free for the reply
    pub fn new(used: usize, total: usize, response_reserved: usize) -> Self {
        let available = total.saturating_sub(used).saturating_sub(response_reserved);
        let percentage = if total == 0 {
            100.0
        } else {
            (used as f64 / total as f64) * 100.0
        };

        Self {
            used,
            available,
            total,
            percentage,
            warning_level: WarningLevel::from_percentage(percentage),
        }
    }

    /// Measure a conversation against a model's limits
    pub fn measure(messages: &[Message], limits: ContextLimits, model: &str) -> Self {
        let used = TokenCounter::new(model).count_messages(messages);
        Self::new(used, limits.max_tokens, limits.response_reserved)
    }

    /// Medium warning or worse
    pub fn is_approaching_limit(&self) -> bool {
        self.warning_level >= WarningLevel::Medium
    }

    pub fn is_critical(&self) -> bool {
        self.warning_level == WarningLevel::Critical
    }
}

/// How full the window is, ordered from empty to full
///
/// Bands by percentage used: below 50, 50, 70, 85 and 95 and above.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WarningLevel {
    None,
    Low,
    Medium,
    High,
    Critical,
}

impl WarningLevel {
    /// Classify a usage percentage
    pub fn from_percentage(percentage: f64) -> Self {
        if percentage >= 95.0 {
            WarningLevel::Critical
        } else if percentage >= 85.0 {
            WarningLevel::High
        } else if percentage >= 70.0 {
            WarningLevel::Medium
        } else if percentage >= 50.0 {
            WarningLevel::Low
        } else {
            WarningLevel::None
        }
    }
}

impl std::fmt::Display for WarningLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            WarningLevel::None => "none",
            WarningLevel::Low => "low",
            WarningLevel::Medium => "medium",
            WarningLevel::High => "high",
            WarningLevel::Critical => "critical",
        };
        f.write_str(label)
    }
}

/// Context window limits for a model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ContextLimits {
    /// Maximum tokens for the model
    pub max_tokens: usize,
    /// Reserved tokens for response
    pub response_reserved: usize,
}

impl ContextLimits {
    /// Create context limits for a specific model
    pub fn for_model(model: &str) -> Self {
        let model = normalize_model(model);
        let max_tokens = if model.contains("gpt-4.1") {
            1_047_576
        } else if model.contains("gpt-4o") || model.contains("gpt-4-turbo") {
            128_000
        } else if model.contains("gpt-4-32k") {
            32_768
        } else if model.contains("gpt-4") {
            8_192
        } else if model.contains("gpt-3.5") {
            16_385
        } else if model.starts_with("o1") || model.starts_with("o3") || model.starts_with("o4") {
            128_000
        } else if model.contains("claude") {
            200_000
        } else if model.contains("gemini") {
            1_048_576
        } else {
            // Default conservative limit
            8_192
        };

        Self {
            max_tokens,
            response_reserved: DEFAULT_RESPONSE_RESERVED,
        }
    }

    /// Override the response reservation
    pub fn with_response_reserved(mut self, response_reserved: usize) -> Self {
        self.response_reserved = response_reserved;
        self
    }

    /// Get available tokens for conversation history
    pub fn available_for_history(&self) -> usize {
        self.max_tokens.saturating_sub(self.response_reserved)
    }
}
