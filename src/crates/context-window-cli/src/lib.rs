//! Command implementations for `ctxwin`.
//!
//! Each command reads a chat history file (a JSON array of messages), runs it
//! through the context window library and renders plain text or JSON. The
//! binary in `main.rs` only parses arguments and prints.

use anyhow::{Context, Result};
use context_window::{
    ContextSettings, ContextTrimmer, ContextUsage, Message, TokenCounter, TrimReport,
};
use serde::Serialize;
use std::fmt::Write;
use std::path::Path;

/// Cost of one message in a history
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessageCost {
    /// Position in the history (0 = oldest)
    pub index: usize,
    /// Role label
    pub role: String,
    /// Token cost including overhead and tool payloads
    pub tokens: usize,
}

/// Token costs of a whole history
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CountReport {
    /// Model the costs were measured for
    pub model: String,
    /// Per-message costs in history order
    pub messages: Vec<MessageCost>,
    /// Sum of all message costs
    pub total: usize,
}

/// Read a history file
pub fn load_history(path: &Path) -> Result<Vec<Message>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read history file {}", path.display()))?;
    let messages: Vec<Message> = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse history file {}", path.display()))?;

    tracing::debug!(path = %path.display(), messages = messages.len(), "Loaded history");
    Ok(messages)
}

/// Measure every message of a history
pub fn count_history(messages: &[Message], model: &str) -> CountReport {
    let counter = TokenCounter::new(model);
    let costs: Vec<MessageCost> = messages
        .iter()
        .enumerate()
        .map(|(index, message)| MessageCost {
            index,
            role: message.role.to_string(),
            tokens: counter.count_message(message),
        })
        .collect();
    let total = costs.iter().map(|c| c.tokens).sum();

    CountReport {
        model: model.to_string(),
        messages: costs,
        total,
    }
}

/// Render a count report as an aligned table
pub fn render_count(report: &CountReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Model: {}", report.model);
    for cost in &report.messages {
        let _ = writeln!(out, "{:>5}  {:<9} {:>7}", cost.index, cost.role, cost.tokens);
    }
    let _ = writeln!(out, "Total: {} tokens", report.total);
    out
}

/// Usage of the settings' context window by a history
pub fn usage_for(messages: &[Message], settings: &ContextSettings) -> ContextUsage {
    ContextUsage::measure(messages, settings.limits(), &settings.model)
}

/// Render usage as a one-line summary
pub fn render_usage(usage: &ContextUsage) -> String {
    format!(
        "{} / {} tokens ({:.1}%), {} available for history, warning: {}",
        usage.used, usage.total, usage.percentage, usage.available, usage.warning_level
    )
}

/// Trim a history to `max_tokens`, or to the settings' history budget
pub fn trim_history(
    messages: &[Message],
    settings: &ContextSettings,
    max_tokens: Option<usize>,
) -> Result<(Vec<Message>, TrimReport)> {
    let budget = max_tokens.unwrap_or_else(|| settings.history_budget());
    let trimmer = ContextTrimmer::new(&settings.model, budget)?;
    Ok(trimmer.trim_with_report(messages))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_history() {
        let messages = vec![Message::system("Be brief."), Message::user("hi")];
        let report = count_history(&messages, "gpt-4");

        assert_eq!(report.messages.len(), 2);
        assert_eq!(report.messages[1].role, "user");
        assert_eq!(report.total, report.messages.iter().map(|c| c.tokens).sum::<usize>());
    }

    #[test]
    fn test_render_count() {
        let report = count_history(&[Message::user("hi")], "gpt-4");
        let text = render_count(&report);

        assert!(text.starts_with("Model: gpt-4\n"));
        assert!(text.contains("user"));
        assert!(text.ends_with("Total: 5 tokens\n"));
    }

    #[test]
    fn test_render_usage() {
        let usage = ContextUsage::new(500, 1_000, 100);
        assert_eq!(
            render_usage(&usage),
            "500 / 1000 tokens (50.0%), 400 available for history, warning: low"
        );
    }

    #[test]
    fn test_trim_history_rejects_zero_budget() {
        let settings = ContextSettings::default();
        assert!(trim_history(&[Message::user("hi")], &settings, Some(0)).is_err());
    }
}
