//! Context window trimming
//!
//! Selects the part of a conversation that fits a token budget. System
//! messages are always kept; the rest of the window is filled from the newest
//! message backwards and stops at the first message that does not fit, so the
//! admitted history is always one unbroken trailing run.

use crate::context::token_counter::TokenCounter;
use crate::error::{ContextError, Result};
use crate::messages::Message;
use tracing::{debug, warn};

/// Outcome of a trim, for logging and usage display
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TrimReport {
    /// Messages admitted (system messages included)
    pub kept: usize,
    /// Non-system messages left out
    pub dropped: usize,
    /// Total cost of the admitted messages
    pub tokens_used: usize,
    /// Cost of the system messages alone
    pub system_tokens: usize,
    /// System messages alone use the whole budget, leaving no room for history
    pub system_fills_budget: bool,
    /// System messages alone exceed the budget
    pub system_over_budget: bool,
}

/// Context trimmer for a model and token budget
#[derive(Debug, Clone)]
pub struct ContextTrimmer {
    /// Token counter
    counter: TokenCounter,
    /// Maximum tokens to keep
    max_tokens: usize,
}

impl ContextTrimmer {
    /// Create a new context trimmer
    ///
    /// Fails with [`ContextError::InvalidBudget`] when `max_tokens` is zero.
    pub fn new(model: impl Into<String>, max_tokens: usize) -> Result<Self> {
        Self::with_counter(TokenCounter::new(model), max_tokens)
    }

    /// Create a trimmer around an existing counter
    pub fn with_counter(counter: TokenCounter, max_tokens: usize) -> Result<Self> {
        if max_tokens == 0 {
            return Err(ContextError::InvalidBudget { max_tokens });
        }

        Ok(Self {
            counter,
            max_tokens,
        })
    }

    /// Token budget
    pub fn max_tokens(&self) -> usize {
        self.max_tokens
    }

    /// Token counter used for costs
    pub fn counter(&self) -> &TokenCounter {
        &self.counter
    }

    /// Trim messages to fit within the token budget
    pub fn trim_messages(&self, messages: &[Message]) -> Vec<Message> {
        self.trim_with_report(messages).0
    }

    /// Trim messages and report what was kept
    ///
    /// Returns the system messages in their original order, followed by the
    /// longest trailing run of non-system messages that fits in what the
    /// system messages leave of the budget. If the system messages alone use
    /// the whole budget, only they are returned, even when they exceed it.
    pub fn trim_with_report(&self, messages: &[Message]) -> (Vec<Message>, TrimReport) {
        let (system, others): (Vec<&Message>, Vec<&Message>) =
            messages.iter().partition(|m| m.is_system());

        let system_tokens: usize = system.iter().map(|m| self.counter.count_message(m)).sum();

        if system_tokens >= self.max_tokens {
            let system_over_budget = system_tokens > self.max_tokens;
            warn!(
                model = %self.counter.model(),
                system_tokens,
                max_tokens = self.max_tokens,
                dropped = others.len(),
                "System messages alone fill the token budget"
            );

            let report = TrimReport {
                kept: system.len(),
                dropped: others.len(),
                tokens_used: system_tokens,
                system_tokens,
                system_fills_budget: true,
                system_over_budget,
            };
            return (system.into_iter().cloned().collect(), report);
        }

        // Walk from the newest message; stop at the first one that does not fit.
        let mut running = system_tokens;
        let mut admitted = 0;
        for message in others.iter().rev() {
            let cost = self.counter.count_message(message);
            if running + cost > self.max_tokens {
                break;
            }
            running += cost;
            admitted += 1;
        }

        let start = others.len() - admitted;
        let mut result = Vec::with_capacity(system.len() + admitted);
        result.extend(system.iter().map(|m| (*m).clone()));
        result.extend(others[start..].iter().map(|m| (*m).clone()));

        let report = TrimReport {
            kept: result.len(),
            dropped: start,
            tokens_used: running,
            system_tokens,
            system_fills_budget: false,
            system_over_budget: false,
        };

        debug!(
            model = %self.counter.model(),
            kept = report.kept,
            dropped = report.dropped,
            tokens_used = report.tokens_used,
            max_tokens = self.max_tokens,
            "Trimmed context window"
        );

        (result, report)
    }

    /// Calculate tokens saved by trimming
    pub fn tokens_saved(&self, original: &[Message], trimmed: &[Message]) -> usize {
        let original_count = self.counter.count_messages(original);
        let trimmed_count = self.counter.count_messages(trimmed);
        original_count.saturating_sub(trimmed_count)
    }
}

/// Trim `messages` to `max_tokens` under `model`.
///
/// See [`ContextTrimmer::trim_with_report`] for the selection rules.
pub fn trim(messages: &[Message], max_tokens: usize, model: &str) -> Result<Vec<Message>> {
    Ok(ContextTrimmer::new(model, max_tokens)?.trim_messages(messages))
}
