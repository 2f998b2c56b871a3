//! Context window management for LLM conversations
//!
//! This module provides token counting, budget-bounded trimming, and usage
//! reporting for chat histories.

pub mod token_counter;
pub mod trimmer;
pub mod usage;

pub use token_counter::{
    cost_of_message, cost_of_sequence, cost_of_text, Encoding, TokenCounter, DEFAULT_MODEL,
    ROLE_OVERHEAD_TOKENS,
};
pub use trimmer::{trim, ContextTrimmer, TrimReport};
pub use usage::{ContextLimits, ContextUsage, WarningLevel};
