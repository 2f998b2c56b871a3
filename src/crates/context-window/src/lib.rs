//! Context window management for chat conversations.
//!
//! Decides which prior messages fit into a bounded token budget before each
//! request to a language model, and measures token cost consistently across
//! plain messages, tool calls, and tool results.
//!
//! # Modules
//!
//! - [`messages`] - Message, role, tool call and tool result types
//! - [`context`] - Token counting, trimming, and usage reporting
//! - [`config`] - Model and budget settings (file + environment)
//! - [`error`] - Error types
//!
//! # Example
//!
//! ```rust,ignore
//! use context_window::{cost_of_sequence, trim, Message};
//!
//! let history = vec![
//!     Message::system("You are a helpful planning assistant."),
//!     Message::user("What is due tomorrow?"),
//!     Message::assistant("Two tasks: the report and the dentist."),
//!     Message::user("Move the dentist to Friday."),
//! ];
//!
//! let used = cost_of_sequence(&history, "gpt-4o");
//! let window = trim(&history, 4_000, "gpt-4o")?;
//! ```
//!
//! All operations are pure and synchronous; nothing here performs network
//! I/O, and the only disk access is the explicit settings loader.

pub mod config;
pub mod context;
pub mod error;
pub mod messages;

pub use config::{ContextSettings, ValidateConfig};
pub use context::{
    cost_of_message, cost_of_sequence, cost_of_text, trim, ContextLimits, ContextTrimmer,
    ContextUsage, Encoding, TokenCounter, TrimReport, WarningLevel, DEFAULT_MODEL,
    ROLE_OVERHEAD_TOKENS,
};
pub use error::{ContextError, Result};
pub use messages::{Message, MessageRole, ToolCall, ToolResult};
