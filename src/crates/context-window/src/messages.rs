//! Conversation message types
//!
//! The message shape consumed by the token meter and the context trimmer.
//! Messages are plain values: the trimmer only ever selects and clones them,
//! it never edits content.
//!
//! # Serialization Format
//!
//! ```json
//! {
//!   "role": "assistant",
//!   "content": "Creating the task now.",
//!   "toolCalls": [
//!     {"id": "1", "name": "crear_tarea", "argumentsJson": "{\"title\":\"x\"}"}
//!   ]
//! }
//! ```

use serde::{Deserialize, Serialize};

/// Role of a message sender.
///
/// Only [`MessageRole::System`] carries trimming semantics: system messages
/// are mandatory and are never dropped from a context window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// Mandatory instruction to the model (persona, behavior preamble).
    System,

    /// End-user input.
    #[serde(alias = "human")]
    User,

    /// Model output.
    #[serde(alias = "ai")]
    Assistant,
}

impl MessageRole {
    /// Lowercase label used on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageRole::System => "system",
            MessageRole::User => "user",
            MessageRole::Assistant => "assistant",
        }
    }
}

impl std::fmt::Display for MessageRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured invocation requested by the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolCall {
    /// Identifier echoed back by the matching [`ToolResult`]
    pub id: String,
    /// Tool name
    pub name: String,
    /// Arguments as a JSON document (kept as text, never re-parsed here)
    pub arguments_json: String,
}

impl ToolCall {
    /// Create a tool call
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        arguments_json: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            arguments_json: arguments_json.into(),
        }
    }

    /// Canonical JSON text of this call, as the model receives it.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

/// Result of executing a [`ToolCall`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolResult {
    /// Id of the call this result answers
    pub tool_call_id: String,
    /// Result payload as a JSON document
    pub result_json: String,
    /// Whether the tool succeeded
    pub success: bool,
}

impl ToolResult {
    /// Create a tool result
    pub fn new(
        tool_call_id: impl Into<String>,
        result_json: impl Into<String>,
        success: bool,
    ) -> Self {
        Self {
            tool_call_id: tool_call_id.into(),
            result_json: result_json.into(),
            success,
        }
    }

    /// Canonical JSON text of this result, as the model receives it.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

/// A single conversation message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    /// Role of the message sender
    pub role: MessageRole,

    /// Text body (may be empty)
    #[serde(default)]
    pub content: String,

    /// Tool calls (for assistant messages)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<ToolCall>>,

    /// Tool results attached to this message
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_results: Option<Vec<ToolResult>>,
}

impl Message {
    /// Create a new message with the given role and content
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            tool_calls: None,
            tool_results: None,
        }
    }

    /// Create a system message
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(MessageRole::System, content)
    }

    /// Create a user message
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(MessageRole::User, content)
    }

    /// Create an assistant message
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(MessageRole::Assistant, content)
    }

    /// Set tool calls
    pub fn with_tool_calls(mut self, tool_calls: Vec<ToolCall>) -> Self {
        self.tool_calls = Some(tool_calls);
        self
    }

    /// Set tool results
    pub fn with_tool_results(mut self, tool_results: Vec<ToolResult>) -> Self {
        self.tool_results = Some(tool_results);
        self
    }

    /// Whether this message is a mandatory system instruction
    pub fn is_system(&self) -> bool {
        self.role == MessageRole::System
    }

    /// Attached tool calls, empty when absent
    pub fn tool_calls(&self) -> &[ToolCall] {
        self.tool_calls.as_deref().unwrap_or(&[])
    }

    /// Attached tool results, empty when absent
    pub fn tool_results(&self) -> &[ToolResult] {
        self.tool_results.as_deref().unwrap_or(&[])
    }
}
