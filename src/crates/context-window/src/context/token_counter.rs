//! Token counting for different LLM models
//!
//! Costs are measured with the BPE encoding the model uses (via `tiktoken-rs`).
//! Counting never fails: if an encoding cannot be loaded, or encoding a piece
//! of text breaks, the counter degrades to a character-based estimate.

use crate::messages::{Message, ToolCall, ToolResult};
use std::panic::{self, AssertUnwindSafe};
use std::sync::OnceLock;
use tiktoken_rs::CoreBPE;
use tracing::{debug, warn};

/// Tokens charged per message for the role label and message framing.
pub const ROLE_OVERHEAD_TOKENS: usize = 4;

/// Characters per token assumed by the fallback estimate.
pub const CHARS_PER_TOKEN: usize = 4;

/// Model used when none is configured.
pub const DEFAULT_MODEL: &str = "gpt-4o";

/// BPE encodings known to the counter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Encoding {
    /// GPT-4o, GPT-4.1, GPT-5 and the o-series reasoning models
    O200kBase,
    /// GPT-4, GPT-3.5 and embeddings; also the default for unknown models
    Cl100kBase,
    /// Codex and `text-davinci-002/003`
    P50kBase,
    /// Legacy GPT-3 models
    R50kBase,
}

/// Model name prefixes, most specific first. The first match wins.
const MODEL_PREFIXES: &[(&str, Encoding)] = &[
    ("gpt-4o", Encoding::O200kBase),
    ("chatgpt-4o", Encoding::O200kBase),
    ("gpt-4.1", Encoding::O200kBase),
    ("gpt-4.5", Encoding::O200kBase),
    ("gpt-5", Encoding::O200kBase),
    ("o1", Encoding::O200kBase),
    ("o3", Encoding::O200kBase),
    ("o4", Encoding::O200kBase),
    ("gpt-4", Encoding::Cl100kBase),
    ("gpt-3.5", Encoding::Cl100kBase),
    ("gpt-35", Encoding::Cl100kBase),
    ("text-embedding-", Encoding::Cl100kBase),
    ("text-davinci-002", Encoding::P50kBase),
    ("text-davinci-003", Encoding::P50kBase),
    ("code-", Encoding::P50kBase),
    ("davinci", Encoding::R50kBase),
    ("curie", Encoding::R50kBase),
    ("babbage", Encoding::R50kBase),
    ("ada", Encoding::R50kBase),
];

/// Lowercased model name without surrounding whitespace or a `provider/` prefix.
pub(crate) fn normalize_model(model: &str) -> String {
    let name = model.trim().to_lowercase();
    name.rsplit('/').next().unwrap_or_default().to_string()
}

impl Encoding {
    /// General-purpose encoding used for models without a known table
    pub const DEFAULT: Encoding = Encoding::Cl100kBase;

    /// Select the encoding for a model name.
    ///
    /// Matching is case-insensitive and ignores a `provider/` prefix, so
    /// `openai/GPT-4o` resolves like `gpt-4o`. Unknown models (Claude, Llama,
    /// made-up names) get [`Encoding::DEFAULT`].
    pub fn for_model(model: &str) -> Self {
        let name = normalize_model(model);

        MODEL_PREFIXES
            .iter()
            .find(|(prefix, _)| name.starts_with(prefix))
            .map(|(_, encoding)| *encoding)
            .unwrap_or(Self::DEFAULT)
    }

    /// Table name as used by tiktoken
    pub fn name(&self) -> &'static str {
        match self {
            Encoding::O200kBase => "o200k_base",
            Encoding::Cl100kBase => "cl100k_base",
            Encoding::P50kBase => "p50k_base",
            Encoding::R50kBase => "r50k_base",
        }
    }

    /// Shared encoder for this table, built on first use.
    ///
    /// `None` means the table failed to load; the failure is remembered so
    /// the warning is logged once per process.
    fn bpe(self) -> Option<&'static CoreBPE> {
        static O200K: OnceLock<Option<CoreBPE>> = OnceLock::new();
        static CL100K: OnceLock<Option<CoreBPE>> = OnceLock::new();
        static P50K: OnceLock<Option<CoreBPE>> = OnceLock::new();
        static R50K: OnceLock<Option<CoreBPE>> = OnceLock::new();

        let cell = match self {
            Encoding::O200kBase => &O200K,
            Encoding::Cl100kBase => &CL100K,
            Encoding::P50kBase => &P50K,
            Encoding::R50kBase => &R50K,
        };

        cell.get_or_init(|| match self.load() {
            Ok(bpe) => Some(bpe),
            Err(e) => {
                warn!(
                    encoding = self.name(),
                    error = %e,
                    "Failed to load BPE encoding, token counts will be estimated"
                );
                None
            }
        })
        .as_ref()
    }

    fn load(self) -> Result<CoreBPE, String> {
        let loaded = match self {
            Encoding::O200kBase => tiktoken_rs::o200k_base(),
            Encoding::Cl100kBase => tiktoken_rs::cl100k_base(),
            Encoding::P50kBase => tiktoken_rs::p50k_base(),
            Encoding::R50kBase => tiktoken_rs::r50k_base(),
        };
        loaded.map_err(|e| e.to_string())
    }
}

impl std::fmt::Display for Encoding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Token counter bound to one model
///
/// Resolves the model's encoding once; every count is a pure function of the
/// text and that encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenCounter {
    /// Model name for token counting
    model: String,
    /// Encoding selected for the model
    encoding: Encoding,
}

impl TokenCounter {
    /// Create a new token counter for a specific model
    pub fn new(model: impl Into<String>) -> Self {
        let model = model.into();
        let encoding = Encoding::for_model(&model);

        Self { model, encoding }
    }

    /// Model this counter was created for
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Encoding used for counting
    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    /// Character-based estimate: `ceil(chars / 4)`.
    pub fn estimate(text: &str) -> usize {
        text.chars().count().div_ceil(CHARS_PER_TOKEN)
    }

    /// Count tokens in a text string
    ///
    /// A panic inside the encoder (e.g. fancy-regex giving up on a very long
    /// run of one character) is caught and the estimate is returned instead.
    /// This needs `panic = "unwind"`; with `abort` the process dies.
    pub fn count_text(&self, text: &str) -> usize {
        if text.is_empty() {
            return 0;
        }

        let Some(bpe) = self.encoding.bpe() else {
            debug!(model = %self.model, "No encoder available, estimating tokens");
            return Self::estimate(text);
        };

        // Special-token markers in user text are counted as plain text.
        match panic::catch_unwind(AssertUnwindSafe(|| bpe.encode_ordinary(text).len())) {
            Ok(tokens) => tokens,
            Err(_) => {
                warn!(
                    model = %self.model,
                    encoding = self.encoding.name(),
                    "Encoding failed, estimating tokens"
                );
                Self::estimate(text)
            }
        }
    }

    /// Count tokens in a tool call (its canonical JSON text)
    pub fn count_tool_call(&self, call: &ToolCall) -> usize {
        self.count_text(&call.to_json())
    }

    /// Count tokens in a tool result (its canonical JSON text)
    pub fn count_tool_result(&self, result: &ToolResult) -> usize {
        self.count_text(&result.to_json())
    }

    /// Count tokens in a message
    ///
    /// Content, plus [`ROLE_OVERHEAD_TOKENS`], plus every attached tool call
    /// and tool result.
    pub fn count_message(&self, message: &Message) -> usize {
        let mut total = ROLE_OVERHEAD_TOKENS + self.count_text(&message.content);

        for call in message.tool_calls() {
            total += self.count_tool_call(call);
        }
        for result in message.tool_results() {
            total += self.count_tool_result(result);
        }

        total
    }

    /// Count tokens in multiple messages
    ///
    /// Exactly the sum of [`count_message`](Self::count_message); no
    /// per-conversation overhead is added.
    pub fn count_messages(&self, messages: &[Message]) -> usize {
        messages.iter().map(|m| self.count_message(m)).sum()
    }

    /// Check whether messages fit in a token limit
    pub fn fits_in_context(&self, messages: &[Message], max_tokens: usize) -> bool {
        self.count_messages(messages) <= max_tokens
    }
}

impl Default for TokenCounter {
    fn default() -> Self {
        Self::new(DEFAULT_MODEL)
    }
}

/// Token cost of `text` under `model`.
pub fn cost_of_text(text: &str, model: &str) -> usize {
    TokenCounter::new(model).count_text(text)
}

/// Token cost of one message under `model`, including role overhead and
/// tool payloads.
pub fn cost_of_message(message: &Message, model: &str) -> usize {
    TokenCounter::new(model).count_message(message)
}

/// Token cost of a message sequence under `model`.
pub fn cost_of_sequence(messages: &[Message], model: &str) -> usize {
    TokenCounter::new(model).count_messages(messages)
}
