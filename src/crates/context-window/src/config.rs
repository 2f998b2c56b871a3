//! Context window settings.
//!
//! The chat handler owns the active model and token budget. They can be
//! loaded from a YAML or JSON file and overridden by environment variables:
//!
//! - `CONTEXT_WINDOW_MODEL`
//! - `CONTEXT_WINDOW_MAX_TOKENS`
//! - `CONTEXT_WINDOW_RESPONSE_RESERVED`
//!
//! # Example
//!
//! ```rust,ignore
//! use context_window::config::ContextSettings;
//!
//! let settings = ContextSettings::load(Some(Path::new("context.yaml")))?;
//! let trimmer = settings.trimmer()?;
//! let window = trimmer.trim_messages(&history);
//! ```

use crate::context::token_counter::DEFAULT_MODEL;
use crate::context::trimmer::ContextTrimmer;
use crate::context::usage::{ContextLimits, DEFAULT_RESPONSE_RESERVED};
use crate::error::{ContextError, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Environment variable overriding the model name.
pub const ENV_MODEL: &str = "CONTEXT_WINDOW_MODEL";
/// Environment variable overriding the token budget.
pub const ENV_MAX_TOKENS: &str = "CONTEXT_WINDOW_MAX_TOKENS";
/// Environment variable overriding the response reservation.
pub const ENV_RESPONSE_RESERVED: &str = "CONTEXT_WINDOW_RESPONSE_RESERVED";

/// Default token budget for a request.
pub const DEFAULT_MAX_TOKENS: usize = 8_000;

/// Trait for validating configuration.
pub trait ValidateConfig {
    /// Validate the configuration, returning an error if invalid.
    fn validate(&self) -> Result<()>;
}

/// Model and budget used when building a chat request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContextSettings {
    /// Model name selecting the token encoding
    pub model: String,
    /// Upper bound on request tokens (history plus reply reservation)
    pub max_tokens: usize,
    /// Tokens kept free for the model's reply
    pub response_reserved: usize,
}

impl Default for ContextSettings {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            response_reserved: DEFAULT_RESPONSE_RESERVED,
        }
    }
}

impl ContextSettings {
    /// Defaults sized to the model's context window
    pub fn for_model(model: impl Into<String>) -> Self {
        let model = model.into();
        let limits = ContextLimits::for_model(&model);

        Self {
            model,
            max_tokens: limits.max_tokens,
            response_reserved: limits.response_reserved,
        }
    }

    /// Load settings from an optional file, apply environment overrides and
    /// validate the result.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = match path {
            Some(path) => load_config_file(path)?,
            None => Self::default(),
        };
        settings.apply_env()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Apply `CONTEXT_WINDOW_*` environment overrides.
    pub fn apply_env(&mut self) -> Result<()> {
        if let Ok(model) = std::env::var(ENV_MODEL) {
            debug!(model = %model, "Model overridden from environment");
            self.model = model;
        }
        if std::env::var(ENV_MAX_TOKENS).is_ok() {
            self.max_tokens = get_env_parse(ENV_MAX_TOKENS)?;
        }
        if std::env::var(ENV_RESPONSE_RESERVED).is_ok() {
            self.response_reserved = get_env_parse(ENV_RESPONSE_RESERVED)?;
        }
        Ok(())
    }

    /// Budget left for conversation history
    pub fn history_budget(&self) -> usize {
        self.max_tokens.saturating_sub(self.response_reserved)
    }

    /// Context limits described by these settings
    pub fn limits(&self) -> ContextLimits {
        ContextLimits {
            max_tokens: self.max_tokens,
            response_reserved: self.response_reserved,
        }
    }

    /// Build a trimmer for the history budget
    pub fn trimmer(&self) -> Result<ContextTrimmer> {
        ContextTrimmer::new(&self.model, self.history_budget())
    }
}

impl ValidateConfig for ContextSettings {
    fn validate(&self) -> Result<()> {
        if self.model.trim().is_empty() {
            return Err(ContextError::Config("model name must not be empty".to_string()));
        }
        if self.max_tokens == 0 {
            return Err(ContextError::Config(
                "max_tokens must be greater than zero".to_string(),
            ));
        }
        if self.response_reserved >= self.max_tokens {
            return Err(ContextError::Config(format!(
                "response_reserved ({}) must be smaller than max_tokens ({})",
                self.response_reserved, self.max_tokens
            )));
        }
        Ok(())
    }
}

/// Get an environment variable and parse it to the specified type.
pub fn get_env_parse<T: std::str::FromStr>(key: &str) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    let value = std::env::var(key).map_err(|e| {
        ContextError::Config(format!("Environment variable '{}' not found: {}", key, e))
    })?;
    value.trim().parse::<T>().map_err(|e| {
        ContextError::Config(format!(
            "Failed to parse environment variable '{}': {}",
            key, e
        ))
    })
}

/// Load configuration from a YAML file.
pub fn load_yaml_config<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T> {
    let content = std::fs::read_to_string(path.as_ref())?;
    serde_yaml::from_str(&content).map_err(|e| {
        ContextError::Config(format!(
            "Failed to parse YAML config from {:?}: {}",
            path.as_ref(),
            e
        ))
    })
}

/// Load configuration from a JSON file.
pub fn load_json_config<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T> {
    let content = std::fs::read_to_string(path.as_ref())?;
    serde_json::from_str(&content).map_err(|e| {
        ContextError::Config(format!(
            "Failed to parse JSON config from {:?}: {}",
            path.as_ref(),
            e
        ))
    })
}

/// Load configuration from a file (auto-detect format from extension).
pub fn load_config_file<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .ok_or_else(|| {
            ContextError::Config(format!("Unable to determine file extension for {:?}", path))
        })?;

    match extension.to_lowercase().as_str() {
        "yaml" | "yml" => load_yaml_config(path),
        "json" => load_json_config(path),
        _ => Err(ContextError::Config(format!(
            "Unsupported config file extension: {}",
            extension
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    // Tests that set CONTEXT_WINDOW_* variables live in tests/settings_tests.rs

    #[test]
    fn test_defaults_are_valid() {
        let settings = ContextSettings::default();
        assert_eq!(settings.model, DEFAULT_MODEL);
        assert!(settings.validate().is_ok());
        assert_eq!(settings.history_budget(), DEFAULT_MAX_TOKENS - DEFAULT_RESPONSE_RESERVED);
    }

    #[test]
    fn test_for_model() {
        let settings = ContextSettings::for_model("claude-3-opus");
        assert_eq!(settings.max_tokens, 200_000);
        assert_eq!(settings.limits(), ContextLimits::for_model("claude-3-opus"));
    }

    #[test]
    fn test_validate_rejects_zero_budget() {
        let settings = ContextSettings {
            max_tokens: 0,
            response_reserved: 0,
            ..Default::default()
        };
        assert!(matches!(settings.validate(), Err(ContextError::Config(_))));
    }

    #[test]
    fn test_validate_rejects_reservation_covering_budget() {
        let settings = ContextSettings {
            max_tokens: 500,
            response_reserved: 500,
            ..Default::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_empty_model() {
        let settings = ContextSettings {
            model: "  ".to_string(),
            ..Default::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_trimmer_uses_history_budget() {
        let settings = ContextSettings {
            model: "gpt-4".to_string(),
            max_tokens: 4_000,
            response_reserved: 1_000,
        };
        let trimmer = settings.trimmer().unwrap();
        assert_eq!(trimmer.max_tokens(), 3_000);
        assert_eq!(trimmer.counter().model(), "gpt-4");
    }

    #[test]
    fn test_load_yaml_config() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("context.yaml");
        fs::write(&path, "model: gpt-4\nmax_tokens: 2000\n").unwrap();

        let settings: ContextSettings = load_config_file(&path).unwrap();
        assert_eq!(settings.model, "gpt-4");
        assert_eq!(settings.max_tokens, 2_000);
        assert_eq!(settings.response_reserved, DEFAULT_RESPONSE_RESERVED);
    }

    #[test]
    fn test_load_json_config() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("context.json");
        fs::write(
            &path,
            r#"{"model": "gpt-4o", "max_tokens": 16000, "response_reserved": 2000}"#,
        )
        .unwrap();

        let settings: ContextSettings = load_config_file(&path).unwrap();
        assert_eq!(settings.history_budget(), 14_000);
    }

    #[test]
    fn test_load_invalid_yaml() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("context.yml");
        fs::write(&path, "max_tokens: [not, a, number]").unwrap();

        let result: Result<ContextSettings> = load_config_file(&path);
        assert!(matches!(result, Err(ContextError::Config(_))));
    }

    #[test]
    fn test_unsupported_extension() {
        let result: Result<ContextSettings> = load_config_file("context.toml");
        assert!(result.is_err());

        let result: Result<ContextSettings> = load_config_file("context");
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let result: Result<ContextSettings> = load_config_file("/nonexistent/context.yaml");
        assert!(matches!(result, Err(ContextError::Io(_))));
    }
}
