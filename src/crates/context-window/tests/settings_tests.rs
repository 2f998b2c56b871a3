//! Settings loading with environment overrides
//!
//! Tests in this file mutate process environment variables, so they hold
//! `ENV_LOCK` for their whole body.

use context_window::config::{ENV_MAX_TOKENS, ENV_MODEL, ENV_RESPONSE_RESERVED};
use context_window::{ContextError, ContextSettings};
use std::env;
use std::fs;
use std::sync::Mutex;
use tempfile::TempDir;

static ENV_LOCK: Mutex<()> = Mutex::new(());

fn clear_env() {
    env::remove_var(ENV_MODEL);
    env::remove_var(ENV_MAX_TOKENS);
    env::remove_var(ENV_RESPONSE_RESERVED);
}

#[test]
fn test_load_defaults_without_file() {
    let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    clear_env();

    let settings = ContextSettings::load(None).unwrap();
    assert_eq!(settings, ContextSettings::default());
}

#[test]
fn test_env_overrides_file() {
    let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    clear_env();

    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("context.yaml");
    fs::write(&path, "model: gpt-4\nmax_tokens: 2000\nresponse_reserved: 500\n").unwrap();

    env::set_var(ENV_MODEL, "claude-3-5-sonnet");
    env::set_var(ENV_MAX_TOKENS, "6000");

    let settings = ContextSettings::load(Some(path.as_path())).unwrap();
    clear_env();

    assert_eq!(settings.model, "claude-3-5-sonnet");
    assert_eq!(settings.max_tokens, 6_000);
    assert_eq!(settings.response_reserved, 500);
    assert_eq!(settings.history_budget(), 5_500);
}

#[test]
fn test_invalid_env_value_is_config_error() {
    let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    clear_env();

    env::set_var(ENV_MAX_TOKENS, "lots");
    let result = ContextSettings::load(None);
    clear_env();

    assert!(matches!(result, Err(ContextError::Config(_))));
}

#[test]
fn test_zero_budget_from_env_is_rejected() {
    let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    clear_env();

    env::set_var(ENV_MAX_TOKENS, "0");
    env::set_var(ENV_RESPONSE_RESERVED, "0");
    let result = ContextSettings::load(None);
    clear_env();

    assert!(matches!(result, Err(ContextError::Config(_))));
}

#[test]
fn test_loaded_settings_build_trimmer() {
    let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    clear_env();

    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("context.json");
    fs::write(&path, r#"{"model": "gpt-4o-mini", "max_tokens": 3000}"#).unwrap();

    let settings = ContextSettings::load(Some(path.as_path())).unwrap();
    let trimmer = settings.trimmer().unwrap();

    assert_eq!(trimmer.max_tokens(), 2_000);
    assert_eq!(trimmer.counter().model(), "gpt-4o-mini");
}
