//! # ctxwin
//!
//! Inspect the token cost of chat histories and preview how they are trimmed
//! to a context window.

use anyhow::Result;
use clap::{Parser, Subcommand};
use context_window::ContextSettings;
use context_window_cli::{
    count_history, load_history, render_count, render_usage, trim_history, usage_for,
};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "ctxwin")]
#[command(about = "Token usage and context window trimming for chat histories", long_about = None)]
#[command(version)]
struct Cli {
    /// Settings file (YAML or JSON)
    #[arg(short, long, global = true, env = "CONTEXT_WINDOW_CONFIG")]
    config: Option<PathBuf>,

    /// Model name (overrides settings)
    #[arg(short, long, global = true)]
    model: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the token cost of every message and the total
    Count {
        /// History file (JSON array of messages)
        file: PathBuf,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show how much of the context window a history uses
    Usage {
        /// History file (JSON array of messages)
        file: PathBuf,
    },

    /// Print the part of a history that fits the token budget
    Trim {
        /// History file (JSON array of messages)
        file: PathBuf,

        /// Token budget (defaults to the settings' history budget)
        #[arg(long)]
        max_tokens: Option<usize>,
    },
}

fn main() -> Result<()> {
    // Logs go to stderr so JSON output on stdout stays clean
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut settings = ContextSettings::load(cli.config.as_deref())?;
    if let Some(model) = cli.model {
        settings.model = model;
    }
    tracing::debug!(model = %settings.model, max_tokens = settings.max_tokens, "Settings loaded");

    match cli.command {
        Commands::Count { file, json } => {
            let messages = load_history(&file)?;
            let report = count_history(&messages, &settings.model);
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print!("{}", render_count(&report));
            }
        }
        Commands::Usage { file } => {
            let messages = load_history(&file)?;
            let usage = usage_for(&messages, &settings);
            println!("{}", render_usage(&usage));
        }
        Commands::Trim { file, max_tokens } => {
            let messages = load_history(&file)?;
            let (kept, report) = trim_history(&messages, &settings, max_tokens)?;
            tracing::info!(
                kept = report.kept,
                dropped = report.dropped,
                tokens_used = report.tokens_used,
                "Trimmed history"
            );
            if report.system_over_budget {
                eprintln!(
                    "warning: system messages alone use {} tokens, over the budget",
                    report.system_tokens
                );
            }
            println!("{}", serde_json::to_string_pretty(&kept)?);
        }
    }

    Ok(())
}
