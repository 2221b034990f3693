//! PolicyQA CLI
//!
//! Main entry point for the policyqa command-line tool.
//! Answers questions about policy documents and serves the HTTP API.

mod commands;

use anyhow::Context;
use clap::{Parser, Subcommand};
use commands::{AskCommand, ServeCommand, VerifyCommand};
use policyqa_core::{
    config::AppConfig,
    logging::{self, LogFormat},
};
use std::path::PathBuf;

/// PolicyQA - answers questions about policy documents
#[derive(Parser, Debug)]
#[command(name = "policyqa")]
#[command(about = "Answers questions about policy documents", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to workspace directory (default: current directory)
    #[arg(short, long, global = true, env = "POLICYQA_WORKSPACE")]
    workspace: Option<PathBuf>,

    /// Path to config file
    #[arg(short, long, global = true, env = "POLICYQA_CONFIG")]
    config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, env = "RUST_LOG")]
    log_level: Option<String>,

    /// Log line format (text, json)
    #[arg(long, global = true)]
    log_format: Option<String>,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    no_color: bool,

    /// LLM provider (ollama, gemini)
    #[arg(short, long, global = true, env = "POLICYQA_PROVIDER")]
    provider: Option<String>,

    /// Model identifier
    #[arg(short, long, global = true, env = "POLICYQA_MODEL")]
    model: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Ask one or more questions about a policy document
    Ask(AskCommand),

    /// Check a document against verification criteria
    Verify(VerifyCommand),

    /// Run the HTTP API
    Serve(ServeCommand),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse command-line arguments first (needed for logging config)
    let cli = Cli::parse();

    // --workspace picks which .policyqa/config.yaml is merged, so it goes in before loading
    let config = AppConfig::load(cli.workspace.clone(), cli.config.clone())
        .context("Failed to load configuration")?;

    let mut config = config.with_overrides(
        cli.workspace,
        cli.config,
        cli.provider,
        cli.model,
        cli.log_level,
        cli.verbose,
        cli.no_color,
    );

    if let Some(format) = cli.log_format {
        config.log_format = format;
    }

    let log_format = LogFormat::parse(&config.log_format)
        .with_context(|| format!("Unknown log format: {}", config.log_format))?;
    logging::init_logging(config.log_level.as_deref(), log_format, config.no_color)?;

    tracing::info!("PolicyQA CLI starting");
    tracing::debug!("Workspace: {:?}", config.workspace);
    tracing::debug!("Provider: {}", config.provider);
    tracing::debug!("Model: {}", config.model);

    config.validate()?;

    let command_name = match &cli.command {
        Commands::Ask(_) => "ask",
        Commands::Verify(_) => "verify",
        Commands::Serve(_) => "serve",
    };
    let _span = tracing::info_span!("command", name = command_name).entered();

    let result = match cli.command {
        Commands::Ask(cmd) => cmd.execute(&config).await,
        Commands::Verify(cmd) => cmd.execute(&config).await,
        Commands::Serve(cmd) => cmd.execute(&config).await,
    };

    match &result {
        Ok(_) => tracing::info!("Command completed successfully"),
        Err(e) => tracing::error!("Command failed: {}", e),
    }

    Ok(result?)
}
