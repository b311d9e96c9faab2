//! Command-line interface for tutor-chat.
//!
//! This module handles CLI argument parsing and the offline `render`
//! subcommand.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde_json::Value;
use tutor_chat_config::{Config, LogLevel};

use crate::conversation::Conversation;
use crate::render;

/// tutor-chat - chat with a tutoring agent from the terminal
#[derive(Parser)]
#[command(name = "tutor-chat")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Agent API base URL (overrides config and TUTOR_CHAT_API_URL)
    #[arg(long, value_name = "URL")]
    pub api_url: Option<String>,

    /// Bearer token for the agent API
    #[arg(long, value_name = "TOKEN")]
    pub auth_token: Option<String>,

    /// Agent application name
    #[arg(long, value_name = "NAME")]
    pub app_name: Option<String>,

    /// User id sent with every request
    #[arg(long, value_name = "ID")]
    pub user_id: Option<String>,

    /// Directory to write plots (Plotly JSON) and circuits (SVG) into
    #[arg(long, value_name = "DIR")]
    pub export_dir: Option<PathBuf>,

    /// Debug log level (off, error, warn, info, debug, trace)
    #[arg(long, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Config file to use instead of ~/.config/tutor-chat/config.yaml
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Render a saved /run JSON response file without contacting the server
    Render {
        /// File holding a JSON array of agent responses (or a single response)
        file: PathBuf,
    },
}

/// Runtime options passed from CLI to the application
#[derive(Clone, Debug, Default)]
pub struct RuntimeOptions {
    pub api_url: Option<String>,
    pub auth_token: Option<String>,
    pub app_name: Option<String>,
    pub user_id: Option<String>,
    pub export_dir: Option<PathBuf>,
    pub log_level: Option<LogLevel>,
    pub config_path: Option<PathBuf>,
}

impl RuntimeOptions {
    /// Load the config (explicit path or default) and apply CLI overrides on
    /// top of it.
    pub fn resolve_config(&self) -> anyhow::Result<Config> {
        let mut config = match &self.config_path {
            Some(path) => Config::load_from(path)
                .with_context(|| format!("Failed to load config from {}", path.display()))?,
            None => Config::load().context("Failed to load config")?,
        };
        self.apply_to(&mut config);
        config.validate().context("Invalid configuration")?;
        Ok(config)
    }

    /// Apply the CLI flags that were given.
    pub fn apply_to(&self, config: &mut Config) {
        if let Some(url) = &self.api_url {
            config.api_url = url.clone();
        }
        if let Some(token) = &self.auth_token {
            config.auth_token = Some(token.clone());
        }
        if let Some(app) = &self.app_name {
            config.app_name = app.clone();
        }
        if let Some(user) = &self.user_id {
            config.user_id = user.clone();
        }
        if let Some(dir) = &self.export_dir {
            config.export_dir = Some(dir.clone());
        }
        if let Some(level) = self.log_level {
            config.log_level = level;
        }
    }
}

/// Result of CLI processing
pub enum CliResult {
    /// Continue with the interactive chat
    Continue(RuntimeOptions),
    /// Exit with the given code (subcommand completed)
    Exit(i32),
}

/// Process CLI arguments and handle subcommands
pub fn process_cli() -> CliResult {
    let cli = Cli::parse();
    let options = RuntimeOptions {
        api_url: cli.api_url,
        auth_token: cli.auth_token,
        app_name: cli.app_name,
        user_id: cli.user_id,
        export_dir: cli.export_dir,
        log_level: cli.log_level,
        config_path: cli.config,
    };

    match cli.command {
        Some(Commands::Render { file }) => {
            crate::debug::init_log_bridge(options.log_level);
            match render_file(&file, &options) {
                Ok(()) => CliResult::Exit(0),
                Err(e) => {
                    eprintln!("tutor-chat: error: {e:#}");
                    CliResult::Exit(1)
                }
            }
        }
        None => CliResult::Continue(options),
    }
}

/// Render a saved `/run` response file to stdout.
fn render_file(file: &Path, options: &RuntimeOptions) -> anyhow::Result<()> {
    let config = options.resolve_config()?;
    crate::debug::apply_config_level(config.log_level);

    print!("{}", render_responses_file(file, config.export_dir.as_deref())?);
    Ok(())
}

/// Read a saved response file, render every message and export
/// visualizations when `export_dir` is set. Returns the rendered text.
pub fn render_responses_file(file: &Path, export_dir: Option<&Path>) -> anyhow::Result<String> {
    let contents = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let value: Value = serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse JSON from {}", file.display()))?;
    let responses = match value {
        Value::Array(items) => items,
        single @ Value::Object(_) => vec![single],
        _ => anyhow::bail!("{} holds neither a response nor an array", file.display()),
    };

    let mut conversation = Conversation::new();
    conversation.push_responses(&responses);

    let mut out = String::new();
    for index in 0..conversation.len() {
        let Some(prepared) = conversation.prepare(index, |id| {
            log::info!("Message {id} carries a visualization")
        }) else {
            continue;
        };
        let message = &conversation.messages()[index];
        out.push_str(&render::render_message(message, &prepared));
        out.push('\n');

        if let Some(dir) = export_dir {
            for path in render::export(dir, &message.id, &prepared)
                .with_context(|| format!("Failed to export to {}", dir.display()))?
            {
                out.push_str(&format!("  saved {}\n", path.display()));
            }
        }
    }
    Ok(out)
}
