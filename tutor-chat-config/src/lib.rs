//! Configuration system for the tutor-chat terminal client.
//!
//! This crate provides configuration loading, saving, and default values:
//!
//! - `Config` with API endpoint, credentials and session identity
//! - `${VAR}` substitution restricted to an allowlist
//! - `TUTOR_CHAT_API_URL` / `TUTOR_CHAT_AUTH_TOKEN` environment overrides
//! - Atomic YAML persistence under `~/.config/tutor-chat/`

pub mod config;
pub mod defaults;
pub mod error;
mod log_level;

// Re-export main types for convenience
pub use config::{
    ALLOWED_ENV_VARS, Config, ENV_API_URL, ENV_AUTH_TOKEN, is_env_var_allowed,
    substitute_variables,
};
pub use error::ConfigError;
pub use log_level::LogLevel;
