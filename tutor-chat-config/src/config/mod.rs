//! The `Config` struct, its defaults and environment overrides.
//!
//! Sub-modules:
//! - `env_vars`: `${VAR}` substitution with an allowlist
//! - `persistence`: YAML load/save and path resolution

pub mod env_vars;
mod persistence;

pub use env_vars::{ALLOWED_ENV_VARS, is_env_var_allowed, substitute_variables};

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::log_level::LogLevel;

/// Overrides `api_url` when set.
pub const ENV_API_URL: &str = "TUTOR_CHAT_API_URL";

/// Overrides `auth_token` when set.
pub const ENV_AUTH_TOKEN: &str = "TUTOR_CHAT_AUTH_TOKEN";

/// Client configuration, stored as YAML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the agent API server.
    pub api_url: String,

    /// Bearer token sent with every request.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth_token: Option<String>,

    /// Agent application name used in session and run requests.
    pub app_name: String,

    /// User id used in session and run requests.
    pub user_id: String,

    /// Where rendered plots and circuits are written, if anywhere.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub export_dir: Option<PathBuf>,

    pub log_level: LogLevel,

    /// Overall timeout for one HTTP request.
    pub request_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: crate::defaults::api_url(),
            auth_token: None,
            app_name: crate::defaults::app_name(),
            user_id: crate::defaults::user_id(),
            export_dir: None,
            log_level: LogLevel::default(),
            request_timeout_secs: crate::defaults::request_timeout_secs(),
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the API base URL
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    /// Set the auth token
    pub fn with_auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }

    /// The API base URL without a trailing slash.
    pub fn api_base(&self) -> &str {
        self.api_url.trim_end_matches('/')
    }

    /// Whether a non-empty auth token is configured.
    pub fn has_auth_token(&self) -> bool {
        self.auth_token.as_deref().is_some_and(|t| !t.is_empty())
    }

    /// Apply `TUTOR_CHAT_API_URL` / `TUTOR_CHAT_AUTH_TOKEN` from the process
    /// environment.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|name| std::env::var(name).ok());
    }

    /// Apply overrides from an arbitrary variable lookup. Empty values are
    /// ignored.
    pub fn apply_overrides_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup(ENV_API_URL).filter(|v| !v.is_empty()) {
            log::debug!("api_url overridden by {ENV_API_URL}");
            self.api_url = url;
        }
        if let Some(token) = lookup(ENV_AUTH_TOKEN).filter(|v| !v.is_empty()) {
            log::debug!("auth_token overridden by {ENV_AUTH_TOKEN}");
            self.auth_token = Some(token);
        }
    }

    /// Check field values that serde cannot.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_url.trim().is_empty() {
            return Err(ConfigError::Validation("api_url must not be empty".into()));
        }
        if !self.api_url.starts_with("http://") && !self.api_url.starts_with("https://") {
            return Err(ConfigError::Validation(format!(
                "api_url must start with http:// or https:// (got {:?})",
                self.api_url
            )));
        }
        if self.app_name.is_empty() || self.user_id.is_empty() {
            return Err(ConfigError::Validation(
                "app_name and user_id must not be empty".into(),
            ));
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "request_timeout_secs must be greater than 0".into(),
            ));
        }
        Ok(())
    }
}
