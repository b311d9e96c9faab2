//! Config persistence and path resolution.
//!
//! Covers:
//! - `load` / `load_from` (YAML file I/O with variable substitution)
//! - `save` / `save_to` (atomic write)
//! - XDG-style path helpers (`config_path`, `config_dir`)

use std::fs;
use std::path::{Path, PathBuf};

use super::Config;
use super::env_vars::substitute_variables;
use crate::error::ConfigError;

impl Config {
    /// Load configuration from the default path, then apply environment
    /// overrides.
    ///
    /// A missing file yields defaults; nothing is written.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::config_path())
    }

    /// Load configuration from `path`, then apply environment overrides.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::read_file(path)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Parse `path` without applying environment overrides.
    pub fn read_file(path: &Path) -> Result<Self, ConfigError> {
        log::info!("Config path: {:?}", path);

        if !path.exists() {
            log::info!("Config file not found at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            if let Ok(metadata) = fs::metadata(path) {
                let mode = metadata.permissions().mode();
                if mode & 0o044 != 0 {
                    log::warn!(
                        "Config file {:?} is readable by group or others (mode {:04o}) and may hold an auth token. Run: chmod 600 {:?}",
                        path,
                        mode & 0o777,
                        path,
                    );
                }
            }
        }

        let contents = fs::read_to_string(path)?;
        Self::from_yaml(&contents)
    }

    /// Parse YAML text after variable substitution. Empty input yields
    /// defaults.
    pub fn from_yaml(contents: &str) -> Result<Self, ConfigError> {
        let contents = substitute_variables(contents);
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml_ng::from_str(&contents)?)
    }

    /// Save configuration to the default path.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::config_path())
    }

    /// Save configuration to `path`, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let yaml = serde_yaml_ng::to_string(self)?;

        // Atomic save: write to temp file then rename
        let temp_path = path.with_extension("yaml.tmp");
        fs::write(&temp_path, &yaml)?;
        fs::rename(&temp_path, path)?;

        log::info!("Config saved to {:?}", path);
        Ok(())
    }

    /// Get the configuration file path (using XDG convention)
    pub fn config_path() -> PathBuf {
        Self::config_dir().join("config.yaml")
    }

    /// Get the configuration directory path (using XDG convention)
    pub fn config_dir() -> PathBuf {
        #[cfg(target_os = "windows")]
        {
            if let Some(config_dir) = dirs::config_dir() {
                config_dir.join("tutor-chat")
            } else {
                PathBuf::from(".")
            }
        }
        #[cfg(not(target_os = "windows"))]
        {
            if let Some(home_dir) = dirs::home_dir() {
                home_dir.join(".config").join("tutor-chat")
            } else {
                PathBuf::from(".")
            }
        }
    }
}
