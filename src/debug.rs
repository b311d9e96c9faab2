//! Debug logging for tutor-chat.
//!
//! All `log::info!()` etc. calls are routed to `tutor_chat_debug.log` in the
//! system temp directory, keeping debug output off the chat transcript.
//! When `RUST_LOG` is set, records are mirrored to stderr as well.
//!
//! Level precedence: `--log-level`, then `RUST_LOG`, then the config file's
//! `log_level` (applied after the config is loaded), then `warn`.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use std::sync::OnceLock;

use log::{LevelFilter, Log, Metadata, Record};
use parking_lot::Mutex;
use tutor_chat_config::LogLevel;

const LOG_FILE_NAME: &str = "tutor_chat_debug.log";

struct LogBridge {
    file: Mutex<Option<File>>,
    mirror_stderr: bool,
    /// Set when the CLI flag or `RUST_LOG` chose the level.
    pinned: bool,
}

static BRIDGE: OnceLock<LogBridge> = OnceLock::new();

/// Path of the debug log file.
pub fn log_path() -> PathBuf {
    std::env::temp_dir().join(LOG_FILE_NAME)
}

/// Install the bridge as the global logger.
///
/// Safe to call more than once; later calls are ignored.
pub fn init_log_bridge(cli_level: Option<LogLevel>) {
    let rust_log = std::env::var("RUST_LOG").ok().filter(|v| !v.is_empty());
    let level = resolve_level(cli_level, rust_log.as_deref(), None);

    let bridge = BRIDGE.get_or_init(|| LogBridge {
        file: Mutex::new(open_log_file(level)),
        mirror_stderr: rust_log.is_some(),
        pinned: cli_level.is_some() || rust_log.is_some(),
    });

    if log::set_logger(bridge).is_ok() {
        log::set_max_level(level);
    }
}

/// Apply the config file's level unless the CLI or `RUST_LOG` already chose
/// one.
pub fn apply_config_level(level: LogLevel) {
    let Some(bridge) = BRIDGE.get() else {
        return;
    };
    if bridge.pinned {
        return;
    }
    let filter = level.to_level_filter();
    {
        let mut file = bridge.file.lock();
        if file.is_none() && filter != LevelFilter::Off {
            *file = open_log_file(filter);
        }
    }
    log::set_max_level(filter);
}

/// Pick the effective level: CLI flag, then `RUST_LOG`, then config, then
/// `warn`.
///
/// A `RUST_LOG` value that is not a plain level name (e.g. a directive list)
/// enables `debug`.
pub fn resolve_level(
    cli_level: Option<LogLevel>,
    rust_log: Option<&str>,
    config_level: Option<LogLevel>,
) -> LevelFilter {
    if let Some(level) = cli_level {
        return level.to_level_filter();
    }
    if let Some(value) = rust_log {
        return value
            .parse::<LogLevel>()
            .map(LogLevel::to_level_filter)
            .unwrap_or(LevelFilter::Debug);
    }
    config_level.unwrap_or_default().to_level_filter()
}

fn open_log_file(level: LevelFilter) -> Option<File> {
    if level == LevelFilter::Off {
        return None;
    }
    let path = log_path();
    match OpenOptions::new()
        .write(true)
        .truncate(true)
        .create(true)
        .open(&path)
    {
        Ok(mut file) => {
            let _ = writeln!(
                file,
                "{}\ntutor-chat debug session started at {} (level={level})\n{}",
                "=".repeat(80),
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
                "=".repeat(80)
            );
            Some(file)
        }
        // Silently fail; debug output must never reach the transcript.
        Err(_) => None,
    }
}

impl Log for LogBridge {
    fn enabled(&self, metadata: &Metadata) -> bool {
        if metadata.level() > log::max_level() {
            return false;
        }
        // Third-party crates (ureq, native-tls) only at warn and above.
        metadata.target().starts_with("tutor_chat") || metadata.level() <= log::Level::Warn
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = format!(
            "[{}] [{:<5}] [{}] {}\n",
            chrono::Local::now().format("%H:%M:%S%.3f"),
            record.level(),
            record.target(),
            record.args()
        );

        if let Some(file) = self.file.lock().as_mut() {
            let _ = file.write_all(line.as_bytes());
        }
        if self.mirror_stderr {
            eprint!("{line}");
        }
    }

    fn flush(&self) {
        if let Some(file) = self.file.lock().as_mut() {
            let _ = file.flush();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_precedence() {
        assert_eq!(
            resolve_level(Some(LogLevel::Trace), Some("error"), Some(LogLevel::Info)),
            LevelFilter::Trace
        );
        assert_eq!(
            resolve_level(None, Some("error"), Some(LogLevel::Info)),
            LevelFilter::Error
        );
        assert_eq!(
            resolve_level(None, None, Some(LogLevel::Info)),
            LevelFilter::Info
        );
        assert_eq!(resolve_level(None, None, None), LevelFilter::Warn);
    }

    #[test]
    fn test_directive_rust_log_means_debug() {
        assert_eq!(
            resolve_level(None, Some("tutor_chat=trace,ureq=warn"), None),
            LevelFilter::Debug
        );
    }
}
