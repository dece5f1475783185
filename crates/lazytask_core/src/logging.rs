//! Logging bootstrap for hosts embedding the core.
//!
//! # Responsibility
//! - Turn host-provided level/directory settings into a `LoggingConfig`.
//! - Start rolling file logs exactly once per process.
//!
//! # Invariants
//! - Initialization is idempotent for an identical config.
//! - A second initialization with a different level or directory is
//!   rejected instead of silently reconfiguring.
//! - Initialization never panics.
//!
//! Core modules log through the `log` facade with
//! `event=<name> module=<module> status=<status>` prefixes; without
//! `init_logging` those records are simply dropped.

use flexi_logger::{Cleanup, Criterion, FileSpec, Logger, LoggerHandle, Naming, WriteMode};
use log::info;
use once_cell::sync::OnceCell;
use std::path::{Path, PathBuf};

const LOG_FILE_BASENAME: &str = "lazytask";
const MAX_LOG_FILE_SIZE_BYTES: u64 = 5 * 1024 * 1024;
const MAX_LOG_FILES: usize = 3;

/// Environment variable consulted by `LoggingConfig::from_env`.
pub const LOG_LEVEL_ENV: &str = "LAZYTASK_LOG";

static LOGGING_STATE: OnceCell<LoggingState> = OnceCell::new();

struct LoggingState {
    config: LoggingConfig,
    _logger: LoggerHandle,
}

/// Validated logging settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    level: &'static str,
    log_dir: PathBuf,
}

impl LoggingConfig {
    /// Validates a level name and an absolute log directory.
    ///
    /// # Errors
    /// - Unsupported level, or empty/relative directory.
    pub fn new(level: &str, log_dir: &str) -> Result<Self, String> {
        Ok(Self {
            level: normalize_level(level)?,
            log_dir: normalize_log_dir(log_dir)?,
        })
    }

    /// Like `new`, with the level taken from `LAZYTASK_LOG` when set and
    /// `default_log_level()` otherwise.
    pub fn from_env(log_dir: &str) -> Result<Self, String> {
        match std::env::var(LOG_LEVEL_ENV) {
            Ok(level) => Self::new(&level, log_dir),
            Err(_) => Self::new(default_log_level(), log_dir),
        }
    }

    pub fn level(&self) -> &'static str {
        self.level
    }

    pub fn log_dir(&self) -> &Path {
        &self.log_dir
    }
}

/// Initializes logging from raw host settings.
///
/// # Errors
/// - Any `LoggingConfig::new` error, or the errors of `init_with_config`.
pub fn init_logging(level: &str, log_dir: &str) -> Result<(), String> {
    init_with_config(LoggingConfig::new(level, log_dir)?)
}

/// Initializes logging once; repeated identical calls succeed.
///
/// # Errors
/// - Directory creation or logger startup failure.
/// - A different config than the active one.
pub fn init_with_config(config: LoggingConfig) -> Result<(), String> {
    let state = LOGGING_STATE.get_or_try_init(|| start_logger(config.clone()))?;
    if state.config != config {
        return Err(format!(
            "logging already initialized with level `{}` at `{}`; refusing to switch to level `{}` at `{}`",
            state.config.level,
            state.config.log_dir.display(),
            config.level,
            config.log_dir.display()
        ));
    }
    Ok(())
}

fn start_logger(config: LoggingConfig) -> Result<LoggingState, String> {
    std::fs::create_dir_all(&config.log_dir).map_err(|err| {
        format!(
            "failed to create log directory `{}`: {err}",
            config.log_dir.display()
        )
    })?;

    let logger = Logger::try_with_str(config.level)
        .map_err(|err| format!("invalid log level `{}`: {err}", config.level))?
        .log_to_file(
            FileSpec::default()
                .directory(config.log_dir.as_path())
                .basename(LOG_FILE_BASENAME),
        )
        .rotate(
            Criterion::Size(MAX_LOG_FILE_SIZE_BYTES),
            Naming::Numbers,
            Cleanup::KeepLogFiles(MAX_LOG_FILES),
        )
        .write_mode(WriteMode::BufferAndFlush)
        .append()
        .format_for_files(flexi_logger::detailed_format)
        .start()
        .map_err(|err| format!("failed to start logger: {err}"))?;

    info!(
        "event=logging_init module=logging status=ok level={} log_dir={} version={}",
        config.level,
        config.log_dir.display(),
        env!("CARGO_PKG_VERSION")
    );

    Ok(LoggingState {
        config,
        _logger: logger,
    })
}

/// Active `(level, log_dir)`, or `None` before initialization.
pub fn logging_status() -> Option<(&'static str, PathBuf)> {
    LOGGING_STATE
        .get()
        .map(|state| (state.config.level, state.config.log_dir.clone()))
}

/// `debug` for debug builds, `info` for release builds.
pub fn default_log_level() -> &'static str {
    if cfg!(debug_assertions) {
        "debug"
    } else {
        "info"
    }
}

fn normalize_level(level: &str) -> Result<&'static str, String> {
    match level.trim().to_ascii_lowercase().as_str() {
        "trace" => Ok("trace"),
        "debug" => Ok("debug"),
        "info" => Ok("info"),
        "warn" | "warning" => Ok("warn"),
        "error" => Ok("error"),
        other => Err(format!(
            "unsupported log level `{other}`; expected trace|debug|info|warn|error"
        )),
    }
}

fn normalize_log_dir(log_dir: &str) -> Result<PathBuf, String> {
    let trimmed = log_dir.trim();
    if trimmed.is_empty() {
        return Err("log_dir cannot be empty".to_string());
    }
    let path = Path::new(trimmed);
    if !path.is_absolute() {
        return Err(format!("log_dir must be an absolute path, got `{trimmed}`"));
    }
    Ok(path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::{default_log_level, init_logging, logging_status, LoggingConfig, LOG_LEVEL_ENV};

    #[test]
    fn config_normalizes_level_aliases() {
        let config = LoggingConfig::new(" WARNING ", "/tmp/lazytask").expect("valid config");
        assert_eq!(config.level(), "warn");
    }

    #[test]
    fn config_rejects_relative_dir_and_unknown_level() {
        let err = LoggingConfig::new("info", "logs/dev").expect_err("relative dir");
        assert!(err.contains("absolute"));
        let err = LoggingConfig::new("loud", "/tmp/lazytask").expect_err("unknown level");
        assert!(err.contains("unsupported log level"));
    }

    #[test]
    fn env_level_overrides_default_and_falls_back_when_unset() {
        std::env::set_var(LOG_LEVEL_ENV, "WARNING");
        let config = LoggingConfig::from_env("/tmp/lazytask").expect("env level");
        assert_eq!(config.level(), "warn");

        std::env::set_var(LOG_LEVEL_ENV, "loud");
        let err = LoggingConfig::from_env("/tmp/lazytask").expect_err("bad env level");
        assert!(err.contains("unsupported log level"));

        std::env::remove_var(LOG_LEVEL_ENV);
        let config = LoggingConfig::from_env("/tmp/lazytask").expect("default level");
        assert_eq!(config.level(), default_log_level());
    }

    #[test]
    fn init_is_idempotent_and_rejects_conflicts() {
        let dir = tempfile::tempdir().expect("temp dir");
        let dir_str = dir.path().to_str().expect("utf-8 temp dir").to_string();
        let other = tempfile::tempdir().expect("temp dir");
        let other_str = other.path().to_str().expect("utf-8 temp dir").to_string();

        init_logging("info", &dir_str).expect("first init");
        init_logging("info", &dir_str).expect("same config is idempotent");

        let err = init_logging("debug", &dir_str).expect_err("level conflict");
        assert!(err.contains("refusing to switch"));
        let err = init_logging("info", &other_str).expect_err("directory conflict");
        assert!(err.contains("refusing to switch"));

        let (level, active_dir) = logging_status().expect("logging active");
        assert_eq!(level, "info");
        assert_eq!(active_dir, dir.path());
    }
}
