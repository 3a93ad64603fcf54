//! Logging setup shared by every ops command
//!
//! Two sinks:
//! 1. stderr, compact human readable lines
//! 2. a JSON log file with daily rotation (optional)
//!
//! Both writers are non-blocking; the returned [`LogGuards`] must be kept alive
//! until the process exits or buffered lines are lost.

use std::path::PathBuf;

use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

const APP_DIR_NAME: &str = "brainbase-ops";
const LOG_FILE_PREFIX: &str = "brainbase-ops.log";

/// Options for [`init_logging`]
#[derive(Debug, Clone, Default)]
pub struct LoggingOptions {
    /// Directory for the rotating JSON log; `None` uses [`default_log_dir`]
    pub log_dir: Option<PathBuf>,
    /// Disable the file sink entirely
    pub disable_file: bool,
    /// Default to `debug` instead of `info` when `RUST_LOG` is unset
    pub verbose: bool,
}

/// Keeps the non-blocking writers flushing until dropped
pub struct LogGuards {
    _stderr: WorkerGuard,
    _file: Option<WorkerGuard>,
    /// Where the JSON log is written, when file logging is active
    pub log_dir: Option<PathBuf>,
}

/// Logging initialization failure
#[derive(Debug, thiserror::Error)]
#[error("Failed to initialize logging: {0}")]
pub struct LoggingError(String);

/// Install the global tracing subscriber.
///
/// # Errors
/// Returns an error if a global subscriber was already installed.
pub fn init_logging(options: &LoggingOptions) -> Result<LogGuards, LoggingError> {
    let default_level = if options.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let (stderr_writer, stderr_guard): (NonBlocking, WorkerGuard) =
        tracing_appender::non_blocking(std::io::stderr());

    let mut file_problem = None;
    let file_sink = if options.disable_file {
        None
    } else {
        let log_dir = options.log_dir.clone().unwrap_or_else(default_log_dir);
        match std::fs::create_dir_all(&log_dir) {
            Ok(()) => {
                let appender = RollingFileAppender::new(Rotation::DAILY, &log_dir, LOG_FILE_PREFIX);
                let (writer, guard) = tracing_appender::non_blocking(appender);
                Some((writer, guard, log_dir))
            }
            Err(e) => {
                file_problem = Some(format!("{}: {e}", log_dir.display()));
                None
            }
        }
    };

    let (file_writer, file_guard, log_dir) = match file_sink {
        Some((writer, guard, dir)) => (Some(writer), Some(guard), Some(dir)),
        None => (None, None, None),
    };

    let stderr_layer = fmt::layer()
        .compact()
        .with_target(false)
        .with_writer(stderr_writer);
    let file_layer = file_writer.map(|writer| fmt::layer().json().with_writer(writer));

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| LoggingError(e.to_string()))?;

    if let Some(problem) = file_problem {
        tracing::warn!("File logging disabled, cannot create log directory {problem}");
    }

    Ok(LogGuards {
        _stderr: stderr_guard,
        _file: file_guard,
        log_dir,
    })
}

/// Get the default log directory based on the operating system
pub fn default_log_dir() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        // Windows: %LOCALAPPDATA%\brainbase-ops\logs
        std::env::var_os("LOCALAPPDATA").map_or_else(
            || PathBuf::from("logs"),
            |local| PathBuf::from(local).join(APP_DIR_NAME).join("logs"),
        )
    }

    #[cfg(target_os = "macos")]
    {
        // macOS: ~/Library/Logs/brainbase-ops
        dirs::home_dir().map_or_else(
            || PathBuf::from("logs"),
            |home| home.join("Library").join("Logs").join(APP_DIR_NAME),
        )
    }

    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    {
        if let Some(data_dir) = dirs::data_dir() {
            // ~/.local/share/brainbase-ops/logs
            data_dir.join(APP_DIR_NAME).join("logs")
        } else if let Some(home) = dirs::home_dir() {
            home.join(format!(".{APP_DIR_NAME}")).join("logs")
        } else {
            PathBuf::from("logs")
        }
    }
}
