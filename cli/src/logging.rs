//! Subscriber setup for the CLI.
//!
//! Events go to stderr. At `debug` and `trace` they are also appended to
//! `rescleaner_debug.log` in the working directory.

use clap::ValueEnum;
use std::fs::{File, OpenOptions};
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::writer::{BoxMakeWriter, MakeWriterExt};
use tracing_subscriber::EnvFilter;

/// Debug log file name.
pub const DEBUG_LOG_FILE: &str = "rescleaner_debug.log";

/// Log verbosity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Filter directive for this level.
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }

    /// Returns true if events should also go to the debug log file.
    pub fn writes_debug_file(&self) -> bool {
        matches!(self, LogLevel::Trace | LogLevel::Debug)
    }
}

/// Opens the debug log in `dir` for appending.
pub fn open_debug_log(dir: &Path) -> std::io::Result<File> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(dir.join(DEBUG_LOG_FILE))
}

/// Installs the global subscriber.
///
/// The returned guard flushes the debug log on drop and must be held until
/// the program exits. It is `None` when no log file is written.
pub fn init_logging(
    level: LogLevel,
) -> Result<Option<WorkerGuard>, Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_new(level.as_str()).unwrap_or_else(|_| EnvFilter::new("info"));

    let (writer, ansi, guard) = if level.writes_debug_file() {
        let file = open_debug_log(Path::new(".")).map_err(|e| {
            format!("Failed to open {}: {}", DEBUG_LOG_FILE, e)
        })?;
        let (file_writer, guard) = tracing_appender::non_blocking(file);
        (
            BoxMakeWriter::new(std::io::stderr.and(file_writer)),
            false,
            Some(guard),
        )
    } else {
        (BoxMakeWriter::new(std::io::stderr), true, None)
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(ansi)
        .with_target(false)
        .try_init()
        .map_err(|e| format!("Failed to initialize logging: {}", e))?;

    Ok(guard)
}
