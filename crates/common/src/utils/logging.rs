use std::fs::{File, OpenOptions};
use std::io;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use tracing::Span;
use tracing_subscriber::fmt::writer::{BoxMakeWriter, MakeWriterExt};
use tracing_subscriber::{fmt, EnvFilter};

const DEFAULT_FILTER: &str = "info,tower_http=info,axum=info";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Json,
    Compact,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(LogFormat::Json),
            "compact" | "text" => Ok(LogFormat::Compact),
            other => Err(format!("unknown log format: {other}")),
        }
    }
}

/// Handle returned by [`init_logging`]. Holding it keeps the log file open;
/// dropping it (or calling [`LogGuard::shutdown`]) flushes it to disk.
#[derive(Debug)]
pub struct LogGuard {
    file: Option<Arc<File>>,
}

impl LogGuard {
    pub fn has_file(&self) -> bool {
        self.file.is_some()
    }

    /// Explicit shutdown; equivalent to dropping the guard.
    pub fn shutdown(self) {}
}

impl Drop for LogGuard {
    fn drop(&mut self) {
        if let Some(file) = self.file.take() {
            let _ = file.sync_all();
        }
    }
}

/// Initialize the tracing subscriber.
/// - Respects `RUST_LOG` if set, falls back to `info,tower_http=info,axum=info`
/// - Always writes to stdout; when `log_file` is given, events are also appended there
/// - A subscriber that is already installed (e.g. in tests) is left in place
pub fn init_logging(format: LogFormat, log_file: Option<&Path>) -> io::Result<LogGuard> {
    let file = match log_file {
        Some(path) => Some(Arc::new(
            OpenOptions::new().create(true).append(true).open(path)?,
        )),
        None => None,
    };

    let writer = match &file {
        Some(f) => BoxMakeWriter::new(io::stdout.and(Arc::clone(f))),
        None => BoxMakeWriter::new(io::stdout),
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let builder = fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(writer);
    let _ = match format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Compact => builder.compact().try_init(),
    };

    Ok(LogGuard { file })
}

/// Span handed to a service at construction; its events are parented to it.
pub fn service_span(name: &'static str) -> Span {
    tracing::info_span!("service", service = name)
}
