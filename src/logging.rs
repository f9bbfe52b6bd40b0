use std::fs;
use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

pub const LOG_ENV: &str = "CIHUI_LOG";

/// Keeps the non-blocking writer flushing until dropped at exit.
pub struct FileLogGuard {
    _guard: WorkerGuard,
}

/// Log to a daily file; the terminal belongs to the UI. Returns `None` when
/// the log directory cannot be created, in which case logging is off.
pub fn init_tracing(log_dir: &Path, default_level: &str) -> Option<FileLogGuard> {
    let directive = std::env::var(LOG_ENV).unwrap_or_else(|_| default_level.to_string());
    let env_filter = EnvFilter::try_new(&directive).unwrap_or_else(|_| EnvFilter::new("info"));

    if let Err(err) = fs::create_dir_all(log_dir) {
        eprintln!("failed to create log directory {}: {err}", log_dir.display());
        return None;
    }

    let file_appender = RollingFileAppender::new(Rotation::DAILY, log_dir, "cihui.log");
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);
    let file_layer = fmt::layer()
        .with_writer(file_writer)
        .with_ansi(false)
        .with_target(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .init();

    Some(FileLogGuard { _guard: guard })
}
