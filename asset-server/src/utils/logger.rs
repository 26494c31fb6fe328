//! Logging Infrastructure
//!
//! `tracing-subscriber` fmt output filtered by `EnvFilter`, optionally
//! written to a daily rolling file.

use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// Initialize the logger with stdout output
pub fn init_logger(log_level: &str) {
    let _ = init_logger_with_file(log_level, None);
}

/// Initialize the logger with optional file output.
///
/// `log_level` accepts a plain level (`info`) or a full `EnvFilter`
/// directive (`asset_server=debug,sqlx=warn`); `RUST_LOG` wins when set.
/// The returned guard must be held for the process lifetime when a file
/// writer is used.
pub fn init_logger_with_file(log_level: &str, log_dir: Option<&str>) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_file(false)
        .with_line_number(false)
        .with_thread_ids(false)
        .with_target(true);

    if let Some(dir) = log_dir {
        let log_path = Path::new(dir);
        if log_path.exists() {
            let file_appender = tracing_appender::rolling::daily(log_path, "asset-server");
            let (writer, guard) = tracing_appender::non_blocking(file_appender);
            let _ = builder.with_ansi(false).with_writer(writer).try_init();
            return Some(guard);
        }
    }

    let _ = builder.try_init();
    None
}
