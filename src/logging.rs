use std::fs;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{filter::LevelFilter, fmt, prelude::*, EnvFilter};

const LOG_DIR: &str = "logs";
const LOG_FILE: &str = "lumina_bi.log";

/// Initializes the logging system with both console and file output.
///
/// The returned guard flushes the file writer when dropped, so callers keep
/// it alive for the lifetime of the process.
pub fn init_logging() -> Option<WorkerGuard> {
    let filter = EnvFilter::from_default_env().add_directive(
        "lumina_bi=info"
            .parse()
            .unwrap_or_else(|_| LevelFilter::INFO.into()),
    );

    if let Err(e) = fs::create_dir_all(LOG_DIR) {
        // Console-only logging when the log directory is not writable
        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_writer(std::io::stdout))
            .try_init();
        tracing::warn!("Could not create log directory '{}': {}", LOG_DIR, e);
        return None;
    }

    // Daily rotation, JSON lines in the file, human-readable on stdout
    let file_appender = tracing_appender::rolling::daily(LOG_DIR, LOG_FILE);
    let (non_blocking_writer, guard) = tracing_appender::non_blocking(file_appender);
    let file_layer = fmt::layer().json().with_writer(non_blocking_writer);

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(fmt::layer().with_writer(std::io::stdout))
        .try_init();

    Some(guard)
}
