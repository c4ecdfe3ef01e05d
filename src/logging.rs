use std::fs;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{filter::LevelFilter, fmt, prelude::*, EnvFilter};

/// Initializes logging with a console layer on stderr and a JSON file layer.
///
/// stdout is left untouched because the CLI prints its JSON results there.
/// The returned guard must be held until exit so buffered file logs are flushed.
pub fn init_logging() -> Option<WorkerGuard> {
    let filter = EnvFilter::from_default_env().add_directive(
        "program_scraper=info"
            .parse()
            .unwrap_or_else(|_| LevelFilter::INFO.into()),
    );

    // Fall back to console-only logging when the logs directory is not writable
    if fs::create_dir_all("logs").is_err() {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();
        return None;
    }

    let file_appender = tracing_appender::rolling::daily("logs", "program_scraper.log");
    let (non_blocking_writer, guard) = tracing_appender::non_blocking(file_appender);
    let file_layer = fmt::layer().json().with_writer(non_blocking_writer);

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    Some(guard)
}
