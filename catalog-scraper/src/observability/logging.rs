use std::fs;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initializes structured logging with both a console sink and a
/// daily-rotated JSON file sink. Respects `RUST_LOG` if set, otherwise
/// defaults to the level configured via `LOG_LEVEL`.
pub fn init_logging(default_level: &str) {
    let _ = fs::create_dir_all("logs");

    let file_appender = tracing_appender::rolling::daily("logs", "catalog-scraper.log");
    let (non_blocking_writer, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = fmt::layer().json().with_writer(non_blocking_writer);

    let console_layer = fmt::layer()
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_writer(std::io::stdout);

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("catalog_scraper={default_level},info")));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(console_layer)
        .init();

    // Keep the non-blocking writer's flush guard alive for the process
    // lifetime; the binary never rebuilds the subscriber.
    std::mem::forget(guard);
}
