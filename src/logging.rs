// 📜 Logging setup shared by the binaries
// RUST_LOG wins; otherwise the configured filter applies.

use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn filter(default_filter: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into())
}

/// Human-readable events on stderr (CLI and server)
pub fn init_stderr(default_filter: &str) {
    let _ = tracing_subscriber::registry()
        .with(filter(default_filter))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_line_number(true),
        )
        .try_init();
}

/// File-only logging so the alternate screen stays clean.
/// Keep the guard alive until exit or buffered events are lost.
pub fn init_file(dir: &Path, default_filter: &str) -> std::io::Result<WorkerGuard> {
    std::fs::create_dir_all(dir)?;

    let appender = tracing_appender::rolling::daily(dir, "mystic-companion.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let _ = tracing_subscriber::registry()
        .with(filter(default_filter))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_target(true)
                .with_line_number(true)
                .with_ansi(false),
        )
        .try_init();

    Ok(guard)
}
