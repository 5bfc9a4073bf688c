use std::fs;
use std::io;
use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub const LOG_PREFIX: &str = "pokedex.log";

/// Routes `tracing` output to a daily-rotated file in `log_dir`.
///
/// The terminal belongs to the UI, so nothing is written to stdout. Keep the
/// returned guard alive until exit or buffered lines are lost.
pub fn init_logging(log_dir: &Path, verbose: bool) -> io::Result<WorkerGuard> {
    fs::create_dir_all(log_dir)?;

    let file_appender = rolling::daily(log_dir, LOG_PREFIX);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = if verbose {
        EnvFilter::new("pokedex=debug,info")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(true),
        )
        .try_init()
        .map_err(io::Error::other)?;

    tracing::info!(log_dir = %log_dir.display(), verbose, "logging initialized");
    Ok(guard)
}
