//! Tracing setup.
//!
//! Logs go to a daily rolling file under the config directory so the
//! console stays reserved for the conversation. `RUST_LOG` overrides the
//! configured level.

use std::fs;
use std::path::PathBuf;

use parley_core::ParleyError;
use parley_infrastructure::ParleyPaths;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

const LOG_FILE_PREFIX: &str = "parley.log";

/// Installs the global subscriber.
///
/// The returned guard flushes the file writer on drop and must be held for
/// the lifetime of the program. `None` means logging fell back to stderr.
pub fn init(level: &str) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    match prepare_log_dir() {
        Ok(dir) => {
            let appender = tracing_appender::rolling::daily(&dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_writer(writer)
                        .with_ansi(false),
                )
                .init();
            tracing::info!("[Logging] Writing logs to {}", dir.display());
            Some(guard)
        }
        Err(e) => {
            tracing_subscriber::registry()
                .with(EnvFilter::new("warn"))
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
            tracing::warn!("[Logging] Log directory unavailable ({}); using stderr", e);
            None
        }
    }
}

fn prepare_log_dir() -> Result<PathBuf, ParleyError> {
    let dir = ParleyPaths::log_dir()?;
    fs::create_dir_all(&dir).map_err(|e| ParleyError::io("create", &dir, &e))?;
    Ok(dir)
}
