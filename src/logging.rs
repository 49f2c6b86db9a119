//! Logging setup.
//!
//! On Linux, logs go to the systemd journal when it is reachable. Otherwise
//! they go to a daily log file, so stdout stays reserved for the printed
//! series.

use anyhow::Result;
use std::path::PathBuf;
use std::sync::OnceLock;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Keeps the file writer flushing until the process exits.
static GUARD: OnceLock<WorkerGuard> = OnceLock::new();

/// Initialize the logging system.
///
/// Level comes from `PHOTOFREQ_LOG` (`debug`, `info`, `warn`, `error`, or
/// any `EnvFilter` directive), defaulting to `info`.
pub fn init(log_dir: Option<PathBuf>) -> Result<()> {
    let env_filter =
        EnvFilter::try_from_env("PHOTOFREQ_LOG").unwrap_or_else(|_| EnvFilter::new("info"));

    #[cfg(target_os = "linux")]
    {
        if let Ok(journald_layer) = tracing_journald::layer() {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(journald_layer)
                .try_init()?;

            tracing::debug!("Logging to journald");
            return Ok(());
        }
    }

    let log_dir = log_dir.unwrap_or_else(default_log_dir);
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = tracing_appender::rolling::daily(&log_dir, "photofreq.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    let _ = GUARD.set(guard);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
        .try_init()?;

    tracing::debug!("Logging to {:?}", log_dir);
    Ok(())
}

fn default_log_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("photofreq")
        .join("logs")
}
