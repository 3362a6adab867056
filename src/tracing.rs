//! Logging setup
//!
//! Two layers:
//! - stderr, filtered by `RUST_LOG` (default `warn`), e.g.
//!   `RUST_LOG=prql_preview::panel=debug`
//! - a daily rolling file at `debug` level under the config logs directory
//!   (`~/.config/prql-preview/logs/prql-preview.log.YYYY-MM-DD`)
//!
//! stdout is never written: in bridge mode it belongs to the editor plugin.

use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::config_paths::LOG_FILE_PREFIX;

/// Flushes the log file when dropped; hold it for the life of `main`
#[must_use]
pub struct LogGuard {
    _file: Option<WorkerGuard>,
}

/// Install the global subscriber
pub fn init() -> LogGuard {
    let console_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_filter(console_filter);

    let (file_layer, guard) = match file_writer() {
        Some((writer, guard)) => {
            let layer = fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_thread_names(true)
                .with_line_number(true)
                .with_filter(EnvFilter::new("debug"));
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    if let Err(e) = tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .try_init()
    {
        eprintln!("Warning: Logging already initialized: {}", e);
    }

    LogGuard { _file: guard }
}

fn file_writer() -> Option<(NonBlocking, WorkerGuard)> {
    match crate::config_paths::ensure_logs_dir() {
        Ok(dir) => {
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            Some(tracing_appender::non_blocking(appender))
        }
        Err(e) => {
            eprintln!("Warning: File logging disabled: {}", e);
            None
        }
    }
}
