//! File-based logging for saavn-rs
//!
//! The terminal is owned by the TUI, so all tracing output goes to a
//! rolling file under `.logs/` instead of stdout.

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const LOG_DIR: &str = ".logs";
const LOG_FILE_PREFIX: &str = "saavn-rs";
const DEFAULT_FILTER: &str = "saavn_rs=debug,reqwest=info,symphonia=warn,warn";

/// Install the file subscriber. `RUST_LOG` overrides the default filter.
///
/// Buffered lines are flushed when the returned guard is dropped, so the
/// caller keeps it until shutdown.
pub fn init_logging() -> anyhow::Result<WorkerGuard> {
    std::fs::create_dir_all(LOG_DIR)?;

    let appender = RollingFileAppender::new(Rotation::DAILY, LOG_DIR, LOG_FILE_PREFIX);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .try_init()?;

    tracing::info!(dir = LOG_DIR, "Logging initialized");
    Ok(guard)
}

/// Log the start of a catalog request with its parameters
#[macro_export]
macro_rules! log_api_request {
    ($operation:expr, $($field:ident),+ $(,)?) => {
        tracing::debug!(operation = $operation, $($field),+, "API request started")
    };
}

/// Log how a catalog request that yields a list ended
#[macro_export]
macro_rules! log_api_result {
    ($operation:expr, $result:expr) => {
        match &$result {
            Ok(items) => tracing::info!(operation = $operation, count = items.len(), "API request successful"),
            Err(e) => tracing::error!(operation = $operation, error = %e, "API request failed"),
        }
    };
}
