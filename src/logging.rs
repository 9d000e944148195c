//! Tracing subscriber set-up
//!
//! Events go to stdout and, when a log directory is configured, to a daily
//! rolling file written from a background thread.

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::error::LoggingError;

pub const LOG_FILE_PREFIX: &str = "contact-directory";
pub const LOG_FILE_SUFFIX: &str = "log";

/// Daily appender writing `contact-directory.YYYY-MM-DD.log` under `dir`
pub fn file_appender(dir: &Path) -> Result<RollingFileAppender, LoggingError> {
    let appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(LOG_FILE_PREFIX)
        .filename_suffix(LOG_FILE_SUFFIX)
        .build(dir)?;
    Ok(appender)
}

/// Installs the global subscriber.
///
/// The returned guard flushes the file writer when dropped, so it must be
/// held until the server stops.
pub fn init_logging(config: &Config) -> Result<Option<WorkerGuard>, LoggingError> {
    let filter = EnvFilter::try_new(&config.log_filter)?;

    let (file_writer, guard) = match &config.log_dir {
        Some(dir) => {
            let (writer, guard) = tracing_appender::non_blocking(file_appender(dir)?);
            (Some(writer), Some(guard))
        }
        None => (None, None),
    };

    let file_layer = file_writer.map(|writer| {
        fmt::layer()
            .with_writer(writer)
            .with_target(true)
            .with_ansi(false)
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stdout).with_target(true))
        .with(file_layer)
        .try_init()?;

    Ok(guard)
}
