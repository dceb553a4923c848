use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// Directives used when `RUST_LOG` is unset.
const DEFAULT_FILTER: &str = "meridian=debug";

/// Install the file-writing subscriber for the CLI driver.
///
/// Returns the flush guard, which the caller keeps alive for the life of
/// the process; dropping it flushes and stops the background writer. When
/// a global subscriber is already installed (repeated calls under the test
/// harness) nothing changes and `None` comes back.
pub fn init_logging(directory: impl AsRef<Path>, file_name: &str) -> Option<WorkerGuard> {
    let directory = directory.as_ref();
    let _ = std::fs::create_dir_all(directory);

    let appender = tracing_appender::rolling::never(directory, file_name);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_target(true)
        .with_writer(writer)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .ok()
        .map(|_| guard)
}
