use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{get_config_folder, get_log_file_path};

/// Initialize the logging system with both file and console output.
/// Returns a guard that must be kept alive for the duration of the program
/// to ensure all logs are flushed to the file.
pub fn init_logging(debug: bool) -> WorkerGuard {
    let log_folder = get_config_folder();
    let _ = std::fs::create_dir_all(&log_folder);

    let file_appender = tracing_appender::rolling::never(&log_folder, "gridart.log");
    let (non_blocking_file, guard) = tracing_appender::non_blocking(file_appender);

    // RUST_LOG wins over the debug setting
    let default_filter = if debug {
        "info,gridart=trace"
    } else {
        "info,gridart=debug"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(non_blocking_file)
                .with_ansi(false)
                .with_target(true)
                .with_file(true)
                .with_line_number(true),
        )
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(true)
                .with_target(false)
                .compact(),
        )
        .init();

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        "gridart logging initialized"
    );
    tracing::info!(log_path = %get_log_file_path().display(), "Log file location");

    guard
}
