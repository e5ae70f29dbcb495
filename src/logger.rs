use tracing_subscriber::{EnvFilter, fmt};

/// Initialise the logging system.
///
/// The level is read from `RUST_LOG` and defaults to `info`.
///
/// Examples:
/// - RUST_LOG=debug marktest demo
/// - RUST_LOG=marktest::discovery=trace marktest demo
pub fn init_logger() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!("Logger initialized");
}
