use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter, e.g. `chore_wheel=debug`.
pub const LOG_ENV: &str = "CHORE_WHEEL_LOG";

/// Install the fmt subscriber. `default_filter` applies when [`LOG_ENV`] is
/// unset or unparsable. Calling this more than once is harmless.
pub fn init_logging(default_filter: &str) {
    let filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default_filter));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
