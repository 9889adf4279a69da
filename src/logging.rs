use tracing_subscriber::EnvFilter;

/// Logs go to stderr; stdout carries the report (or JSON).
pub fn setup_logger(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
}
