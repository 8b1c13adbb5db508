use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "DELAY_KPI_LOG";

/// Installs the global fmt subscriber. Filter comes from `DELAY_KPI_LOG`, defaulting to `info`.
pub fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
