use tracing_subscriber::EnvFilter;

/// Install the global tracing subscriber. Respects `RUST_LOG`, defaults to
/// `info`. Safe to call more than once; later calls are no-ops.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
