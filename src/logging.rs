use tracing_subscriber::EnvFilter;

/// Install the fmt subscriber. The level comes from `RUST_LOG` and defaults
/// to `info`. Later calls are no-ops.
pub fn init() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .try_init();
}
