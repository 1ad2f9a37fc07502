//! Logging initialization for host applications.

use tracing_subscriber::{fmt, EnvFilter};

/// Initialize tracing for the process.
///
/// Log level comes from `RUST_LOG` when set, otherwise `level`. Safe to
/// call once per process; later calls are ignored.
///
/// # Example
///
/// ```ignore
/// init_logging("info");
/// tracing::info!("App started");
/// ```
pub fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init();
}
