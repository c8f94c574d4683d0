//! Logging setup for the idobata binaries.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the tracing subscriber with the specified default log level.
///
/// The level can be overridden with the `RUST_LOG` environment variable.
///
/// # Arguments
///
/// * `binary_name` - The name of the binary (e.g., "idobata-server")
/// * `default_level` - The default log level (e.g., "debug", "info")
pub fn setup_logger(binary_name: &str, default_level: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!(
                    "idobata_shared={default_level},idobata_server={default_level},\
                     idobata_client={default_level},{}={default_level}",
                    binary_name.replace('-', "_")
                )
                .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
