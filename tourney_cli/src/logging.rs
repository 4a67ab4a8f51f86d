//! Structured logging configuration.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize structured logging
///
/// `RUST_LOG` takes precedence; otherwise `default_level` applies. Records
/// emitted by the engine through the `log` facade are forwarded too.
pub fn init(default_level: &str) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();

    tracing::debug!("Structured logging initialized");
}

/// Log a rejected command with its category
pub fn log_rejection(command: &str, category: &str, message: &str) {
    tracing::warn!(command = command, category = category, "REJECTED: {}", message);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_rejection() {
        // Just ensure it doesn't panic without a subscriber
        log_rejection("record", "stale", "bracket changed");
    }
}
