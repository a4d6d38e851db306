// Logging module - Logging infrastructure
use std::io;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize logging with the default filter. `RUST_LOG` overrides it.
pub fn init_logging() -> Result<(), Box<dyn std::error::Error>> {
    init_logging_with_filter("lancom=info,warn,error")
}

/// Initialize logging with an explicit default filter. Fails when a
/// global subscriber is already installed.
pub fn init_logging_with_filter(default_filter: &str) -> Result<(), Box<dyn std::error::Error>> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(io::stderr)
                .with_target(true)
                .with_level(true)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true),
        )
        .try_init()?;

    tracing::info!("LanCom logging initialized");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logging_init_is_exclusive() {
        // First initialization wins; the second reports the conflict.
        assert!(init_logging().is_ok());
        assert!(init_logging().is_err());
    }
}
