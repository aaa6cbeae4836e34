//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the tracing subscriber once per process
//! - Take the default level from configuration
//!
//! # Design Decisions
//! - Uses tracing crate for structured logging
//! - `RUST_LOG` overrides the configured level
//! - Re-initialization is a no-op so tests and embedders can call it freely

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::DiagnosticsConfig;

/// Filter directive used when `RUST_LOG` is unset.
pub fn default_directive(config: &DiagnosticsConfig) -> String {
    format!("rest_mock={}", config.log_level.to_ascii_lowercase())
}

/// Install the global subscriber. Returns false if one was already set.
pub fn init(config: &DiagnosticsConfig) -> bool {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_directive(config).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .try_init()
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directive() {
        let config = DiagnosticsConfig {
            log_level: "DEBUG".to_string(),
            quiet: false,
        };
        assert_eq!(default_directive(&config), "rest_mock=debug");
    }
}
