//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check handler definitions (method, status, single body kind, mask syntax)
//! - Validate value ranges (delay bounds) and header names
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: MockConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use hyper::header::{HeaderName, HeaderValue};
use regex::Regex;
use thiserror::Error;

use crate::config::schema::{HandlerConfig, MockConfig};
use crate::handler::HandlerMethod;
use crate::http::DelayMode;

const LOG_LEVELS: [&str; 6] = ["trace", "debug", "info", "warn", "error", "off"];

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("unknown log level {0:?}")]
    LogLevel(String),

    #[error("realistic delay range is inverted: min {min}ms > max {max}ms")]
    DelayRange { min: u64, max: u64 },

    #[error("invalid bypass header {0:?}")]
    BypassHeader(String),

    #[error("{handler}: invalid method {method:?}")]
    Method { handler: String, method: String },

    #[error("{handler}: invalid status {status}")]
    Status { handler: String, status: u16 },

    #[error("{handler}: only one of text, json, xml, body may be set")]
    ConflictingBodies { handler: String },

    #[error("{handler}: invalid regex mask: {reason}")]
    Regex { handler: String, reason: String },

    #[error("{handler}: mask {mask:?} carries a query string; match the path and read query parameters in the response instead")]
    QueryInMask { handler: String, mask: String },

    #[error("{handler}: invalid header {name:?}")]
    Header { handler: String, name: String },

    #[error("{handler}: invalid delay {delay:?}")]
    Delay { handler: String, delay: String },
}

/// Validate a configuration, collecting every problem found.
pub fn validate_config(config: &MockConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let level = config.diagnostics.log_level.to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ValidationError::LogLevel(config.diagnostics.log_level.clone()));
    }

    if config.delay.realistic_min_ms > config.delay.realistic_max_ms {
        errors.push(ValidationError::DelayRange {
            min: config.delay.realistic_min_ms,
            max: config.delay.realistic_max_ms,
        });
    }

    if HeaderName::from_bytes(config.passthrough.bypass_header.as_bytes()).is_err() {
        errors.push(ValidationError::BypassHeader(
            config.passthrough.bypass_header.clone(),
        ));
    }

    for (index, handler) in config.handlers.iter().enumerate() {
        validate_handler(&handler.label(index), handler, &mut errors);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_handler(label: &str, handler: &HandlerConfig, errors: &mut Vec<ValidationError>) {
    if handler.method.parse::<HandlerMethod>().is_err() {
        errors.push(ValidationError::Method {
            handler: label.to_string(),
            method: handler.method.clone(),
        });
    }

    if !(100..=999).contains(&handler.status) {
        errors.push(ValidationError::Status {
            handler: label.to_string(),
            status: handler.status,
        });
    }

    if handler.body_count() > 1 {
        errors.push(ValidationError::ConflictingBodies {
            handler: label.to_string(),
        });
    }

    if handler.regex {
        if let Err(e) = Regex::new(&handler.mask) {
            errors.push(ValidationError::Regex {
                handler: label.to_string(),
                reason: e.to_string(),
            });
        }
    } else if handler.mask.contains('?') {
        errors.push(ValidationError::QueryInMask {
            handler: label.to_string(),
            mask: handler.mask.clone(),
        });
    }

    for (name, value) in &handler.headers {
        if HeaderName::from_bytes(name.as_bytes()).is_err() || HeaderValue::from_str(value).is_err()
        {
            errors.push(ValidationError::Header {
                handler: label.to_string(),
                name: name.clone(),
            });
        }
    }

    if let Some(delay) = &handler.delay {
        if delay.parse::<DelayMode>().is_err() {
            errors.push(ValidationError::Delay {
                handler: label.to_string(),
                delay: delay.clone(),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handler(method: &str, mask: &str) -> HandlerConfig {
        HandlerConfig {
            name: None,
            method: method.to_string(),
            mask: mask.to_string(),
            regex: false,
            status: 200,
            status_text: None,
            headers: Default::default(),
            cookies: Default::default(),
            text: None,
            json: None,
            xml: None,
            body: None,
            delay: None,
            once: false,
        }
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&MockConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = MockConfig::default();
        config.diagnostics.log_level = "loud".to_string();
        config.delay.realistic_min_ms = 500;
        config.delay.realistic_max_ms = 10;

        let mut bad = handler("FETCH ME", "/search?q=1");
        bad.status = 42;
        bad.text = Some("a".into());
        bad.xml = Some("<a/>".into());
        bad.delay = Some("soon".into());
        bad.headers.insert("bad header".into(), "v".into());
        config.handlers.push(bad);

        let mut regex = handler("all", "(unclosed");
        regex.regex = true;
        regex.name = Some("broken-regex".into());
        config.handlers.push(regex);

        let errors = validate_config(&config).unwrap_err();
        assert!(errors.contains(&ValidationError::LogLevel("loud".into())));
        assert!(errors.contains(&ValidationError::DelayRange { min: 500, max: 10 }));
        assert!(errors.contains(&ValidationError::Method {
            handler: "handlers[0]".into(),
            method: "FETCH ME".into(),
        }));
        assert!(errors.contains(&ValidationError::Status {
            handler: "handlers[0]".into(),
            status: 42,
        }));
        assert!(errors.contains(&ValidationError::ConflictingBodies {
            handler: "handlers[0]".into(),
        }));
        assert!(errors.contains(&ValidationError::QueryInMask {
            handler: "handlers[0]".into(),
            mask: "/search?q=1".into(),
        }));
        assert!(errors.iter().any(|e| matches!(e, ValidationError::Header { .. })));
        assert!(errors.iter().any(|e| matches!(e, ValidationError::Delay { .. })));
        assert!(errors
            .iter()
            .any(|e| matches!(e, ValidationError::Regex { handler, .. } if handler == "broken-regex")));
        assert_eq!(errors.len(), 9);
    }
}
