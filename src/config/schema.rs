//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the mock layer.
//! All types derive Serde traits for deserialization from config files.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct MockConfig {
    /// Logging and diagnostic output.
    pub diagnostics: DiagnosticsConfig,

    /// Realistic delay range used by `delay("real")`.
    pub delay: DelayConfig,

    /// Pass-through (`fetch`) settings.
    pub passthrough: PassthroughConfig,

    /// Declarative handlers, evaluated in order.
    pub handlers: Vec<HandlerConfig>,
}

/// Diagnostics configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DiagnosticsConfig {
    /// Log level (trace, debug, info, warn, error, off).
    pub log_level: String,

    /// Suppress per-request log records. Construction warnings still fire.
    pub quiet: bool,
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            quiet: false,
        }
    }
}

/// Bounds of the realistic response delay.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DelayConfig {
    pub realistic_min_ms: u64,
    pub realistic_max_ms: u64,
}

impl Default for DelayConfig {
    fn default() -> Self {
        Self {
            realistic_min_ms: 100,
            realistic_max_ms: 400,
        }
    }
}

/// Pass-through request settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PassthroughConfig {
    /// Timeout for the real request in seconds.
    pub timeout_secs: u64,

    /// Header added to pass-through requests so they are not mocked again.
    pub bypass_header: String,
}

impl Default for PassthroughConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            bypass_header: crate::http::context::DEFAULT_BYPASS_HEADER.to_string(),
        }
    }
}

/// A handler defined in configuration instead of code.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HandlerConfig {
    /// Identifier for logging.
    pub name: Option<String>,

    /// HTTP method, or `ALL`.
    pub method: String,

    /// Path template (`/user/:id`), absolute URL template, or regex.
    pub mask: String,

    /// Treat `mask` as a regular expression.
    #[serde(default)]
    pub regex: bool,

    #[serde(default = "default_status")]
    pub status: u16,

    /// Custom reason phrase; canonical one when absent.
    pub status_text: Option<String>,

    #[serde(default)]
    pub headers: BTreeMap<String, String>,

    #[serde(default)]
    pub cookies: BTreeMap<String, String>,

    /// At most one of `text`, `json`, `xml`, `body`.
    pub text: Option<String>,
    pub json: Option<serde_json::Value>,
    pub xml: Option<String>,
    pub body: Option<String>,

    /// Milliseconds, or `real` / `infinite`.
    pub delay: Option<String>,

    #[serde(default)]
    pub once: bool,
}

fn default_status() -> u16 {
    200
}

impl HandlerConfig {
    /// Name used in logs and validation messages.
    pub fn label(&self, index: usize) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| format!("handlers[{}]", index))
    }

    pub fn body_count(&self) -> usize {
        [
            self.text.is_some(),
            self.json.is_some(),
            self.xml.is_some(),
            self.body.is_some(),
        ]
        .iter()
        .filter(|set| **set)
        .count()
    }
}
