//! Diagnostic channel.
//!
//! # Responsibilities
//! - Carry construction warnings and per-request records out of handlers
//! - Provide a process-wide default channel, installed once at startup
//!
//! # Design Decisions
//! - Handlers hold an `Arc<dyn DiagnosticSink>`; tests swap in `MemorySink`
//! - `emit` may fail; handlers swallow the failure
//! - Default sink renders through `tracing`

use std::fmt;
use std::sync::{Arc, Mutex, OnceLock};

use thiserror::Error;

use crate::observability::record::RequestLogRecord;

#[derive(Debug, Error)]
pub enum DiagnosticError {
    #[error("Failed to render log record: {0}")]
    Render(#[from] serde_json::Error),

    #[error("Diagnostic sink unavailable: {0}")]
    Unavailable(String),
}

/// Port through which handlers report diagnostics.
pub trait DiagnosticSink: Send + Sync + fmt::Debug {
    fn warn(&self, message: &str);
    fn emit(&self, record: &RequestLogRecord) -> Result<(), DiagnosticError>;
}

/// Renders diagnostics as `tracing` events.
#[derive(Debug, Clone, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn warn(&self, message: &str) {
        tracing::warn!(target: "rest_mock", "{}", message);
    }

    fn emit(&self, record: &RequestLogRecord) -> Result<(), DiagnosticError> {
        let request = serde_json::to_string(&record.request)?;
        let handler = serde_json::to_string(&record.handler)?;
        let response = serde_json::to_string(&record.response)?;
        tracing::info!(
            target: "rest_mock",
            timestamp = %record.timestamp,
            method = %record.method,
            url = %record.public_url,
            status = record.status,
            severity = %record.severity,
            color = record.severity.color(),
            request = %request,
            handler = %handler,
            response = %response,
            "{}",
            record.summary()
        );
        Ok(())
    }
}

/// Discards everything.
#[derive(Debug, Clone, Default)]
pub struct NoopSink;

impl DiagnosticSink for NoopSink {
    fn warn(&self, _message: &str) {}

    fn emit(&self, _record: &RequestLogRecord) -> Result<(), DiagnosticError> {
        Ok(())
    }
}

/// Keeps diagnostics in memory for inspection.
#[derive(Debug, Default)]
pub struct MemorySink {
    warnings: Mutex<Vec<String>>,
    records: Mutex<Vec<RequestLogRecord>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn warnings(&self) -> Vec<String> {
        self.warnings
            .lock()
            .map(|w| w.clone())
            .unwrap_or_default()
    }

    pub fn records(&self) -> Vec<RequestLogRecord> {
        self.records
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }
}

impl DiagnosticSink for MemorySink {
    fn warn(&self, message: &str) {
        if let Ok(mut warnings) = self.warnings.lock() {
            warnings.push(message.to_string());
        }
    }

    fn emit(&self, record: &RequestLogRecord) -> Result<(), DiagnosticError> {
        self.records
            .lock()
            .map_err(|e| DiagnosticError::Unavailable(e.to_string()))?
            .push(record.clone());
        Ok(())
    }
}

static DEFAULT_SINK: OnceLock<Arc<dyn DiagnosticSink>> = OnceLock::new();

/// Install the process-wide sink. Fails if one is already in place.
pub fn install_default_sink(sink: Arc<dyn DiagnosticSink>) -> Result<(), Arc<dyn DiagnosticSink>> {
    DEFAULT_SINK.set(sink)
}

/// The process-wide sink; [`TracingSink`] unless another was installed first.
pub fn default_sink() -> Arc<dyn DiagnosticSink> {
    DEFAULT_SINK
        .get_or_init(|| Arc::new(TracingSink))
        .clone()
}
