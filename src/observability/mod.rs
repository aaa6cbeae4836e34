//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Handler construction:
//!     → warnings.rs (redundant query parameter check)
//!     → DiagnosticSink::warn
//!
//! After a request is resolved:
//!     → record.rs (RequestLogRecord: timestamp, URL, status, request, handler, response)
//!     → DiagnosticSink::emit (best effort)
//!
//! Sinks:
//!     → diagnostics.rs (TracingSink by default, MemorySink / NoopSink for tests)
//!     → logging.rs (tracing subscriber setup)
//! ```
//!
//! # Design Decisions
//! - Diagnostics never change control flow or response content
//! - One process-wide default sink, replaceable per `Rest` instance

pub mod diagnostics;
pub mod logging;
pub mod record;
pub mod warnings;

pub use diagnostics::{default_sink, DiagnosticError, DiagnosticSink, MemorySink, NoopSink, TracingSink};
pub use record::{HandlerInfo, RequestLogRecord, StatusSeverity};
