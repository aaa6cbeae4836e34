//! Error types shared across subsystems.
//!
//! # Design Decisions
//! - Matcher failures and resolver failures stay distinct so callers can
//!   tell a broken pattern from a resolver that gave up
//! - Resolver errors are carried as the original boxed error, never rewrapped
//! - Construction warnings are not errors; they go through the diagnostic sink

use thiserror::Error;

/// Error type a resolver may return.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Failure raised by a URL matcher.
#[derive(Debug, Error)]
pub enum MatchError {
    /// The mask could not be compiled into a matcher.
    #[error("Invalid mask pattern {pattern:?}: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// Errors raised while building a mock response.
#[derive(Debug, Error)]
pub enum MockError {
    /// Header name rejected by the HTTP layer.
    #[error("Invalid header name: {0:?}")]
    InvalidHeaderName(String),

    /// Header value rejected by the HTTP layer.
    #[error("Invalid value for header {0:?}")]
    InvalidHeaderValue(String),

    /// Status code outside 100..=999.
    #[error("Invalid status code: {0}")]
    InvalidStatus(u16),

    /// JSON body could not be serialized.
    #[error("Failed to serialize JSON body: {0}")]
    Json(#[from] serde_json::Error),

    /// Pass-through request failed.
    #[error("Pass-through request failed: {0}")]
    Fetch(#[from] reqwest::Error),
}

/// Outcome of driving one handler through its lifecycle.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// `parse` failed; nothing else ran.
    #[error(transparent)]
    Match(#[from] MatchError),

    /// The resolver failed. Holds exactly what the resolver returned.
    #[error(transparent)]
    Resolver(BoxError),
}

impl DispatchError {
    /// Unwrap the resolver's own error, if that is what failed.
    pub fn into_resolver_error(self) -> Option<BoxError> {
        match self {
            DispatchError::Resolver(e) => Some(e),
            DispatchError::Match(_) => None,
        }
    }
}
