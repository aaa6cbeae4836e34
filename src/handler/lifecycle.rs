//! Drives one handler through the request lifecycle.
//!
//! # Design Decisions
//! - Fixed order: parse, predicate, then public_request, resolve, log
//! - `parse` runs once; its state feeds every later step
//! - `log` runs only after a successful resolve, and a panicking sink is contained

use std::panic::{self, AssertUnwindSafe};

use crate::error::DispatchError;
use crate::handler::RequestHandler;
use crate::http::{IncomingRequest, MockResponse, ResponseComposer};

/// Run `req` through `handler`.
///
/// Returns `Ok(None)` when the handler does not claim the request.
pub async fn run<H>(handler: &H, req: &IncomingRequest) -> Result<Option<MockResponse>, DispatchError>
where
    H: RequestHandler + ?Sized,
{
    let parsed = handler.parse(req)?;
    if !handler.predicate(req, &parsed) {
        return Ok(None);
    }

    let public = handler.public_request(req, &parsed);
    let response = handler
        .resolve(public, ResponseComposer::new(), handler.define_context())
        .await
        .map_err(DispatchError::Resolver)?;

    if panic::catch_unwind(AssertUnwindSafe(|| handler.log(req, &response))).is_err() {
        tracing::warn!(method = %req.method, url = %req.url, "Request logging panicked");
    }

    Ok(Some(response))
}
