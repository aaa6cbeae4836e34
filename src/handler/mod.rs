//! Mock request handlers.
//!
//! # Data Flow
//! ```text
//! Construction (once per handler):
//!     Rest::get / post / ... (mask, resolver)
//!     → MaskResolver (ResolvedMask)
//!     → redundant query check (warning, never fatal)
//!     → RestHandler (immutable)
//!
//! Per request, driven by lifecycle::run:
//!     parse            → ParsedRequestState (single match evaluation)
//!     predicate        → method AND match
//!     public_request   → PublicRequest { request, params }
//!     resolve          → user resolver with ResponseComposer + Context
//!     log              → RequestLogRecord to the sink (best effort)
//! ```
//!
//! # Design Decisions
//! - The parse state is passed by reference to later steps; nothing re-matches
//! - Handlers share no mutable state between requests
//! - Resolver errors are returned to the caller as-is

use std::future::Future;
use std::sync::Arc;

use futures_util::future::BoxFuture;

use crate::error::{BoxError, MatchError};
use crate::http::{Context, IncomingRequest, MockResponse, ParsedRequestState, PublicRequest, ResponseComposer};

pub mod declarative;
pub mod lifecycle;
pub mod rest;

pub use rest::{HandlerMethod, InvalidMethod, Rest, RestHandler};

/// Future returned by a resolver.
pub type ResolverFuture = BoxFuture<'static, Result<MockResponse, BoxError>>;

/// User function producing a mock response for a matched request.
pub type Resolver =
    Arc<dyn Fn(PublicRequest, ResponseComposer, Context) -> ResolverFuture + Send + Sync>;

/// Wrap an async closure as a [`Resolver`].
pub fn resolver<F, Fut>(f: F) -> Resolver
where
    F: Fn(PublicRequest, ResponseComposer, Context) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<MockResponse, BoxError>> + Send + 'static,
{
    Arc::new(
        move |req: PublicRequest, res: ResponseComposer, ctx: Context| -> ResolverFuture {
            Box::pin(f(req, res, ctx))
        },
    )
}

/// Lifecycle every mock handler implements.
///
/// Callers invoke `parse`, then `predicate` with the state `parse` returned.
/// Only when the predicate holds do `public_request`, `resolve` and `log`
/// follow, in that order. See [`lifecycle::run`].
pub trait RequestHandler: Send + Sync {
    /// Evaluate the mask against the request URL. Fails only if the matcher does.
    fn parse(&self, req: &IncomingRequest) -> Result<ParsedRequestState, MatchError>;

    /// Whether this handler claims the request. Pure.
    fn predicate(&self, req: &IncomingRequest, parsed: &ParsedRequestState) -> bool;

    /// The request as the resolver will see it.
    fn public_request(&self, req: &IncomingRequest, parsed: &ParsedRequestState) -> PublicRequest;

    fn resolve(&self, req: PublicRequest, res: ResponseComposer, ctx: Context) -> ResolverFuture;

    /// Toolkit passed to `resolve`.
    fn define_context(&self) -> Context;

    /// Report a resolved request. Must not fail or alter anything.
    fn log(&self, req: &IncomingRequest, res: &MockResponse);
}
