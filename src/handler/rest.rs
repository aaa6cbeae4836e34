//! Method-scoped REST handlers.
//!
//! # Responsibilities
//! - Build one handler per (method, mask, resolver)
//! - Warn once at construction about query parameters in URL masks
//! - Implement the handler lifecycle on top of the URL matcher
//!
//! # Design Decisions
//! - Method comparison is case-insensitive; `ALL` accepts every method
//! - Collaborators (matcher, mask resolver, sink, context) are shared `Arc`s
//!   held by the factory and copied into each handler
//! - An empty exact mask is a wildcard with no params

use std::collections::BTreeMap;
use std::fmt;
use std::future::Future;
use std::str::FromStr;
use std::sync::Arc;

use hyper::Method;
use thiserror::Error;
use uuid::Uuid;

use crate::config::MockConfig;
use crate::error::{BoxError, MatchError, MockError};
use crate::handler::{resolver, RequestHandler, Resolver, ResolverFuture};
use crate::http::{Context, IncomingRequest, MockResponse, ParsedRequestState, PublicRequest, ResponseComposer};
use crate::observability::diagnostics::{default_sink, DiagnosticSink};
use crate::observability::record::{HandlerInfo, RequestLogRecord};
use crate::observability::warnings::redundant_query_warning;
use crate::routing::{
    equals_case_insensitive, DefaultMaskResolver, Mask, MaskResolver, PathMatcher, ResolvedMask,
    UrlMatcher,
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid HTTP method: {0:?}")]
pub struct InvalidMethod(pub String);

/// Method a handler is bound to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandlerMethod {
    Exact(Method),
    /// Any method.
    All,
}

impl HandlerMethod {
    pub fn accepts(&self, method: &Method) -> bool {
        match self {
            HandlerMethod::All => true,
            HandlerMethod::Exact(bound) => equals_case_insensitive(bound.as_str(), method.as_str()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            HandlerMethod::All => "ALL",
            HandlerMethod::Exact(m) => m.as_str(),
        }
    }
}

impl fmt::Display for HandlerMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Method> for HandlerMethod {
    fn from(m: Method) -> Self {
        HandlerMethod::Exact(m)
    }
}

impl FromStr for HandlerMethod {
    type Err = InvalidMethod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed == "*" || trimmed.eq_ignore_ascii_case("all") {
            return Ok(HandlerMethod::All);
        }
        if trimmed.is_empty() {
            return Err(InvalidMethod(s.to_string()));
        }
        Method::from_bytes(trimmed.to_ascii_uppercase().as_bytes())
            .map(HandlerMethod::Exact)
            .map_err(|_| InvalidMethod(s.to_string()))
    }
}

struct HandlerInner {
    id: Uuid,
    name: Option<String>,
    method: HandlerMethod,
    mask: Mask,
    resolved_mask: ResolvedMask,
    resolver: Resolver,
    matcher: Arc<dyn UrlMatcher>,
    sink: Arc<dyn DiagnosticSink>,
    context: Context,
    quiet: bool,
}

/// A handler bound to one method, one mask and one resolver.
#[derive(Clone)]
pub struct RestHandler {
    inner: Arc<HandlerInner>,
}

impl fmt::Debug for RestHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RestHandler")
            .field("id", &self.inner.id)
            .field("name", &self.inner.name)
            .field("method", &self.inner.method)
            .field("mask", &self.inner.mask)
            .finish_non_exhaustive()
    }
}

impl RestHandler {
    pub fn id(&self) -> Uuid {
        self.inner.id
    }

    pub fn name(&self) -> Option<&str> {
        self.inner.name.as_deref()
    }

    pub fn method(&self) -> &HandlerMethod {
        &self.inner.method
    }

    pub fn mask(&self) -> &Mask {
        &self.inner.mask
    }

    pub fn resolved_mask(&self) -> &ResolvedMask {
        &self.inner.resolved_mask
    }

    pub fn info(&self) -> HandlerInfo {
        HandlerInfo {
            id: self.inner.id,
            name: self.inner.name.clone(),
            method: self.inner.method.to_string(),
            mask: self.inner.mask.to_string(),
        }
    }
}

impl RequestHandler for RestHandler {
    fn parse(&self, req: &IncomingRequest) -> Result<ParsedRequestState, MatchError> {
        let match_result = self
            .inner
            .matcher
            .match_url(&req.url, &self.inner.resolved_mask)?;
        Ok(ParsedRequestState { match_result })
    }

    fn predicate(&self, req: &IncomingRequest, parsed: &ParsedRequestState) -> bool {
        self.inner.method.accepts(&req.method) && parsed.match_result.matches
    }

    fn public_request(&self, req: &IncomingRequest, parsed: &ParsedRequestState) -> PublicRequest {
        let params = if self.inner.mask.is_empty() {
            BTreeMap::new()
        } else {
            parsed.match_result.params.clone()
        };
        PublicRequest::new(req, params)
    }

    fn resolve(&self, req: PublicRequest, res: ResponseComposer, ctx: Context) -> ResolverFuture {
        (self.inner.resolver)(req, res, ctx)
    }

    fn define_context(&self) -> Context {
        self.inner.context.clone()
    }

    fn log(&self, req: &IncomingRequest, res: &MockResponse) {
        if self.inner.quiet {
            return;
        }
        let record = RequestLogRecord::new(req, res, self.info());
        if let Err(e) = self.inner.sink.emit(&record) {
            tracing::debug!(
                handler_id = %self.inner.id,
                error = %e,
                "Dropped request log record"
            );
        }
    }
}

/// Factory for method-scoped handlers.
///
/// ```no_run
/// use rest_mock::handler::Rest;
///
/// let rest = Rest::new();
/// let handler = rest.get("/user/:id", |req, res, ctx| async move {
///     let id = req.param("id").unwrap_or_default().to_string();
///     Ok(res.compose([ctx.status(200), ctx.json(&serde_json::json!({ "id": id }))?])?)
/// });
/// ```
#[derive(Debug, Clone)]
pub struct Rest {
    matcher: Arc<dyn UrlMatcher>,
    mask_resolver: Arc<dyn MaskResolver>,
    sink: Arc<dyn DiagnosticSink>,
    context: Context,
    quiet: bool,
}

impl Default for Rest {
    fn default() -> Self {
        Self::new()
    }
}

macro_rules! method_factory {
    ($(#[$doc:meta])* $name:ident => $method:expr) => {
        $(#[$doc])*
        pub fn $name<F, Fut>(&self, mask: impl Into<Mask>, f: F) -> RestHandler
        where
            F: Fn(PublicRequest, ResponseComposer, Context) -> Fut + Send + Sync + 'static,
            Fut: Future<Output = Result<MockResponse, BoxError>> + Send + 'static,
        {
            self.handler($method, mask, resolver(f))
        }
    };
}

impl Rest {
    /// Default collaborators and the process-wide diagnostic sink.
    pub fn new() -> Self {
        Self {
            matcher: Arc::new(PathMatcher),
            mask_resolver: Arc::new(DefaultMaskResolver),
            sink: default_sink(),
            context: Context::default(),
            quiet: false,
        }
    }

    pub fn from_config(config: &MockConfig) -> Result<Self, MockError> {
        Ok(Self {
            context: Context::new(&config.delay, &config.passthrough)?,
            quiet: config.diagnostics.quiet,
            ..Self::new()
        })
    }

    pub fn with_matcher(mut self, matcher: Arc<dyn UrlMatcher>) -> Self {
        self.matcher = matcher;
        self
    }

    pub fn with_mask_resolver(mut self, mask_resolver: Arc<dyn MaskResolver>) -> Self {
        self.mask_resolver = mask_resolver;
        self
    }

    pub fn with_sink(mut self, sink: Arc<dyn DiagnosticSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn with_context(mut self, context: Context) -> Self {
        self.context = context;
        self
    }

    /// Suppress per-request records for handlers built from now on.
    pub fn quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    pub fn context(&self) -> &Context {
        &self.context
    }

    /// Build a handler for any method.
    pub fn handler(
        &self,
        method: impl Into<HandlerMethod>,
        mask: impl Into<Mask>,
        resolver: Resolver,
    ) -> RestHandler {
        self.build(method.into(), mask.into(), resolver, None)
    }

    pub(crate) fn build(
        &self,
        method: HandlerMethod,
        mask: Mask,
        resolver: Resolver,
        name: Option<String>,
    ) -> RestHandler {
        let resolved_mask = self.mask_resolver.resolve(&mask);
        if let Some(message) = redundant_query_warning(method.as_str(), &mask, &resolved_mask) {
            self.sink.warn(&message);
        }

        let id = Uuid::new_v4();
        tracing::debug!(handler_id = %id, method = %method, mask = %mask, "Handler created");

        RestHandler {
            inner: Arc::new(HandlerInner {
                id,
                name,
                method,
                mask,
                resolved_mask,
                resolver,
                matcher: self.matcher.clone(),
                sink: self.sink.clone(),
                context: self.context.clone(),
                quiet: self.quiet,
            }),
        }
    }

    method_factory!(
        /// `GET` handler.
        get => HandlerMethod::Exact(Method::GET)
    );
    method_factory!(
        /// `POST` handler.
        post => HandlerMethod::Exact(Method::POST)
    );
    method_factory!(
        /// `PUT` handler.
        put => HandlerMethod::Exact(Method::PUT)
    );
    method_factory!(
        /// `PATCH` handler.
        patch => HandlerMethod::Exact(Method::PATCH)
    );
    method_factory!(
        /// `DELETE` handler.
        delete => HandlerMethod::Exact(Method::DELETE)
    );
    method_factory!(
        /// `OPTIONS` handler.
        options => HandlerMethod::Exact(Method::OPTIONS)
    );
    method_factory!(
        /// `HEAD` handler.
        head => HandlerMethod::Exact(Method::HEAD)
    );
    method_factory!(
        /// Handler for every method.
        all => HandlerMethod::All
    );
}
