//! Request types seen by handlers.
//!
//! # Responsibilities
//! - Model the intercepted request (read-only to handlers)
//! - Hold per-request parse state between `parse` and `predicate`
//! - Project the request plus path params for resolvers
//!
//! # Design Decisions
//! - `PublicRequest` owns a copy; the original stays with the interception layer
//! - `params` is always present, possibly empty

use std::collections::BTreeMap;
use std::ops::Deref;

use bytes::Bytes;
use hyper::header::{HeaderName, HeaderValue};
use hyper::{HeaderMap, Method};
use serde::de::DeserializeOwned;
use url::Url;

use crate::error::MockError;
use crate::routing::MatchResult;

/// A captured outgoing request.
#[derive(Debug, Clone)]
pub struct IncomingRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    /// Referrer of the page or client that issued the request.
    pub referrer: Option<String>,
    pub body: Bytes,
}

impl IncomingRequest {
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            headers: HeaderMap::new(),
            referrer: None,
            body: Bytes::new(),
        }
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Result<Self, MockError> {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|_| MockError::InvalidHeaderName(name.to_string()))?;
        let value = HeaderValue::from_str(value)
            .map_err(|_| MockError::InvalidHeaderValue(name.as_str().to_string()))?;
        self.headers.append(name, value);
        Ok(self)
    }

    pub fn with_referrer(mut self, referrer: impl Into<String>) -> Self {
        self.referrer = Some(referrer.into());
        self
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// `scheme://host[:port]` of the request URL.
    pub fn origin(&self) -> String {
        self.url.origin().ascii_serialization()
    }

    /// First value of a query parameter.
    pub fn query(&self, name: &str) -> Option<String> {
        self.url
            .query_pairs()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.into_owned())
    }

    /// Body as UTF-8, lossy.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }
}

/// Transient state produced by `parse`, consumed by `predicate` and projection.
#[derive(Debug, Clone, Default)]
pub struct ParsedRequestState {
    pub match_result: MatchResult,
}

/// The request as a resolver sees it.
#[derive(Debug, Clone)]
pub struct PublicRequest {
    pub request: IncomingRequest,
    pub params: BTreeMap<String, String>,
}

impl PublicRequest {
    pub fn new(request: &IncomingRequest, params: BTreeMap<String, String>) -> Self {
        Self {
            request: request.clone(),
            params,
        }
    }

    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }
}

impl Deref for PublicRequest {
    type Target = IncomingRequest;

    fn deref(&self) -> &Self::Target {
        &self.request
    }
}
