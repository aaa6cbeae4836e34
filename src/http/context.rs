//! Context toolkit handed to every resolver.
//!
//! # Responsibilities
//! - Build response transforms: `set`, `status`, `cookie`, `body`, `text`,
//!   `json`, `xml`, `delay`
//! - Perform pass-through requests against the real network (`fetch`)
//!
//! # Design Decisions
//! - One `Context` shape for every handler and method
//! - Transforms are plain values; nothing happens until they are composed
//! - Pass-through requests carry a bypass header so the interception layer
//!   can let them through untouched

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use hyper::header::{HeaderName, HeaderValue, CONTENT_TYPE};
use hyper::{HeaderMap, StatusCode};
use rand::Rng;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::{DelayConfig, PassthroughConfig};
use crate::error::MockError;
use crate::http::request::IncomingRequest;
use crate::http::response::Cookie;

/// Largest delay a timer can represent (2^31 - 1 ms).
pub const MAX_DELAY_MS: u64 = 2_147_483_647;

/// Header marking pass-through requests when none is configured.
pub const DEFAULT_BYPASS_HEADER: &str = "x-mock-bypass";

/// A single change to a mock response.
#[derive(Debug, Clone)]
pub enum Transform {
    Header { name: String, value: String },
    /// Adds a value without replacing the ones already set.
    AppendHeader { name: String, value: String },
    Status { code: u16, text: Option<String> },
    Cookie(Cookie),
    Body(Bytes),
    TypedBody {
        content_type: &'static str,
        body: Bytes,
    },
    Delay(Duration),
}

/// How long to hold a response back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DelayMode {
    /// Random, network-like latency from the configured range.
    Real,
    /// Never deliver within any practical time.
    Infinite,
    Exact(Duration),
}

impl From<Duration> for DelayMode {
    fn from(d: Duration) -> Self {
        DelayMode::Exact(d)
    }
}

impl From<u64> for DelayMode {
    fn from(ms: u64) -> Self {
        DelayMode::Exact(Duration::from_millis(ms))
    }
}

impl FromStr for DelayMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "real" => Ok(DelayMode::Real),
            "infinite" => Ok(DelayMode::Infinite),
            other => other
                .parse::<u64>()
                .map(DelayMode::from)
                .map_err(|_| format!("unknown delay mode: {other}")),
        }
    }
}

/// Response of a pass-through request.
#[derive(Debug, Clone)]
pub struct FetchedResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl FetchedResponse {
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }

    /// Transforms that reproduce this response: status, headers, body.
    pub fn into_transforms(self) -> Vec<Transform> {
        let mut transforms = vec![Transform::Status {
            code: self.status.as_u16(),
            text: None,
        }];
        for name in self.headers.keys() {
            let values = self
                .headers
                .get_all(name)
                .iter()
                .filter_map(|v| v.to_str().ok());
            for (i, value) in values.enumerate() {
                let (name, value) = (name.as_str().to_string(), value.to_string());
                transforms.push(if i == 0 {
                    Transform::Header { name, value }
                } else {
                    Transform::AppendHeader { name, value }
                });
            }
        }
        transforms.push(Transform::Body(self.body));
        transforms
    }
}

#[derive(Debug)]
struct ContextInner {
    client: reqwest::Client,
    realistic_min_ms: u64,
    realistic_max_ms: u64,
    bypass_header: HeaderName,
}

/// The toolkit passed to every resolver. Cheap to clone.
#[derive(Debug, Clone)]
pub struct Context {
    inner: Arc<ContextInner>,
}

impl Default for Context {
    fn default() -> Self {
        let delay = DelayConfig::default();
        Self {
            inner: Arc::new(ContextInner {
                client: reqwest::Client::new(),
                realistic_min_ms: delay.realistic_min_ms,
                realistic_max_ms: delay.realistic_max_ms,
                bypass_header: HeaderName::from_static(DEFAULT_BYPASS_HEADER),
            }),
        }
    }
}

impl Context {
    pub fn new(delay: &DelayConfig, passthrough: &PassthroughConfig) -> Result<Self, MockError> {
        let bypass_header = HeaderName::from_bytes(passthrough.bypass_header.as_bytes())
            .map_err(|_| MockError::InvalidHeaderName(passthrough.bypass_header.clone()))?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(passthrough.timeout_secs))
            .build()?;

        Ok(Self {
            inner: Arc::new(ContextInner {
                client,
                realistic_min_ms: delay.realistic_min_ms,
                realistic_max_ms: delay.realistic_max_ms,
                bypass_header,
            }),
        })
    }

    /// Set a response header, replacing any previous value.
    pub fn set(&self, name: impl Into<String>, value: impl Into<String>) -> Transform {
        Transform::Header {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Set the status code with its canonical reason phrase.
    pub fn status(&self, code: u16) -> Transform {
        Transform::Status { code, text: None }
    }

    pub fn status_text(&self, code: u16, text: impl Into<String>) -> Transform {
        Transform::Status {
            code,
            text: Some(text.into()),
        }
    }

    pub fn cookie(&self, name: impl Into<String>, value: impl Into<String>) -> Transform {
        Transform::Cookie(Cookie {
            name: name.into(),
            value: value.into(),
        })
    }

    /// Raw body; content type left untouched.
    pub fn body(&self, body: impl Into<Bytes>) -> Transform {
        Transform::Body(body.into())
    }

    pub fn text(&self, body: impl Into<String>) -> Transform {
        Transform::TypedBody {
            content_type: "text/plain",
            body: Bytes::from(body.into()),
        }
    }

    pub fn json<T: Serialize + ?Sized>(&self, value: &T) -> Result<Transform, MockError> {
        Ok(Transform::TypedBody {
            content_type: "application/json",
            body: Bytes::from(serde_json::to_vec(value)?),
        })
    }

    pub fn xml(&self, body: impl Into<String>) -> Transform {
        Transform::TypedBody {
            content_type: "text/xml",
            body: Bytes::from(body.into()),
        }
    }

    pub fn delay(&self, mode: impl Into<DelayMode>) -> Transform {
        let delay = match mode.into() {
            DelayMode::Exact(d) => d,
            DelayMode::Infinite => Duration::from_millis(MAX_DELAY_MS),
            DelayMode::Real => Duration::from_millis(self.realistic_delay_ms()),
        };
        Transform::Delay(delay)
    }

    fn realistic_delay_ms(&self) -> u64 {
        let (min, max) = (self.inner.realistic_min_ms, self.inner.realistic_max_ms);
        if max <= min {
            return min;
        }
        rand::thread_rng().gen_range(min..=max)
    }

    /// Perform the request for real and return what the network answered.
    pub async fn fetch(&self, req: &IncomingRequest) -> Result<FetchedResponse, MockError> {
        let mut headers = req.headers.clone();
        headers.insert(self.inner.bypass_header.clone(), HeaderValue::from_static("true"));

        tracing::debug!(method = %req.method, url = %req.url, "Passing request through");

        let response = self
            .inner
            .client
            .request(req.method.clone(), req.url.clone())
            .headers(headers)
            .body(req.body.clone())
            .send()
            .await?;

        let status = response.status();
        let mut headers = response.headers().clone();
        let body = response.bytes().await?;
        // The body is re-framed by whoever serves the mock.
        headers.remove(hyper::header::CONTENT_LENGTH);
        headers.remove(hyper::header::TRANSFER_ENCODING);
        if headers.get(CONTENT_TYPE).is_none() && !body.is_empty() {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/octet-stream"));
        }

        Ok(FetchedResponse {
            status,
            headers,
            body,
        })
    }
}
