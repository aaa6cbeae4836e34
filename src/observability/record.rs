//! Per-request log records.
//!
//! # Responsibilities
//! - Pick the public URL shape (path for same-origin, full URL otherwise)
//! - Map status codes to a severity marker
//! - Serialize request, handler identity and response for the sink
//!
//! # Design Decisions
//! - Records are plain data; sinks decide how to render them
//! - JSON bodies are parsed so they render structurally, anything else as text

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Local};
use hyper::header::CONTENT_TYPE;
use hyper::HeaderMap;
use serde::Serialize;
use serde_json::Value;
use url::Url;
use uuid::Uuid;

use crate::http::{IncomingRequest, MockResponse};

/// Visual severity of a response status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusSeverity {
    Success,
    Warning,
    Danger,
}

impl StatusSeverity {
    pub fn from_status(status: u16) -> Self {
        match status {
            s if s < 300 => StatusSeverity::Success,
            s if s < 400 => StatusSeverity::Warning,
            _ => StatusSeverity::Danger,
        }
    }

    /// Color used by console renderers.
    pub fn color(&self) -> &'static str {
        match self {
            StatusSeverity::Success => "#69AB32",
            StatusSeverity::Warning => "#F0BB4B",
            StatusSeverity::Danger => "#E95F5D",
        }
    }
}

impl fmt::Display for StatusSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            StatusSeverity::Success => "success",
            StatusSeverity::Warning => "warning",
            StatusSeverity::Danger => "danger",
        };
        f.write_str(s)
    }
}

/// Identity of the handler that produced a response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HandlerInfo {
    pub id: Uuid,
    pub name: Option<String>,
    pub method: String,
    pub mask: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SerializedRequest {
    pub method: String,
    pub url: String,
    pub headers: BTreeMap<String, String>,
    pub body: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SerializedResponse {
    pub status: u16,
    pub status_text: String,
    pub headers: BTreeMap<String, String>,
    pub body: Value,
}

impl From<&IncomingRequest> for SerializedRequest {
    fn from(req: &IncomingRequest) -> Self {
        Self {
            method: req.method.to_string(),
            url: req.url.to_string(),
            headers: flatten_headers(&req.headers),
            body: render_body(&req.headers, &req.body),
        }
    }
}

impl From<&MockResponse> for SerializedResponse {
    fn from(res: &MockResponse) -> Self {
        Self {
            status: res.status.as_u16(),
            status_text: res.status_text.clone(),
            headers: flatten_headers(&res.headers),
            body: res
                .body
                .as_ref()
                .map(|b| render_body(&res.headers, b))
                .unwrap_or(Value::Null),
        }
    }
}

/// One log entry for a mocked request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequestLogRecord {
    pub timestamp: String,
    pub method: String,
    pub public_url: String,
    pub status: u16,
    pub severity: StatusSeverity,
    pub request: SerializedRequest,
    pub handler: HandlerInfo,
    pub response: SerializedResponse,
}

impl RequestLogRecord {
    pub fn new(req: &IncomingRequest, res: &MockResponse, handler: HandlerInfo) -> Self {
        Self::at(Local::now(), req, res, handler)
    }

    pub fn at(
        now: DateTime<Local>,
        req: &IncomingRequest,
        res: &MockResponse,
        handler: HandlerInfo,
    ) -> Self {
        let status = res.status.as_u16();
        Self {
            timestamp: now.format("%H:%M:%S").to_string(),
            method: req.method.to_string(),
            public_url: public_url(req),
            status,
            severity: StatusSeverity::from_status(status),
            request: SerializedRequest::from(req),
            handler,
            response: SerializedResponse::from(res),
        }
    }

    /// One-line summary, e.g. `12:00:01 GET /user/42 (200)`.
    pub fn summary(&self) -> String {
        format!(
            "{} {} {} ({})",
            self.timestamp, self.method, self.public_url, self.status
        )
    }
}

/// Path only when the referrer shares the request origin, full URL otherwise.
pub fn public_url(req: &IncomingRequest) -> String {
    let origin = req.origin();
    let same_origin = req
        .referrer
        .as_deref()
        .and_then(|r| Url::parse(r).ok())
        .is_some_and(|r| r.origin() == req.url.origin());
    if same_origin {
        req.url.path().to_string()
    } else {
        format!("{}{}", origin, req.url.path())
    }
}

fn flatten_headers(headers: &HeaderMap) -> BTreeMap<String, String> {
    let mut flat: BTreeMap<String, String> = BTreeMap::new();
    for (name, value) in headers {
        let value = String::from_utf8_lossy(value.as_bytes()).into_owned();
        flat.entry(name.as_str().to_string())
            .and_modify(|existing| {
                existing.push_str(", ");
                existing.push_str(&value);
            })
            .or_insert(value);
    }
    flat
}

fn render_body(headers: &HeaderMap, body: &[u8]) -> Value {
    if body.is_empty() {
        return Value::Null;
    }
    let is_json = headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.contains("json"));
    if is_json {
        if let Ok(value) = serde_json::from_slice(body) {
            return value;
        }
    }
    Value::String(String::from_utf8_lossy(body).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::{Context, ResponseComposer};
    use chrono::TimeZone;
    use hyper::Method;
    use serde_json::json;

    fn info() -> HandlerInfo {
        HandlerInfo {
            id: Uuid::nil(),
            name: None,
            method: "GET".into(),
            mask: "/user/:id".into(),
        }
    }

    fn request(referrer: Option<&str>) -> IncomingRequest {
        let req = IncomingRequest::new(Method::GET, Url::parse("https://api.test/user/42?x=1").unwrap());
        match referrer {
            Some(r) => req.with_referrer(r),
            None => req,
        }
    }

    #[test]
    fn test_public_url_same_origin_is_path() {
        assert_eq!(public_url(&request(Some("https://api.test/dashboard"))), "/user/42");
    }

    #[test]
    fn test_public_url_cross_origin_is_full() {
        assert_eq!(
            public_url(&request(Some("https://app.test/"))),
            "https://api.test/user/42"
        );
        assert_eq!(public_url(&request(None)), "https://api.test/user/42");
    }

    #[test]
    fn test_public_url_lookalike_referrer_is_cross_origin() {
        for referrer in [
            "https://api.test.evil.example/page",
            "https://api.test:8443/page",
            "http://api.test/page",
            "api.test/page",
        ] {
            assert_eq!(
                public_url(&request(Some(referrer))),
                "https://api.test/user/42",
                "{referrer}"
            );
        }
    }

    #[test]
    fn test_public_url_default_port_referrer_is_same_origin() {
        assert_eq!(public_url(&request(Some("https://api.test:443/home"))), "/user/42");
    }

    #[test]
    fn test_severity() {
        assert_eq!(StatusSeverity::from_status(204), StatusSeverity::Success);
        assert_eq!(StatusSeverity::from_status(304), StatusSeverity::Warning);
        assert_eq!(StatusSeverity::from_status(404), StatusSeverity::Danger);
        assert_eq!(StatusSeverity::from_status(503), StatusSeverity::Danger);
    }

    #[test]
    fn test_record_shape() {
        let ctx = Context::default();
        let req = request(None)
            .with_header("accept", "application/json")
            .unwrap()
            .with_header("accept", "text/plain")
            .unwrap();
        let res = ResponseComposer::new()
            .compose([ctx.status(404), ctx.json(&json!({ "error": "missing" })).unwrap()])
            .unwrap();
        let now = Local.with_ymd_and_hms(2024, 3, 1, 9, 5, 7).unwrap();

        let record = RequestLogRecord::at(now, &req, &res, info());

        assert_eq!(record.timestamp, "09:05:07");
        assert_eq!(record.summary(), "09:05:07 GET https://api.test/user/42 (404)");
        assert_eq!(record.severity, StatusSeverity::Danger);
        assert_eq!(record.request.url, "https://api.test/user/42?x=1");
        assert_eq!(
            record.request.headers.get("accept").map(String::as_str),
            Some("application/json, text/plain")
        );
        assert_eq!(record.request.body, Value::Null);
        assert_eq!(record.response.status_text, "Not Found");
        assert_eq!(record.response.body, json!({ "error": "missing" }));
        assert_eq!(record.handler.mask, "/user/:id");
    }

    #[test]
    fn test_text_body_renders_as_string() {
        let ctx = Context::default();
        let res = ResponseComposer::new().compose([ctx.text("hello")]).unwrap();
        let record = RequestLogRecord::new(&request(None), &res, info());
        assert_eq!(record.response.body, json!("hello"));
    }
}
