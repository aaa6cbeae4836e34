//! Mock response model and composition.
//!
//! # Responsibilities
//! - Hold the response a resolver produces (status, headers, cookies, body, delay)
//! - Apply context transforms in order
//!
//! # Design Decisions
//! - Later transforms overwrite earlier ones for the same field; cookies append
//! - `cookies` always mirrors the `set-cookie` header
//! - Header names/values validated when applied, not when the transform is built
//! - Delivery (waiting out `delay`, honouring `once`) belongs to the transport

use std::time::Duration;

use bytes::Bytes;
use hyper::header::{HeaderName, HeaderValue, CONTENT_TYPE, SET_COOKIE};
use hyper::{HeaderMap, StatusCode};
use serde::Serialize;

use crate::error::MockError;
use crate::http::context::Transform;

/// Value of the `x-powered-by` header on every fresh response.
pub const POWERED_BY: &str = "rest-mock";

/// A cookie set on the mocked response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Cookie {
    pub name: String,
    pub value: String,
}

impl Cookie {
    pub fn header_value(&self) -> String {
        format!("{}={}", self.name, self.value)
    }

    /// Name and value of a `set-cookie` header value; attributes are dropped.
    pub fn parse(set_cookie: &str) -> Option<Self> {
        let pair = set_cookie.split(';').next()?;
        let (name, value) = pair.split_once('=')?;
        let name = name.trim();
        if name.is_empty() {
            return None;
        }
        Some(Self {
            name: name.to_string(),
            value: value.trim().to_string(),
        })
    }
}

/// Response accumulated by context transforms.
#[derive(Debug, Clone)]
pub struct MockResponse {
    pub status: StatusCode,
    pub status_text: String,
    pub headers: HeaderMap,
    pub cookies: Vec<Cookie>,
    pub body: Option<Bytes>,
    /// How long the transport should hold the response back.
    pub delay: Duration,
    /// Transport should use this response for one request only.
    pub once: bool,
}

impl Default for MockResponse {
    fn default() -> Self {
        let mut headers = HeaderMap::new();
        headers.insert("x-powered-by", HeaderValue::from_static(POWERED_BY));
        Self {
            status: StatusCode::OK,
            status_text: "OK".to_string(),
            headers,
            cookies: Vec::new(),
            body: None,
            delay: Duration::ZERO,
            once: false,
        }
    }
}

impl MockResponse {
    /// Apply a single transform.
    pub fn apply(&mut self, transform: Transform) -> Result<(), MockError> {
        match transform {
            Transform::Header { name, value } => {
                let (name, header) = header_pair(&name, &value)?;
                if name == SET_COOKIE {
                    self.cookies = Cookie::parse(&value).into_iter().collect();
                }
                self.headers.insert(name, header);
            }
            Transform::AppendHeader { name, value } => {
                let (name, header) = header_pair(&name, &value)?;
                if name == SET_COOKIE {
                    self.cookies.extend(Cookie::parse(&value));
                }
                self.headers.append(name, header);
            }
            Transform::Status { code, text } => {
                let status =
                    StatusCode::from_u16(code).map_err(|_| MockError::InvalidStatus(code))?;
                self.status = status;
                self.status_text = text
                    .or_else(|| status.canonical_reason().map(str::to_string))
                    .unwrap_or_default();
            }
            Transform::Cookie(cookie) => {
                let value = HeaderValue::from_str(&cookie.header_value())
                    .map_err(|_| MockError::InvalidHeaderValue(SET_COOKIE.as_str().to_string()))?;
                self.headers.append(SET_COOKIE, value);
                self.cookies.push(cookie);
            }
            Transform::Body(body) => {
                self.body = Some(body);
            }
            Transform::TypedBody { content_type, body } => {
                self.headers
                    .insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
                self.body = Some(body);
            }
            Transform::Delay(delay) => {
                self.delay = delay;
            }
        }
        Ok(())
    }

    pub fn content_type(&self) -> Option<&str> {
        self.headers
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
    }

    pub fn text(&self) -> Option<String> {
        self.body
            .as_ref()
            .map(|b| String::from_utf8_lossy(b).into_owned())
    }
}

fn header_pair(name: &str, value: &str) -> Result<(HeaderName, HeaderValue), MockError> {
    let name = HeaderName::from_bytes(name.as_bytes())
        .map_err(|_| MockError::InvalidHeaderName(name.to_string()))?;
    let value = HeaderValue::from_str(value)
        .map_err(|_| MockError::InvalidHeaderValue(name.as_str().to_string()))?;
    Ok((name, value))
}

/// Builds a [`MockResponse`] out of transforms; handed to every resolver.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResponseComposer {
    once: bool,
}

impl ResponseComposer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Composer whose responses are flagged for single use.
    pub fn once(self) -> Self {
        Self { once: true }
    }

    pub fn compose<I>(&self, transforms: I) -> Result<MockResponse, MockError>
    where
        I: IntoIterator<Item = Transform>,
    {
        let mut response = MockResponse {
            once: self.once,
            ..MockResponse::default()
        };
        for transform in transforms {
            response.apply(transform)?;
        }
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::context::Context;

    #[test]
    fn test_default_response() {
        let res = ResponseComposer::new().compose(Vec::new()).unwrap();
        assert_eq!(res.status, StatusCode::OK);
        assert_eq!(res.status_text, "OK");
        assert_eq!(res.headers.get("x-powered-by").unwrap(), POWERED_BY);
        assert!(res.body.is_none());
        assert!(!res.once);
    }

    #[test]
    fn test_later_transform_overwrites() {
        let ctx = Context::default();
        let res = ResponseComposer::new()
            .compose([
                ctx.status(201),
                ctx.set("x-version", "1"),
                ctx.text("first"),
                ctx.status(404),
                ctx.set("X-Version", "2"),
                ctx.xml("<second/>"),
            ])
            .unwrap();

        assert_eq!(res.status, StatusCode::NOT_FOUND);
        assert_eq!(res.status_text, "Not Found");
        assert_eq!(res.headers.get_all("x-version").iter().count(), 1);
        assert_eq!(res.headers.get("x-version").unwrap(), "2");
        assert_eq!(res.content_type(), Some("text/xml"));
        assert_eq!(res.text().as_deref(), Some("<second/>"));
    }

    #[test]
    fn test_cookies_append() {
        let ctx = Context::default();
        let res = ResponseComposer::new()
            .compose([ctx.cookie("a", "1"), ctx.cookie("b", "2")])
            .unwrap();
        assert_eq!(res.cookies.len(), 2);
        let set_cookies: Vec<_> = res.headers.get_all(SET_COOKIE).iter().collect();
        assert_eq!(set_cookies, vec!["a=1", "b=2"]);
    }

    #[test]
    fn test_set_cookie_header_replaces_cookies() {
        let ctx = Context::default();
        let res = ResponseComposer::new()
            .compose([
                ctx.cookie("a", "1"),
                ctx.cookie("b", "2"),
                ctx.set("set-cookie", "session=xyz; Path=/; HttpOnly"),
            ])
            .unwrap();

        let set_cookies: Vec<_> = res.headers.get_all(SET_COOKIE).iter().collect();
        assert_eq!(set_cookies, vec!["session=xyz; Path=/; HttpOnly"]);
        assert_eq!(
            res.cookies,
            vec![Cookie {
                name: "session".into(),
                value: "xyz".into()
            }]
        );
    }

    #[test]
    fn test_append_header_keeps_earlier_values() {
        let res = ResponseComposer::new()
            .compose([
                Transform::Header {
                    name: "vary".into(),
                    value: "accept".into(),
                },
                Transform::AppendHeader {
                    name: "vary".into(),
                    value: "origin".into(),
                },
                Transform::AppendHeader {
                    name: "set-cookie".into(),
                    value: "a=1".into(),
                },
            ])
            .unwrap();

        let vary: Vec<_> = res.headers.get_all("vary").iter().collect();
        assert_eq!(vary, vec!["accept", "origin"]);
        assert_eq!(res.cookies.len(), 1);
        assert_eq!(res.cookies[0].header_value(), "a=1");
    }

    #[test]
    fn test_cookie_parse() {
        let cookie = Cookie::parse(" id = 7 ; Secure").unwrap();
        assert_eq!(cookie.name, "id");
        assert_eq!(cookie.value, "7");
        assert!(Cookie::parse("no-equals-sign").is_none());
        assert!(Cookie::parse("=orphan").is_none());
    }

    #[test]
    fn test_custom_status_text_and_invalid_status() {
        let ctx = Context::default();
        let res = ResponseComposer::new()
            .compose([ctx.status_text(418, "Short and stout")])
            .unwrap();
        assert_eq!(res.status.as_u16(), 418);
        assert_eq!(res.status_text, "Short and stout");

        let err = ResponseComposer::new().compose([ctx.status(1000)]).unwrap_err();
        assert!(matches!(err, MockError::InvalidStatus(1000)));
    }

    #[test]
    fn test_invalid_header_fails_compose() {
        let ctx = Context::default();
        let err = ResponseComposer::new()
            .compose([ctx.set("bad header", "v")])
            .unwrap_err();
        assert!(matches!(err, MockError::InvalidHeaderName(_)));
    }

    #[test]
    fn test_once_flag() {
        let res = ResponseComposer::new().once().compose(Vec::new()).unwrap();
        assert!(res.once);
    }
}
