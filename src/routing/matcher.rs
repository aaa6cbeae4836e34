//! URL matching logic.
//!
//! # Responsibilities
//! - Match a request URL against a resolved mask
//! - Extract named path parameters (`:name` segments, regex named groups)
//! - Compare methods case-insensitively
//!
//! # Design Decisions
//! - Relative templates (`/user/:id`) match the path only, any origin
//! - Absolute templates match `origin + path`
//! - `*` matches any run of characters, including `/`
//! - A single trailing slash is optional on both sides
//! - Empty template = always matches (wildcard), never yields params

use std::collections::BTreeMap;
use std::fmt;

use regex::Regex;
use serde::Serialize;
use url::Url;

use crate::error::MatchError;
use crate::routing::mask::ResolvedMask;

/// Result of matching one URL against one mask.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MatchResult {
    pub matches: bool,
    pub params: BTreeMap<String, String>,
}

impl MatchResult {
    pub fn no_match() -> Self {
        Self::default()
    }
}

/// Trait for matching request URLs against masks.
pub trait UrlMatcher: Send + Sync + fmt::Debug {
    /// Must be pure: identical inputs give identical results.
    fn match_url(&self, url: &Url, mask: &ResolvedMask) -> Result<MatchResult, MatchError>;
}

/// Method comparison used by every handler predicate.
pub fn equals_case_insensitive(a: &str, b: &str) -> bool {
    a.eq_ignore_ascii_case(b)
}

/// Default matcher for path templates, URLs and regular expressions.
#[derive(Debug, Clone, Default)]
pub struct PathMatcher;

impl UrlMatcher for PathMatcher {
    fn match_url(&self, url: &Url, mask: &ResolvedMask) -> Result<MatchResult, MatchError> {
        match mask {
            ResolvedMask::Path(template) if template.is_empty() => Ok(MatchResult {
                matches: true,
                params: BTreeMap::new(),
            }),
            ResolvedMask::Path(template) => {
                let re = compile_template(template)?;
                let target = if template.starts_with('/') {
                    url.path().to_string()
                } else {
                    clean_url(url)
                };
                Ok(capture(&re, &target))
            }
            ResolvedMask::Url(mask_url) => {
                let template = clean_url(mask_url);
                let re = compile_template(&template)?;
                Ok(capture(&re, &clean_url(url)))
            }
            ResolvedMask::Pattern(re) => Ok(capture(re, &clean_url(url))),
        }
    }
}

/// `origin + path`, without query or fragment.
fn clean_url(url: &Url) -> String {
    format!("{}{}", url.origin().ascii_serialization(), url.path())
}

fn compile_template(template: &str) -> Result<Regex, MatchError> {
    let trimmed = template.trim_end_matches('/');
    let mut pattern = String::from("^");
    let mut chars = trimmed.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            ':' if chars
                .peek()
                .is_some_and(|n| n.is_ascii_alphabetic() || *n == '_') =>
            {
                let mut name = String::new();
                while let Some(&n) = chars.peek() {
                    if n.is_ascii_alphanumeric() || n == '_' {
                        name.push(n);
                        chars.next();
                    } else {
                        break;
                    }
                }
                pattern.push_str(&format!("(?P<{}>[^/]+)", name));
            }
            '*' => {
                while chars.peek() == Some(&'*') {
                    chars.next();
                }
                pattern.push_str(".*");
            }
            other => {
                let mut buf = [0u8; 4];
                pattern.push_str(&regex::escape(other.encode_utf8(&mut buf)));
            }
        }
    }
    pattern.push_str("/?$");

    Regex::new(&pattern).map_err(|source| MatchError::InvalidPattern {
        pattern: template.to_string(),
        source,
    })
}

fn capture(re: &Regex, target: &str) -> MatchResult {
    let Some(caps) = re.captures(target) else {
        return MatchResult::no_match();
    };
    let params = re
        .capture_names()
        .flatten()
        .filter_map(|name| {
            caps.name(name)
                .map(|m| (name.to_string(), m.as_str().to_string()))
        })
        .collect();
    MatchResult {
        matches: true,
        params,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    fn path(s: &str) -> ResolvedMask {
        ResolvedMask::Path(s.to_string())
    }

    #[test]
    fn test_relative_template_extracts_params() {
        let result = PathMatcher
            .match_url(&url("https://api.test/user/42"), &path("/user/:id"))
            .unwrap();
        assert!(result.matches);
        assert_eq!(result.params.get("id").map(String::as_str), Some("42"));
        assert_eq!(result.params.len(), 1);
    }

    #[test]
    fn test_relative_template_ignores_query_and_trailing_slash() {
        let result = PathMatcher
            .match_url(&url("http://localhost/user/42/?tab=1#top"), &path("/user/:id"))
            .unwrap();
        assert!(result.matches);
    }

    #[test]
    fn test_path_is_case_sensitive() {
        let result = PathMatcher
            .match_url(&url("https://api.test/Login"), &path("/login"))
            .unwrap();
        assert!(!result.matches);
        assert!(result.params.is_empty());
    }

    #[test]
    fn test_segment_param_does_not_cross_slash() {
        let result = PathMatcher
            .match_url(&url("https://api.test/user/42/posts"), &path("/user/:id"))
            .unwrap();
        assert!(!result.matches);
    }

    #[test]
    fn test_absolute_template_checks_origin() {
        let mask = path("https://api.test/user/:id");
        assert!(PathMatcher.match_url(&url("https://api.test/user/1"), &mask).unwrap().matches);
        assert!(!PathMatcher.match_url(&url("https://other.test/user/1"), &mask).unwrap().matches);
    }

    #[test]
    fn test_port_colon_is_literal() {
        let mask = path("http://localhost:8080/items/:item_id");
        let result = PathMatcher
            .match_url(&url("http://localhost:8080/items/a-b"), &mask)
            .unwrap();
        assert!(result.matches);
        assert_eq!(result.params.get("item_id").map(String::as_str), Some("a-b"));
    }

    #[test]
    fn test_wildcard() {
        let mask = path("*/books/:isbn");
        let result = PathMatcher
            .match_url(&url("https://shop.test/v2/books/978"), &mask)
            .unwrap();
        assert!(result.matches);
        assert_eq!(result.params.get("isbn").map(String::as_str), Some("978"));
    }

    #[test]
    fn test_empty_template_is_wildcard() {
        let result = PathMatcher
            .match_url(&url("https://anything.test/a/b/c"), &path(""))
            .unwrap();
        assert!(result.matches);
        assert!(result.params.is_empty());
    }

    #[test]
    fn test_url_mask_ignores_its_query() {
        let mask = ResolvedMask::Url(url("https://api.test/search?q=1"));
        assert!(PathMatcher.match_url(&url("https://api.test/search?q=2"), &mask).unwrap().matches);
    }

    #[test]
    fn test_regex_named_groups() {
        let mask = ResolvedMask::Pattern(Regex::new(r"/orders/(?P<order>\d+)$").unwrap());
        let result = PathMatcher
            .match_url(&url("https://shop.test/orders/77?x=1"), &mask)
            .unwrap();
        assert!(result.matches);
        assert_eq!(result.params.get("order").map(String::as_str), Some("77"));
    }

    #[test]
    fn test_duplicate_param_is_matcher_failure() {
        let err = PathMatcher
            .match_url(&url("https://api.test/a/b"), &path("/:x/:x"))
            .unwrap_err();
        assert!(matches!(err, MatchError::InvalidPattern { .. }));
    }

    #[test]
    fn test_method_comparison() {
        assert!(equals_case_insensitive("get", "GET"));
        assert!(!equals_case_insensitive("GET", "POST"));
    }
}
