//! Handler masks and their normalized form.

use std::fmt;

use regex::Regex;
use url::Url;

/// Pattern a handler matches request URLs against.
#[derive(Debug, Clone)]
pub enum Mask {
    /// Path or URL template, e.g. `/user/:id` or `https://api.test/*`.
    Exact(String),
    /// Regular expression tested against `origin + path`.
    Pattern(Regex),
    /// Fully resolved URL.
    Resolved(Url),
}

impl Mask {
    /// An empty exact mask matches every URL and never yields params.
    pub fn is_empty(&self) -> bool {
        matches!(self, Mask::Exact(s) if s.is_empty())
    }
}

impl fmt::Display for Mask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mask::Exact(s) => f.write_str(s),
            Mask::Pattern(re) => write!(f, "/{}/", re.as_str()),
            Mask::Resolved(url) => f.write_str(url.as_str()),
        }
    }
}

impl From<&str> for Mask {
    fn from(s: &str) -> Self {
        Mask::Exact(s.to_string())
    }
}

impl From<String> for Mask {
    fn from(s: String) -> Self {
        Mask::Exact(s)
    }
}

impl From<Regex> for Mask {
    fn from(re: Regex) -> Self {
        Mask::Pattern(re)
    }
}

impl From<Url> for Mask {
    fn from(url: Url) -> Self {
        Mask::Resolved(url)
    }
}

/// Canonical form of a [`Mask`].
#[derive(Debug, Clone)]
pub enum ResolvedMask {
    Path(String),
    Pattern(Regex),
    Url(Url),
}

impl ResolvedMask {
    pub fn is_url(&self) -> bool {
        matches!(self, ResolvedMask::Url(_))
    }

    /// Path component, only for URL-shaped masks.
    pub fn pathname(&self) -> Option<&str> {
        match self {
            ResolvedMask::Url(url) => Some(url.path()),
            _ => None,
        }
    }

    /// Non-empty query string, only for URL-shaped masks.
    pub fn search(&self) -> Option<&str> {
        match self {
            ResolvedMask::Url(url) => url.query().filter(|q| !q.is_empty()),
            _ => None,
        }
    }

    /// Distinct query parameter names in order of first appearance.
    pub fn query_param_names(&self) -> Vec<String> {
        let ResolvedMask::Url(url) = self else {
            return Vec::new();
        };
        let mut names: Vec<String> = Vec::new();
        for (name, _) in url.query_pairs() {
            if !names.iter().any(|n| n == name.as_ref()) {
                names.push(name.into_owned());
            }
        }
        names
    }
}

impl fmt::Display for ResolvedMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolvedMask::Path(s) => f.write_str(s),
            ResolvedMask::Pattern(re) => write!(f, "/{}/", re.as_str()),
            ResolvedMask::Url(url) => f.write_str(url.as_str()),
        }
    }
}

/// Normalizes masks at handler construction time.
pub trait MaskResolver: Send + Sync + fmt::Debug {
    fn resolve(&self, mask: &Mask) -> ResolvedMask;
}

/// Trims exact masks and drops URL fragments.
#[derive(Debug, Clone, Default)]
pub struct DefaultMaskResolver;

impl MaskResolver for DefaultMaskResolver {
    fn resolve(&self, mask: &Mask) -> ResolvedMask {
        match mask {
            Mask::Exact(s) => ResolvedMask::Path(s.trim().to_string()),
            Mask::Pattern(re) => ResolvedMask::Pattern(re.clone()),
            Mask::Resolved(url) => {
                let mut url = url.clone();
                url.set_fragment(None);
                ResolvedMask::Url(url)
            }
        }
    }
}
