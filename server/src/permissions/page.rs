//! Page-access patterns and path normalization.
//!
//! A pattern is one of:
//! - `*`: every path
//! - `/residents/*`: `/residents` itself and anything below it
//! - `/profile`: exactly that path
//!
//! Prefix patterns match at a `/` boundary only: `/residents/*` does not
//! cover `/residentsx`.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::error::RuleError;

/// One entry of a role's page list.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PagePattern {
    /// Unconditional access.
    Any,
    /// Exactly this normalized path.
    Exact(String),
    /// This path and everything below it (stored without the trailing `/*`).
    Prefix(String),
}

impl PagePattern {
    /// Parse a pattern from its textual form.
    pub fn parse(pattern: &str) -> Result<Self, RuleError> {
        let pattern = pattern.trim();
        if pattern == "*" {
            return Ok(Self::Any);
        }

        let invalid = || RuleError::InvalidPagePattern(pattern.to_string());

        if let Some(prefix) = pattern.strip_suffix("/*") {
            // "/*" alone is the root prefix, i.e. every path.
            if prefix.is_empty() {
                return Ok(Self::Any);
            }
            let prefix = normalize_path(prefix).ok_or_else(invalid)?;
            if prefix.contains('*') {
                return Err(invalid());
            }
            if prefix == "/" {
                return Ok(Self::Any);
            }
            return Ok(Self::Prefix(prefix));
        }

        if pattern.contains('*') {
            return Err(invalid());
        }
        normalize_path(pattern).map(Self::Exact).ok_or_else(invalid)
    }

    /// Prefix pattern covering a resource's screens.
    #[must_use]
    pub fn prefix(base: &str) -> Self {
        Self::Prefix(base.to_string())
    }

    /// Check whether a normalized path matches this pattern.
    #[must_use]
    pub fn matches(&self, path: &str) -> bool {
        match self {
            Self::Any => true,
            Self::Exact(exact) => exact == path,
            Self::Prefix(prefix) => {
                path == prefix
                    || path
                        .strip_prefix(prefix.as_str())
                        .is_some_and(|rest| rest.starts_with('/'))
            }
        }
    }

    /// Whether every path this pattern matches is also matched by `other`.
    #[must_use]
    pub fn is_covered_by(&self, other: &Self) -> bool {
        match (self, other) {
            (_, Self::Any) => true,
            (Self::Any, _) => false,
            (Self::Exact(path), other) => other.matches(path),
            (Self::Prefix(prefix), Self::Prefix(_)) => other.matches(prefix),
            (Self::Prefix(_), Self::Exact(_)) => false,
        }
    }
}

impl fmt::Display for PagePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => f.write_str("*"),
            Self::Exact(path) => f.write_str(path),
            Self::Prefix(prefix) => write!(f, "{prefix}/*"),
        }
    }
}

impl Serialize for PagePattern {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for PagePattern {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

/// Normalize a request path for matching.
///
/// Strips any query string or fragment and trailing slashes (except for the
/// root). Returns `None` for paths that cannot be matched safely: empty or
/// relative paths, and paths with `.` or `..` segments, literal or
/// percent-encoded, which could otherwise walk out of a prefix
/// (`/residents/../admin/users`, `/residents/%2e%2e/admin/users`).
///
/// # Examples
///
/// ```
/// use home21_server::permissions::normalize_path;
///
/// assert_eq!(normalize_path("/residents/").as_deref(), Some("/residents"));
/// assert_eq!(normalize_path("/tasks?page=2").as_deref(), Some("/tasks"));
/// assert_eq!(normalize_path("/residents/../admin"), None);
/// ```
#[must_use]
pub fn normalize_path(path: &str) -> Option<String> {
    let path = path.split(['?', '#']).next().unwrap_or_default().trim();
    if !path.starts_with('/') {
        return None;
    }

    let mut normalized = String::with_capacity(path.len());
    for segment in path.split('/').filter(|s| !s.is_empty()) {
        if is_dot_segment(segment) {
            return None;
        }
        normalized.push('/');
        normalized.push_str(segment);
    }

    if normalized.is_empty() {
        normalized.push('/');
    }
    Some(normalized)
}

/// `.` or `..`, literal or percent-encoded (`%2e`, `.%2E`, ...).
fn is_dot_segment(segment: &str) -> bool {
    let lower = segment.to_ascii_lowercase();
    let decoded = lower.replace("%2e", ".");
    decoded == "." || decoded == ".."
}
