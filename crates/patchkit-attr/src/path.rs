//! Dotted attribute paths
//!
//! Provides [`AttributePath`] for naming patch targets symbolically, e.g.
//! `main.Foo.foo`.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Dotted path addressing an owner or an attribute on an owner
///
/// # Examples
/// - `["main", "Foo"]` → `main.Foo` (an owner)
/// - `["main", "Foo", "foo"]` → `main.Foo.foo` (attribute `foo` on `main.Foo`)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AttributePath(Vec<String>);

impl AttributePath {
    /// Create new path from segments
    #[inline]
    #[must_use]
    pub fn new(segments: Vec<String>) -> Self {
        Self(segments)
    }

    /// Create path from a single segment
    #[inline]
    #[must_use]
    pub fn single(segment: impl Into<String>) -> Self {
        Self(vec![segment.into()])
    }

    /// Get path segments
    #[inline]
    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// Get number of segments
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if path has no segments
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Get parent path (if any)
    #[inline]
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        if self.0.is_empty() {
            None
        } else {
            Some(Self(self.0[..self.0.len() - 1].to_vec()))
        }
    }

    /// Get last segment
    #[inline]
    #[must_use]
    pub fn last(&self) -> Option<&str> {
        self.0.last().map(String::as_str)
    }

    /// Append a segment, returning new path
    #[inline]
    #[must_use]
    pub fn child(&self, segment: impl Into<String>) -> Self {
        let mut new = self.clone();
        new.0.push(segment.into());
        new
    }

    /// Split into owner path and attribute name
    ///
    /// # Errors
    /// Returns [`PathError::MissingOwner`] when the path has fewer than two
    /// segments.
    pub fn split_attribute(&self) -> Result<(Self, &str), PathError> {
        match (self.parent(), self.last()) {
            (Some(owner), Some(name)) if !owner.is_empty() => Ok((owner, name)),
            _ => Err(PathError::MissingOwner(self.to_string())),
        }
    }
}

impl Display for AttributePath {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join("."))
    }
}

impl FromStr for AttributePath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(PathError::Empty);
        }

        let segments: Vec<String> = s
            .split('.')
            .map(|seg| {
                if seg.is_empty() {
                    Err(PathError::EmptySegment)
                } else if seg.starts_with(|c: char| c.is_ascii_digit())
                    || seg.contains(|c: char| !c.is_alphanumeric() && c != '_')
                {
                    Err(PathError::InvalidSegment(seg.to_string()))
                } else {
                    Ok(seg.to_string())
                }
            })
            .collect::<Result<_, _>>()?;

        Ok(Self(segments))
    }
}

impl From<Vec<String>> for AttributePath {
    fn from(segments: Vec<String>) -> Self {
        Self(segments)
    }
}

/// Errors related to attribute paths
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PathError {
    /// Empty path string
    #[error("path is empty")]
    Empty,

    /// Empty segment in path
    #[error("path contains empty segment")]
    EmptySegment,

    /// Invalid segment characters
    #[error("invalid segment: {0} (must be an identifier)")]
    InvalidSegment(String),

    /// Path names an attribute without an owner
    #[error("path '{0}' does not name an owner and an attribute")]
    MissingOwner(String),
}
