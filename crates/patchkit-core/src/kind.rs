//! Patch kinds

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// Shape of attribute a double imitates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatchKind {
    /// Plain value: reads return the configured value, writes replace it
    #[default]
    Value,

    /// Computed read-only property: writes are rejected
    ComputedRead,

    /// Computed read-write property: writes are recorded, reads unaffected
    ComputedReadWrite,
}

impl PatchKind {
    /// Check if the double behaves like a computed property
    #[inline]
    #[must_use]
    pub fn is_computed(&self) -> bool {
        matches!(self, Self::ComputedRead | Self::ComputedReadWrite)
    }

    /// Check if the double accepts writes
    #[inline]
    #[must_use]
    pub fn is_writable(&self) -> bool {
        matches!(self, Self::Value | Self::ComputedReadWrite)
    }

    /// Stable name
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Value => "value",
            Self::ComputedRead => "computed-read",
            Self::ComputedReadWrite => "computed-read-write",
        }
    }
}

impl Display for PatchKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_predicates() {
        assert!(!PatchKind::Value.is_computed());
        assert!(PatchKind::Value.is_writable());
        assert!(PatchKind::ComputedRead.is_computed());
        assert!(!PatchKind::ComputedRead.is_writable());
        assert!(PatchKind::ComputedReadWrite.is_writable());
    }

    #[test]
    fn kind_display() {
        assert_eq!(PatchKind::ComputedRead.to_string(), "computed-read");
    }
}
