//! Error types for the attribute model

use crate::path::PathError;

/// Attribute access and slot manipulation errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AttrError {
    /// Owner does not define the attribute
    #[error("'{owner}' has no attribute '{name}'")]
    NotFound {
        /// Owner label
        owner: String,
        /// Attribute name
        name: String,
    },

    /// Computed property read without an instance
    #[error("property '{owner}.{name}' can only be read through an instance")]
    NeedsInstance {
        /// Owner label
        owner: String,
        /// Attribute name
        name: String,
    },

    /// Write to a property without a setter
    #[error("property '{owner}.{name}' is read-only")]
    ReadOnly {
        /// Owner label
        owner: String,
        /// Attribute name
        name: String,
    },

    /// Sequence of configured return values ran out
    #[error("'{target}' has no more configured return values")]
    Exhausted {
        /// Patch target label
        target: String,
    },

    /// Slot already carries a live patch
    #[error("'{owner}.{name}' is already patched")]
    AlreadyPatched {
        /// Owner label
        owner: String,
        /// Attribute name
        name: String,
    },

    /// Slot is not patched by the given patch id
    #[error("'{owner}.{name}' is not patched by this handle")]
    NotPatchedBy {
        /// Owner label
        owner: String,
        /// Attribute name
        name: String,
    },

    /// Symbolic owner path not registered
    #[error("no owner registered at '{path}'")]
    UnresolvedOwner {
        /// Owner path
        path: String,
    },

    /// Malformed path
    #[error("path error: {0}")]
    Path(#[from] PathError),

    /// Failure raised from inside a getter or setter
    #[error("{0}")]
    Callback(String),
}

impl AttrError {
    /// Create not-found error
    #[inline]
    #[must_use]
    pub fn not_found(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self::NotFound {
            owner: owner.into(),
            name: name.into(),
        }
    }

    /// Create read-only error
    #[inline]
    #[must_use]
    pub fn read_only(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self::ReadOnly {
            owner: owner.into(),
            name: name.into(),
        }
    }

    /// Check if error means the attribute does not exist
    #[inline]
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. } | Self::UnresolvedOwner { .. })
    }
}
