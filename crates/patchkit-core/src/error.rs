//! Error types for patch activation and deactivation

use patchkit_attr::AttrError;

/// Patch lifecycle errors
///
/// None of these are retryable: doubles are deterministic, so repeating the
/// same activation or deactivation changes nothing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PatchError {
    /// Target attribute or its owner does not exist
    #[error("cannot patch '{target}': {source}")]
    NotFound {
        /// Target label
        target: String,
        /// Underlying lookup failure
        #[source]
        source: AttrError,
    },

    /// Descriptor or slot already carries a live handle
    #[error("'{target}' is already patched")]
    AlreadyActive {
        /// Target label
        target: String,
    },

    /// Handle is stale, foreign, or already deactivated
    #[error("handle does not match the live patch on '{target}'")]
    InvalidHandle {
        /// Target label
        target: String,
    },

    /// Attribute model error outside the lifecycle categories
    #[error("attribute error: {0}")]
    Attribute(#[from] AttrError),
}

impl PatchError {
    /// Create invalid-handle error
    #[inline]
    #[must_use]
    pub fn invalid_handle(target: impl Into<String>) -> Self {
        Self::InvalidHandle {
            target: target.into(),
        }
    }

    /// Map a slot-level failure during activation
    #[must_use]
    pub(crate) fn from_activation(target: &str, err: AttrError) -> Self {
        match err {
            AttrError::AlreadyPatched { .. } => Self::AlreadyActive {
                target: target.to_string(),
            },
            err if err.is_not_found() => Self::NotFound {
                target: target.to_string(),
                source: err,
            },
            err => Self::Attribute(err),
        }
    }

    /// Check if error is retryable
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        false
    }

    /// Check if error signals a missing target
    #[inline]
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn activation_mapping() {
        let err = PatchError::from_activation("Foo.foo", AttrError::not_found("Foo", "foo"));
        assert!(err.is_not_found());

        let err = PatchError::from_activation(
            "Foo.foo",
            AttrError::AlreadyPatched {
                owner: "Foo".into(),
                name: "foo".into(),
            },
        );
        assert_eq!(
            err,
            PatchError::AlreadyActive {
                target: "Foo.foo".into()
            }
        );

        let err = PatchError::from_activation("main.Foo.foo", AttrError::UnresolvedOwner { path: "main.Foo".into() });
        assert!(err.is_not_found());
    }

    #[test]
    fn never_retryable() {
        assert!(!PatchError::invalid_handle("Foo.foo").is_retryable());
    }

    #[test]
    fn display_includes_cause() {
        let err = PatchError::from_activation("Foo.nope", AttrError::not_found("Foo", "nope"));
        assert_eq!(err.to_string(), "cannot patch 'Foo.nope': 'Foo' has no attribute 'nope'");
    }
}
