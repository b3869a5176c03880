//! Composition errors

use patchkit_core::PatchError;

/// One handle that could not be restored during teardown
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("restore of patch #{index} ('{target}') failed: {source}")]
pub struct TeardownFailure {
    /// Declared position of the patch
    pub index: usize,

    /// Target label
    pub target: String,

    /// Why the restore failed
    #[source]
    pub source: PatchError,
}

/// Activation of a stack member failed
///
/// Members before `index` were already rolled back when this is returned.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("activation of patch #{index} ('{target}') failed: {source}")]
pub struct ActivationError {
    /// Declared position of the failing patch
    pub index: usize,

    /// Target label
    pub target: String,

    /// Activation failure
    #[source]
    pub source: PatchError,

    /// Restore failures hit while rolling back earlier members
    pub rollback: Vec<TeardownFailure>,
}

/// Teardown of an active stack did not fully succeed
///
/// Every handle was still attempted; [`TeardownError::failures`] lists the
/// ones that failed, in teardown order. Only built from a non-empty list.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error(
    "{} patch(es) failed to restore; first: {}",
    .failures.len(),
    .failures.first().map_or_else(String::new, ToString::to_string)
)]
pub struct TeardownError {
    failures: Vec<TeardownFailure>,
}

impl TeardownError {
    pub(crate) fn from_failures(failures: Vec<TeardownFailure>) -> Result<(), Self> {
        if failures.is_empty() {
            Ok(())
        } else {
            Err(Self { failures })
        }
    }

    /// First failure, reported as the primary one
    #[inline]
    #[must_use]
    pub fn primary(&self) -> &TeardownFailure {
        &self.failures[0]
    }

    /// Failed restores in teardown order
    #[inline]
    #[must_use]
    pub fn failures(&self) -> &[TeardownFailure] {
        &self.failures
    }

    /// Take the failure list
    #[inline]
    #[must_use]
    pub fn into_failures(self) -> Vec<TeardownFailure> {
        self.failures
    }
}

/// Failure of a composed patch scope
///
/// A body error always takes priority; teardown failures seen after it are
/// attached rather than replacing it.
#[derive(Debug, thiserror::Error)]
pub enum ComposeError<E> {
    /// A member failed to activate; earlier members were rolled back
    #[error(transparent)]
    Activation(#[from] ActivationError),

    /// The body failed; all handles were torn down afterwards
    #[error("patched body failed: {source}")]
    Body {
        /// Error returned by the body
        #[source]
        source: E,
        /// Restore failures seen after the body failed
        teardown: Vec<TeardownFailure>,
    },

    /// The body succeeded but some handles failed to restore
    #[error(transparent)]
    Teardown(#[from] TeardownError),
}

impl<E> ComposeError<E> {
    /// Error returned by the body, if that is what failed
    #[must_use]
    pub fn body_error(&self) -> Option<&E> {
        match self {
            Self::Body { source, .. } => Some(source),
            _ => None,
        }
    }

    /// Consume into the body error, if that is what failed
    #[must_use]
    pub fn into_body_error(self) -> Option<E> {
        match self {
            Self::Body { source, .. } => Some(source),
            _ => None,
        }
    }

    /// All restore failures, whichever phase they happened in
    #[must_use]
    pub fn teardown_failures(&self) -> &[TeardownFailure] {
        match self {
            Self::Activation(err) => &err.rollback,
            Self::Body { teardown, .. } => teardown,
            Self::Teardown(err) => err.failures(),
        }
    }

    /// Position of the member that failed to activate
    #[must_use]
    pub fn activation_index(&self) -> Option<usize> {
        match self {
            Self::Activation(err) => Some(err.index),
            _ => None,
        }
    }
}
