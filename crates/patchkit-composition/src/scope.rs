//! Active patch stacks
//!
//! An [`ActiveStack`] is the scope object of a composed patch set. Dropping
//! it, closing it, or unwinding through it restores every member in reverse
//! declaration order.

use crate::error::{TeardownError, TeardownFailure};
use crate::observer::PatchObserver;
use patchkit_core::{PatchDescriptor, PatchHandle};
use std::sync::Arc;

/// Restore `handles[i]` through `descriptors[i]`, last first
///
/// Every handle is attempted even if earlier ones fail.
pub(crate) fn teardown(
    descriptors: &mut [PatchDescriptor],
    handles: &[PatchHandle],
    observer: Option<&Arc<dyn PatchObserver>>,
) -> Vec<TeardownFailure> {
    let mut failures = Vec::new();
    for (index, handle) in handles.iter().enumerate().rev() {
        let outcome = descriptors[index].deactivate(handle);
        if let Some(observer) = observer {
            observer.on_deactivate(index, handle, outcome.as_ref().map(|_| ()));
        }
        if let Err(source) = outcome {
            tracing::error!(index, attribute = %handle.target_label(), error = %source, "restore failed");
            failures.push(TeardownFailure {
                index,
                target: handle.target_label().to_string(),
                source,
            });
        }
    }
    failures
}

/// Live composed scope
///
/// Holds one handle per declared member, in declaration order.
#[derive(Debug)]
pub struct ActiveStack<'a> {
    descriptors: &'a mut [PatchDescriptor],
    handles: Vec<PatchHandle>,
    observer: Option<Arc<dyn PatchObserver>>,
    closed: bool,
}

impl<'a> ActiveStack<'a> {
    pub(crate) fn new(
        descriptors: &'a mut [PatchDescriptor],
        handles: Vec<PatchHandle>,
        observer: Option<Arc<dyn PatchObserver>>,
    ) -> Self {
        Self {
            descriptors,
            handles,
            observer,
            closed: false,
        }
    }

    /// Handles in declaration order
    #[inline]
    #[must_use]
    pub fn handles(&self) -> &[PatchHandle] {
        &self.handles
    }

    /// Handle of the member declared at `index`
    #[inline]
    #[must_use]
    pub fn handle(&self, index: usize) -> Option<&PatchHandle> {
        self.handles.get(index)
    }

    /// Number of live members
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    /// Check if the stack has no members
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Restore every member, last declared first
    ///
    /// # Errors
    /// [`TeardownError`] listing each member that failed to restore. All
    /// members are attempted regardless.
    pub fn close(mut self) -> Result<(), TeardownError> {
        self.closed = true;
        let failures = self.teardown_all();
        tracing::info!(patches = self.handles.len(), failed = failures.len(), "patch stack closed");
        TeardownError::from_failures(failures)
    }

    fn teardown_all(&mut self) -> Vec<TeardownFailure> {
        teardown(&mut *self.descriptors, &self.handles, self.observer.as_ref())
    }
}

impl Drop for ActiveStack<'_> {
    fn drop(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        let failures = self.teardown_all();
        if failures.is_empty() {
            tracing::info!(patches = self.handles.len(), "patch stack dropped");
        } else {
            tracing::error!(
                patches = self.handles.len(),
                failed = failures.len(),
                "patch stack dropped with restore failures"
            );
        }
    }
}
