//! Composition stacks
//!
//! A [`CompositionStack`] is an ordered list of patch descriptors applied as
//! one scope. It behaves exactly like nesting single-patch scopes with the
//! first declared descriptor outermost:
//!
//! - activation runs first to last and stops at the first failure
//! - members activated before a failure are restored, last first
//! - the body receives handles in declaration order
//! - teardown runs last to first, attempting every member

use crate::error::{ActivationError, ComposeError, TeardownError};
use crate::observer::PatchObserver;
use crate::scope::{teardown, ActiveStack};
use patchkit_core::{PatchConfig, PatchDescriptor, PatchHandle};
use std::sync::Arc;

/// Ordered set of patches applied as one scope
#[derive(Debug, Default)]
pub struct CompositionStack {
    descriptors: Vec<PatchDescriptor>,
    observer: Option<Arc<dyn PatchObserver>>,
    config: Option<PatchConfig>,
}

impl CompositionStack {
    /// Create empty stack
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `descriptor` as the next (inner) member
    #[must_use]
    pub fn with(mut self, descriptor: PatchDescriptor) -> Self {
        self.push(descriptor);
        self
    }

    /// Append `descriptor` as the next (inner) member
    pub fn push(&mut self, mut descriptor: PatchDescriptor) {
        if let Some(config) = self.config {
            descriptor.inherit_config(config);
        }
        self.descriptors.push(descriptor);
    }

    /// Install a lifecycle observer
    #[must_use]
    pub fn with_observer(mut self, observer: Arc<dyn PatchObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Default configuration for members without their own
    ///
    /// Applies to members already pushed and to later ones.
    #[must_use]
    pub fn with_config(mut self, config: PatchConfig) -> Self {
        for descriptor in &mut self.descriptors {
            descriptor.inherit_config(config);
        }
        self.config = Some(config);
        self
    }

    /// Number of members
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    /// Check if the stack has no members
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Target labels in declaration order
    #[must_use]
    pub fn labels(&self) -> Vec<String> {
        self.descriptors.iter().map(PatchDescriptor::label).collect()
    }

    /// Members in declaration order
    #[inline]
    #[must_use]
    pub fn descriptors(&self) -> &[PatchDescriptor] {
        &self.descriptors
    }

    /// Give the members back
    #[inline]
    #[must_use]
    pub fn into_descriptors(self) -> Vec<PatchDescriptor> {
        self.descriptors
    }

    /// Activate every member, first declared first
    ///
    /// # Errors
    /// [`ActivationError`] for the first member that fails. Members before
    /// it have been restored, last first, by the time this returns; members
    /// after it were never activated.
    pub fn activate(&mut self) -> Result<ActiveStack<'_>, ActivationError> {
        tracing::info!(patches = self.descriptors.len(), "entering patch stack");
        let mut handles = Vec::with_capacity(self.descriptors.len());

        for index in 0..self.descriptors.len() {
            match self.descriptors[index].activate() {
                Ok(handle) => {
                    if let Some(observer) = &self.observer {
                        observer.on_activate(index, &handle);
                    }
                    handles.push(handle);
                }
                Err(source) => {
                    let target = self.descriptors[index].label();
                    if let Some(observer) = &self.observer {
                        observer.on_activation_failed(index, &target, &source);
                    }
                    tracing::warn!(
                        index,
                        attribute = %target,
                        error = %source,
                        rolled_back = handles.len(),
                        "patch stack activation failed, rolling back"
                    );
                    let rollback = teardown(&mut self.descriptors[..index], &handles, self.observer.as_ref());
                    return Err(ActivationError {
                        index,
                        target,
                        source,
                        rollback,
                    });
                }
            }
        }

        Ok(ActiveStack::new(
            &mut self.descriptors,
            handles,
            self.observer.clone(),
        ))
    }

    /// Run `body` with every member active
    ///
    /// The stack can be run again afterwards; each run activates fresh
    /// handles.
    ///
    /// # Errors
    /// - [`ComposeError::Activation`] if a member fails to activate
    /// - [`ComposeError::Body`] if `body` fails, with any restore failures
    ///   attached
    /// - [`ComposeError::Teardown`] if `body` succeeds but restores fail
    ///
    /// If `body` panics, all members are restored while unwinding.
    pub fn run<T, E, F>(&mut self, body: F) -> Result<T, ComposeError<E>>
    where
        F: FnOnce(&[PatchHandle]) -> Result<T, E>,
    {
        let active = self.activate()?;
        let outcome = body(active.handles());
        let closed = active.close();

        match (outcome, closed) {
            (Ok(value), Ok(())) => Ok(value),
            (Ok(_), Err(teardown)) => Err(ComposeError::Teardown(teardown)),
            (Err(source), closed) => Err(ComposeError::Body {
                source,
                teardown: closed.err().map(TeardownError::into_failures).unwrap_or_default(),
            }),
        }
    }

    /// Wrap `body` so that every call runs it inside this stack
    ///
    /// This is the decorator form. Handles reach `body` in declaration
    /// order: the first member declared is `handles[0]`.
    pub fn decorate<T, E, F>(mut self, mut body: F) -> impl FnMut() -> Result<T, ComposeError<E>>
    where
        F: FnMut(&[PatchHandle]) -> Result<T, E>,
    {
        move || self.run(&mut body)
    }
}

impl FromIterator<PatchDescriptor> for CompositionStack {
    fn from_iter<I: IntoIterator<Item = PatchDescriptor>>(iter: I) -> Self {
        let mut stack = Self::new();
        for descriptor in iter {
            stack.push(descriptor);
        }
        stack
    }
}

/// Run `body` with all `descriptors` active, as one scope
///
/// Shorthand for building a [`CompositionStack`] and calling
/// [`CompositionStack::run`].
///
/// # Errors
/// See [`CompositionStack::run`].
pub fn compose<T, E, F>(
    descriptors: impl IntoIterator<Item = PatchDescriptor>,
    body: F,
) -> Result<T, ComposeError<E>>
where
    F: FnOnce(&[PatchHandle]) -> Result<T, E>,
{
    descriptors
        .into_iter()
        .collect::<CompositionStack>()
        .run(body)
}
