//! Lifecycle observation hook
//!
//! A [`PatchObserver`] sees every activation and deactivation a stack
//! performs, with the declared position of the member involved.

use parking_lot::Mutex;
use patchkit_core::{PatchError, PatchHandle};
use std::fmt;

/// Hook called by an active stack on each lifecycle step
pub trait PatchObserver: Send + Sync + fmt::Debug {
    /// Member `index` was activated
    fn on_activate(&self, index: usize, handle: &PatchHandle) {
        let _ = (index, handle);
    }

    /// Member `index` failed to activate
    fn on_activation_failed(&self, index: usize, target: &str, error: &PatchError) {
        let _ = (index, target, error);
    }

    /// Member `index` was deactivated, successfully or not
    fn on_deactivate(&self, index: usize, handle: &PatchHandle, outcome: Result<(), &PatchError>) {
        let _ = (index, handle, outcome);
    }
}

/// Recorded lifecycle step
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StackEvent {
    /// Member activated
    Activated {
        /// Declared position
        index: usize,
        /// Target label
        target: String,
    },

    /// Member failed to activate
    ActivationFailed {
        /// Declared position
        index: usize,
        /// Target label
        target: String,
    },

    /// Member restored
    Deactivated {
        /// Declared position
        index: usize,
        /// Target label
        target: String,
    },

    /// Member failed to restore
    DeactivationFailed {
        /// Declared position
        index: usize,
        /// Target label
        target: String,
    },
}

impl StackEvent {
    /// Declared position of the member involved
    #[must_use]
    pub fn index(&self) -> usize {
        match self {
            Self::Activated { index, .. }
            | Self::ActivationFailed { index, .. }
            | Self::Deactivated { index, .. }
            | Self::DeactivationFailed { index, .. } => *index,
        }
    }
}

/// Observer keeping every event in order
#[derive(Debug, Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<StackEvent>>,
}

impl RecordingObserver {
    /// Create empty recorder
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all events
    #[must_use]
    pub fn events(&self) -> Vec<StackEvent> {
        self.events.lock().clone()
    }

    /// Positions in the order they were activated
    #[must_use]
    pub fn activation_order(&self) -> Vec<usize> {
        self.indices(|e| matches!(e, StackEvent::Activated { .. }))
    }

    /// Positions in the order they were deactivated (including failures)
    #[must_use]
    pub fn deactivation_order(&self) -> Vec<usize> {
        self.indices(|e| {
            matches!(
                e,
                StackEvent::Deactivated { .. } | StackEvent::DeactivationFailed { .. }
            )
        })
    }

    /// Forget recorded events
    pub fn clear(&self) {
        self.events.lock().clear();
    }

    fn indices(&self, keep: impl Fn(&StackEvent) -> bool) -> Vec<usize> {
        self.events
            .lock()
            .iter()
            .filter(|e| keep(e))
            .map(StackEvent::index)
            .collect()
    }

    fn push(&self, event: StackEvent) {
        self.events.lock().push(event);
    }
}

impl PatchObserver for RecordingObserver {
    fn on_activate(&self, index: usize, handle: &PatchHandle) {
        self.push(StackEvent::Activated {
            index,
            target: handle.target_label().to_string(),
        });
    }

    fn on_activation_failed(&self, index: usize, target: &str, _error: &PatchError) {
        self.push(StackEvent::ActivationFailed {
            index,
            target: target.to_string(),
        });
    }

    fn on_deactivate(&self, index: usize, handle: &PatchHandle, outcome: Result<(), &PatchError>) {
        let target = handle.target_label().to_string();
        self.push(match outcome {
            Ok(()) => StackEvent::Deactivated { index, target },
            Err(_) => StackEvent::DeactivationFailed { index, target },
        });
    }
}
