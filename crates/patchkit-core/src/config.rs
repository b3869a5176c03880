//! Patch configuration

use serde::{Deserialize, Serialize};

/// What a double does once a return sequence runs out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExhaustedPolicy {
    /// Fail the read with `AttrError::Exhausted`
    #[default]
    Error,

    /// Keep returning the last value handed out
    RepeatLast,
}

/// Per-patch configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatchConfig {
    /// Record every read and write in the handle's call log
    pub record_calls: bool,

    /// Behavior after a return sequence is consumed
    pub on_exhausted: ExhaustedPolicy,
}

impl PatchConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With call recording on or off
    #[inline]
    #[must_use]
    pub fn with_record_calls(mut self, record: bool) -> Self {
        self.record_calls = record;
        self
    }

    /// With exhaustion policy
    #[inline]
    #[must_use]
    pub fn with_on_exhausted(mut self, policy: ExhaustedPolicy) -> Self {
        self.on_exhausted = policy;
        self
    }
}

impl Default for PatchConfig {
    fn default() -> Self {
        Self {
            record_calls: true,
            on_exhausted: ExhaustedPolicy::Error,
        }
    }
}
