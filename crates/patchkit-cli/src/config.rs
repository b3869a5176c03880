//! Demo configuration
//!
//! Loaded from an optional TOML file; command-line flags override it.

use patchkit_core::PatchConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File could not be read
    #[error("cannot read config '{path}': {source}")]
    Read {
        /// Config file path
        path: PathBuf,
        /// I/O failure
        #[source]
        source: std::io::Error,
    },

    /// File is not valid TOML for [`DemoConfig`]
    #[error("invalid config '{path}': {source}")]
    Parse {
        /// Config file path
        path: PathBuf,
        /// Parse failure
        #[source]
        source: toml::de::Error,
    },
}

/// Settings for `patchkit demo`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    /// Return value configured on the `foo` double
    pub foo: String,

    /// Return value configured on the `faa` double
    pub faa: String,

    /// Settings applied to both doubles
    pub patch: PatchConfig,
}

impl DemoConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from a TOML file; missing keys take their defaults
    ///
    /// # Errors
    /// [`ConfigError`] if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// With `foo` return value
    #[inline]
    #[must_use]
    pub fn with_foo(mut self, foo: impl Into<String>) -> Self {
        self.foo = foo.into();
        self
    }

    /// With `faa` return value
    #[inline]
    #[must_use]
    pub fn with_faa(mut self, faa: impl Into<String>) -> Self {
        self.faa = faa.into();
        self
    }

    /// Render as TOML
    ///
    /// # Errors
    /// Only if serialization itself fails.
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            foo: "Hello there!".to_string(),
            faa: "Bye!".to_string(),
            patch: PatchConfig::default(),
        }
    }
}
