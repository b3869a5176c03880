//! Patch targets
//!
//! A [`Target`] names the attribute a patch replaces, either directly by
//! owner handle or symbolically by dotted path resolved at activation time.

use patchkit_attr::{AttrError, AttributePath, Namespace, Owner};
use std::str::FromStr;

/// Attribute reference, eager or lazy
#[derive(Debug, Clone)]
pub enum Target {
    /// Owner known when the patch is described
    Direct {
        /// Owner of the attribute
        owner: Owner,
        /// Attribute name
        name: String,
    },

    /// Owner looked up in a namespace when the patch is activated
    Path {
        /// Registry to resolve against
        namespace: Namespace,
        /// Full path, owner segments followed by attribute name
        path: AttributePath,
    },
}

impl Target {
    /// Direct target
    #[must_use]
    pub fn direct(owner: impl Into<Owner>, name: impl Into<String>) -> Self {
        Self::Direct {
            owner: owner.into(),
            name: name.into(),
        }
    }

    /// Symbolic target
    ///
    /// # Errors
    /// Returns [`AttrError::Path`] if `path` is malformed or has no owner part.
    pub fn path(namespace: &Namespace, path: &str) -> Result<Self, AttrError> {
        let path = AttributePath::from_str(path)?;
        path.split_attribute()?;
        Ok(Self::Path {
            namespace: namespace.clone(),
            path,
        })
    }

    /// Human-readable label, e.g. `Foo.foo` or `main.Foo.foo`
    #[must_use]
    pub fn label(&self) -> String {
        match self {
            Self::Direct { owner, name } => format!("{}.{name}", owner.label()),
            Self::Path { path, .. } => path.to_string(),
        }
    }

    /// Attribute name
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Direct { name, .. } => name,
            Self::Path { path, .. } => path.last().unwrap_or_default(),
        }
    }

    /// Resolve to owner and attribute name
    ///
    /// # Errors
    /// [`AttrError::UnresolvedOwner`] when a symbolic owner is not registered.
    pub fn resolve(&self) -> Result<(Owner, String), AttrError> {
        match self {
            Self::Direct { owner, name } => Ok((owner.clone(), name.clone())),
            Self::Path { namespace, path } => namespace.resolve_attribute(path),
        }
    }
}
