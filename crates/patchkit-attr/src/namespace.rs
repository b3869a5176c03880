//! Owner registry for symbolic resolution
//!
//! A [`Namespace`] maps dotted owner paths such as `main.Foo` to owners, so
//! a patch can be described as `main.Foo.foo` before `Foo` exists and
//! resolved when it is activated.

use crate::error::AttrError;
use crate::object::{Class, Owner};
use crate::path::AttributePath;
use dashmap::DashMap;
use std::str::FromStr;
use std::sync::Arc;

/// Registry of owners by dotted path
///
/// Cloning yields another handle to the same registry.
#[derive(Debug, Clone, Default)]
pub struct Namespace {
    owners: Arc<DashMap<AttributePath, Owner>>,
}

impl Namespace {
    /// Create empty namespace
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `owner` at `path`, returning any owner it replaces
    pub fn register(&self, path: AttributePath, owner: impl Into<Owner>) -> Option<Owner> {
        self.owners.insert(path, owner.into())
    }

    /// Register `class` under `module`, at `module.<class name>`
    pub fn register_class(&self, module: &str, class: &Class) -> Option<Owner> {
        let path = AttributePath::single(module).child(class.name());
        self.register(path, class)
    }

    /// Remove the owner at `path`
    pub fn unregister(&self, path: &AttributePath) -> Option<Owner> {
        self.owners.remove(path).map(|(_, owner)| owner)
    }

    /// Look up the owner at `path`
    #[must_use]
    pub fn resolve(&self, path: &AttributePath) -> Option<Owner> {
        self.owners.get(path).map(|entry| entry.value().clone())
    }

    /// Resolve an attribute path like `main.Foo.foo` into owner and name
    ///
    /// # Errors
    /// - [`AttrError::Path`] if `path` has no owner part
    /// - [`AttrError::UnresolvedOwner`] if nothing is registered at the owner
    ///   part
    pub fn resolve_attribute(&self, path: &AttributePath) -> Result<(Owner, String), AttrError> {
        let (owner_path, name) = path.split_attribute()?;
        let owner = self
            .resolve(&owner_path)
            .ok_or_else(|| AttrError::UnresolvedOwner {
                path: owner_path.to_string(),
            })?;
        Ok((owner, name.to_string()))
    }

    /// Parse and resolve a dotted attribute path
    ///
    /// # Errors
    /// See [`Namespace::resolve_attribute`]; malformed strings yield
    /// [`AttrError::Path`].
    pub fn resolve_str(&self, path: &str) -> Result<(Owner, String), AttrError> {
        self.resolve_attribute(&AttributePath::from_str(path)?)
    }

    /// Number of registered owners
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.owners.len()
    }

    /// Check if nothing is registered
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.owners.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::Property;

    fn foo() -> Class {
        Class::builder("Foo")
            .property("foo", Property::constant("foo"))
            .build()
    }

    #[test]
    fn register_and_resolve_attribute() {
        let ns = Namespace::new();
        let class = foo();
        ns.register_class("main", &class);

        let (owner, name) = ns.resolve_str("main.Foo.foo").unwrap();
        assert!(owner.same_as(&Owner::from(&class)));
        assert_eq!(name, "foo");
        assert_eq!(ns.len(), 1);
    }

    #[test]
    fn unresolved_owner() {
        let ns = Namespace::new();
        let err = ns.resolve_str("main.Foo.foo").unwrap_err();
        assert_eq!(
            err,
            AttrError::UnresolvedOwner {
                path: "main.Foo".to_string()
            }
        );
        assert!(err.is_not_found());
    }

    #[test]
    fn malformed_path() {
        let ns = Namespace::new();
        assert!(matches!(ns.resolve_str("foo"), Err(AttrError::Path(_))));
        assert!(matches!(ns.resolve_str("a..b"), Err(AttrError::Path(_))));
    }

    #[test]
    fn clones_share_registry() {
        let ns = Namespace::new();
        let other = ns.clone();
        other.register_class("main", &foo());
        assert!(!ns.is_empty());

        let path = AttributePath::from_str("main.Foo").unwrap();
        assert!(ns.unregister(&path).is_some());
        assert!(other.is_empty());
    }
}
