//! Patch descriptors
//!
//! A [`PatchDescriptor`] describes one pending substitution. Activating it
//! captures the original binding, installs a double and returns the
//! [`PatchHandle`]; deactivating it with that handle puts the original back.

use crate::config::PatchConfig;
use crate::double::PatchHandle;
use crate::error::PatchError;
use crate::kind::PatchKind;
use crate::target::Target;
use patchkit_attr::{Namespace, Owner, PatchId};

/// One pending substitution
///
/// # Invariants
/// - At most one live handle per descriptor
/// - At most one live handle per `(owner, name)` slot, across descriptors
#[derive(Debug)]
pub struct PatchDescriptor {
    target: Target,
    kind: PatchKind,
    config: Option<PatchConfig>,
    active: Option<PatchId>,
}

impl PatchDescriptor {
    /// Describe a patch of `target`
    #[inline]
    #[must_use]
    pub fn new(target: Target, kind: PatchKind) -> Self {
        Self {
            target,
            kind,
            config: None,
            active: None,
        }
    }

    /// Describe a patch of `name` on a known owner
    #[inline]
    #[must_use]
    pub fn object(owner: impl Into<Owner>, name: impl Into<String>, kind: PatchKind) -> Self {
        Self::new(Target::direct(owner, name), kind)
    }

    /// Describe a patch by dotted path, resolved against `namespace` on
    /// activation
    ///
    /// # Errors
    /// [`PatchError::Attribute`] if `path` is malformed.
    pub fn path(namespace: &Namespace, path: &str, kind: PatchKind) -> Result<Self, PatchError> {
        Ok(Self::new(Target::path(namespace, path)?, kind))
    }

    /// With explicit configuration
    #[inline]
    #[must_use]
    pub fn with_config(mut self, config: PatchConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Apply `config` unless the descriptor already has one
    #[inline]
    pub fn inherit_config(&mut self, config: PatchConfig) {
        self.config.get_or_insert(config);
    }

    /// Effective configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> PatchConfig {
        self.config.unwrap_or_default()
    }

    /// Patch target
    #[inline]
    #[must_use]
    pub fn target(&self) -> &Target {
        &self.target
    }

    /// Patch kind
    #[inline]
    #[must_use]
    pub fn kind(&self) -> PatchKind {
        self.kind
    }

    /// Target label
    #[inline]
    #[must_use]
    pub fn label(&self) -> String {
        self.target.label()
    }

    /// Check if a handle from this descriptor is live
    #[inline]
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// Install a double in place of the target attribute
    ///
    /// # Errors
    /// - [`PatchError::AlreadyActive`] if this descriptor, or any other, has a
    ///   live handle on the slot
    /// - [`PatchError::NotFound`] if the owner cannot be resolved or does not
    ///   define the attribute
    pub fn activate(&mut self) -> Result<PatchHandle, PatchError> {
        let label = self.target.label();
        if self.active.is_some() {
            return Err(PatchError::AlreadyActive { target: label });
        }

        let (owner, name) = self
            .target
            .resolve()
            .map_err(|err| PatchError::from_activation(&label, err))?;
        let handle = PatchHandle::new(owner, name, label, self.kind, self.config());

        let original = handle
            .owner()
            .slots()
            .swap_in(handle.name(), handle.substitute(), handle.id())
            .map_err(|err| PatchError::from_activation(handle.target_label(), err))?;
        tracing::debug!(
            attribute = %handle.target_label(),
            patch_id = %handle.id(),
            kind = %self.kind,
            original = original.kind_name(),
            "patch activated"
        );
        handle.store_original(original);
        self.active = Some(handle.id());

        Ok(handle)
    }

    /// Put the original binding back
    ///
    /// # Errors
    /// [`PatchError::InvalidHandle`] if `handle` is not this descriptor's live
    /// handle, or was already deactivated. The owner is left untouched.
    pub fn deactivate(&mut self, handle: &PatchHandle) -> Result<(), PatchError> {
        if self.active != Some(handle.id()) {
            return Err(PatchError::invalid_handle(handle.target_label()));
        }
        let original = handle
            .take_original()
            .ok_or_else(|| PatchError::invalid_handle(handle.target_label()))?;

        if let Err(err) = handle
            .owner()
            .slots()
            .swap_back(handle.name(), handle.id(), original.clone())
        {
            handle.store_original(original);
            tracing::warn!(attribute = %handle.target_label(), error = %err, "restore rejected");
            return Err(PatchError::invalid_handle(handle.target_label()));
        }

        self.active = None;
        handle.mark_restored();
        tracing::debug!(
            attribute = %handle.target_label(),
            patch_id = %handle.id(),
            calls = handle.call_count(),
            "patch restored"
        );
        Ok(())
    }

    /// Activate for the lifetime of the returned guard
    ///
    /// # Errors
    /// See [`PatchDescriptor::activate`].
    pub fn scope(&mut self) -> Result<PatchGuard<'_>, PatchError> {
        let handle = self.activate()?;
        Ok(PatchGuard {
            descriptor: self,
            handle,
            closed: false,
        })
    }
}

/// Single-substitution scope
///
/// Restores the original binding when dropped, including during unwinding.
#[derive(Debug)]
pub struct PatchGuard<'a> {
    descriptor: &'a mut PatchDescriptor,
    handle: PatchHandle,
    closed: bool,
}

impl PatchGuard<'_> {
    /// Live handle of this scope
    #[inline]
    #[must_use]
    pub fn handle(&self) -> &PatchHandle {
        &self.handle
    }

    /// End the scope, reporting restore failure
    ///
    /// # Errors
    /// See [`PatchDescriptor::deactivate`].
    pub fn restore(mut self) -> Result<(), PatchError> {
        self.closed = true;
        self.descriptor.deactivate(&self.handle)
    }
}

impl Drop for PatchGuard<'_> {
    fn drop(&mut self) {
        if self.closed {
            return;
        }
        if let Err(err) = self.descriptor.deactivate(&self.handle) {
            tracing::error!(attribute = %self.handle.target_label(), error = %err, "restore failed on drop");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use patchkit_attr::{Binding, Class, Property, Value};
    use pretty_assertions::assert_eq;

    fn foo() -> Class {
        Class::builder("Foo")
            .property("foo", Property::constant("foo"))
            .property("faa", Property::constant("faa"))
            .value("limit", 3_i64)
            .build()
    }

    #[test]
    fn activate_substitutes_and_deactivate_restores() {
        let class = foo();
        let before = class.binding("foo").unwrap();
        let mut d = PatchDescriptor::object(&class, "foo", PatchKind::ComputedRead);

        let h = d.activate().unwrap();
        assert!(d.is_active());
        h.set_return_value("Hello there!");
        assert_eq!(class.instantiate().get("foo").unwrap(), Value::from("Hello there!"));

        d.deactivate(&h).unwrap();
        assert!(!d.is_active());
        assert!(h.is_restored());
        assert!(class.binding("foo").unwrap().is_identical(&before));
        assert_eq!(class.instantiate().get("foo").unwrap(), Value::from("foo"));
    }

    #[test]
    fn missing_attribute_is_not_found() {
        let class = foo();
        let mut d = PatchDescriptor::object(&class, "nope", PatchKind::Value);
        let err = d.activate().unwrap_err();
        assert!(err.is_not_found());
        assert!(!d.is_active());
    }

    #[test]
    fn reentrant_activation_is_already_active() {
        let class = foo();
        let mut d = PatchDescriptor::object(&class, "foo", PatchKind::ComputedRead);
        let h = d.activate().unwrap();
        assert!(matches!(d.activate(), Err(PatchError::AlreadyActive { .. })));
        d.deactivate(&h).unwrap();
    }

    #[test]
    fn overlapping_descriptors_are_already_active() {
        let class = foo();
        let mut first = PatchDescriptor::object(&class, "foo", PatchKind::ComputedRead);
        let mut second = PatchDescriptor::object(&class, "foo", PatchKind::Value);
        let h = first.activate().unwrap();

        let err = second.activate().unwrap_err();
        assert_eq!(err, PatchError::AlreadyActive { target: "Foo.foo".into() });
        assert!(!second.is_active());
        first.deactivate(&h).unwrap();
    }

    #[test]
    fn double_deactivate_is_invalid_handle() {
        let class = foo();
        let mut d = PatchDescriptor::object(&class, "foo", PatchKind::ComputedRead);
        let h = d.activate().unwrap();
        d.deactivate(&h).unwrap();
        let restored = class.binding("foo").unwrap();

        assert!(matches!(d.deactivate(&h), Err(PatchError::InvalidHandle { .. })));
        assert!(class.binding("foo").unwrap().is_identical(&restored));
    }

    #[test]
    fn foreign_handle_is_invalid() {
        let class = foo();
        let mut a = PatchDescriptor::object(&class, "foo", PatchKind::ComputedRead);
        let mut b = PatchDescriptor::object(&class, "faa", PatchKind::ComputedRead);
        let ha = a.activate().unwrap();
        let hb = b.activate().unwrap();

        assert!(matches!(a.deactivate(&hb), Err(PatchError::InvalidHandle { .. })));
        // Nothing was restored by the rejected call.
        assert!(class.binding("faa").unwrap().is_property());
        assert_eq!(class.slots().patched_by("faa"), Some(hb.id()));

        b.deactivate(&hb).unwrap();
        a.deactivate(&ha).unwrap();
    }

    #[test]
    fn value_patch_restores_same_allocation() {
        let class = foo();
        let before = class.binding("limit").unwrap();
        let mut d = PatchDescriptor::object(&class, "limit", PatchKind::Value);

        let h = d.activate().unwrap();
        assert_eq!(class.instantiate().get("limit").unwrap(), Value::Unset);
        h.set_return_value(10_i64);
        assert_eq!(class.instantiate().get("limit").unwrap(), Value::Int(10));

        d.deactivate(&h).unwrap();
        assert!(matches!(class.binding("limit"), Some(Binding::Value(_))));
        assert!(class.binding("limit").unwrap().is_identical(&before));
    }

    #[test]
    fn value_patch_reads_like_class_value() {
        let class = foo();
        let mut d = PatchDescriptor::object(&class, "limit", PatchKind::Value);
        let h = d.activate().unwrap();
        h.set_return_value(10_i64);

        assert_eq!(class.get("limit").unwrap(), Value::Int(10));
        d.deactivate(&h).unwrap();
        assert_eq!(class.get("limit").unwrap(), Value::Int(3));
    }

    #[test]
    fn instance_write_shadows_patched_class_value() {
        let class = foo();
        let mut d = PatchDescriptor::object(&class, "limit", PatchKind::Value);
        let h = d.activate().unwrap();
        h.set_return_value(10_i64);

        let writer = class.instantiate();
        writer.set("limit", 5_i64).unwrap();
        assert_eq!(writer.get("limit").unwrap(), Value::Int(5));
        assert_eq!(class.instantiate().get("limit").unwrap(), Value::Int(10));
        assert_eq!(h.return_value(), Some(Value::Int(10)));

        d.deactivate(&h).unwrap();
        assert_eq!(writer.get("limit").unwrap(), Value::Int(5));
        assert_eq!(class.instantiate().get("limit").unwrap(), Value::Int(3));
    }

    #[test]
    fn path_descriptor_resolves_at_activation() {
        let ns = Namespace::new();
        let mut d = PatchDescriptor::path(&ns, "main.Foo.foo", PatchKind::ComputedRead).unwrap();
        assert!(d.activate().unwrap_err().is_not_found());

        let class = foo();
        ns.register_class("main", &class);
        let h = d.activate().unwrap();
        h.set_return_value("patched");
        assert_eq!(class.instantiate().get("foo").unwrap(), Value::from("patched"));
        assert_eq!(h.target_label(), "main.Foo.foo");
        d.deactivate(&h).unwrap();
    }

    #[test]
    fn instance_attribute_patch() {
        let class = foo();
        let obj = class.instantiate();
        obj.set("x", 1_i64).unwrap();
        let other = class.instantiate();
        other.set("x", 2_i64).unwrap();

        let mut d = PatchDescriptor::object(&obj, "x", PatchKind::Value);
        let h = d.activate().unwrap();
        h.set_return_value(42_i64);
        assert_eq!(obj.get("x").unwrap(), Value::Int(42));
        assert_eq!(other.get("x").unwrap(), Value::Int(2));

        obj.set("x", 7_i64).unwrap();
        assert_eq!(h.return_value(), Some(Value::Int(7)));
        assert_eq!(obj.get("x").unwrap(), Value::Int(7));

        d.deactivate(&h).unwrap();
        assert_eq!(obj.get("x").unwrap(), Value::Int(1));
    }

    #[test]
    fn guard_restores_on_drop() {
        let class = foo();
        let mut d = PatchDescriptor::object(&class, "faa", PatchKind::ComputedRead);
        {
            let guard = d.scope().unwrap();
            guard.handle().set_return_value("Bye!");
            assert_eq!(class.instantiate().get("faa").unwrap(), Value::from("Bye!"));
        }
        assert!(!d.is_active());
        assert_eq!(class.instantiate().get("faa").unwrap(), Value::from("faa"));
    }

    #[test]
    fn guard_restores_on_panic() {
        let class = foo();
        let mut d = PatchDescriptor::object(&class, "foo", PatchKind::ComputedRead);
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = d.scope().unwrap();
            panic!("body failed");
        }));
        assert!(result.is_err());
        assert_eq!(class.instantiate().get("foo").unwrap(), Value::from("foo"));
    }

    #[test]
    fn explicit_guard_restore() {
        let class = foo();
        let mut d = PatchDescriptor::object(&class, "foo", PatchKind::ComputedRead);
        let guard = d.scope().unwrap();
        guard.restore().unwrap();
        assert!(!d.is_active());
    }

    #[test]
    fn config_inheritance() {
        let class = foo();
        let own = PatchConfig::new().with_record_calls(false);
        let mut d = PatchDescriptor::object(&class, "foo", PatchKind::ComputedRead).with_config(own);
        d.inherit_config(PatchConfig::default());
        assert_eq!(d.config(), own);

        let mut plain = PatchDescriptor::object(&class, "faa", PatchKind::ComputedRead);
        plain.inherit_config(own);
        assert_eq!(plain.config(), own);
    }
}
