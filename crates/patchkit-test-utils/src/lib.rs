//! Testing utilities for patchkit workspace
//!
//! Shared fixtures, snapshots, and misuse helpers.

#![allow(missing_docs)]

use patchkit_attr::{Binding, Class, Instance, Namespace, Property, Value};
use patchkit_composition::RecordingObserver;
use patchkit_core::{PatchDescriptor, PatchHandle, PatchKind};
use std::sync::Arc;

pub const MODULE: &str = "main";

/// Plain data holder with two computed properties, `foo` and `faa`
pub fn foo_class() -> Class {
    Class::builder("Foo")
        .property("foo", Property::constant("foo"))
        .property("faa", Property::constant("faa"))
        .build()
}

/// `Foo` registered as `main.Foo` in a fresh namespace
pub fn foo_namespace() -> (Namespace, Class) {
    let namespace = Namespace::new();
    let class = foo_class();
    namespace.register_class(MODULE, &class);
    (namespace, class)
}

/// Class with `n` read-only properties `p0..pn`, `pi` returning `i`
pub fn numbered_class(n: usize) -> Class {
    (0..n)
        .fold(Class::builder("Numbered"), |builder, i| {
            builder.property(format!("p{i}"), Property::constant(i as i64))
        })
        .build()
}

/// Computed-read descriptors for `names` on `class`, in order
pub fn computed_patches(class: &Class, names: &[&str]) -> Vec<PatchDescriptor> {
    names
        .iter()
        .map(|name| PatchDescriptor::object(class, *name, PatchKind::ComputedRead))
        .collect()
}

/// Read `name` from a fresh instance
pub fn read_fresh(class: &Class, name: &str) -> Value {
    class.instantiate().get(name).unwrap()
}

/// Read `foo` and `faa` the way the demo prints them
pub fn describe_foo(instance: &Instance) -> String {
    format!(
        "Foo property -> {} Faa property -> {}",
        instance.get("foo").unwrap(),
        instance.get("faa").unwrap()
    )
}

pub fn recorder() -> Arc<RecordingObserver> {
    Arc::new(RecordingObserver::new())
}

/// Every class-level binding, by name, at the time of capture
#[derive(Debug)]
pub struct BindingSnapshot {
    bindings: Vec<(String, Binding)>,
}

impl BindingSnapshot {
    pub fn capture(class: &Class) -> Self {
        let bindings = class
            .slots()
            .names()
            .into_iter()
            .filter_map(|name| class.binding(&name).map(|b| (name, b)))
            .collect();
        Self { bindings }
    }

    /// Assert `class` holds exactly the captured bindings, by identity
    pub fn assert_restored(&self, class: &Class) {
        assert_eq!(class.slots().names().len(), self.bindings.len(), "slot count changed");
        for (name, before) in &self.bindings {
            let now = class
                .binding(name)
                .unwrap_or_else(|| panic!("'{name}' disappeared"));
            assert!(now.is_identical(before), "'{name}' was not restored verbatim");
            assert_eq!(class.slots().patched_by(name), None, "'{name}' still marked patched");
        }
    }
}

/// Undo `handle`'s substitution behind its descriptor's back
///
/// The slot gets a fresh value and loses its patch mark, so the
/// descriptor's own restore will be rejected as an invalid handle.
pub fn tamper(handle: &PatchHandle) {
    handle
        .owner()
        .slots()
        .swap_back(handle.name(), handle.id(), Binding::value("tampered"))
        .unwrap();
}
