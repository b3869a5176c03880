//! The stacked-property demo
//!
//! Builds `Foo` with computed properties `foo` and `faa`, registers it as
//! `main.Foo`, patches both properties through one stack, reads them inside
//! the scope and again after it.

use crate::config::DemoConfig;
use patchkit_attr::{AttrError, Class, Namespace, Property, Value};
use patchkit_composition::{ComposeError, CompositionStack};
use patchkit_core::{PatchDescriptor, PatchError, PatchKind};
use serde::Serialize;

/// Module the demo class is registered under
pub const MODULE: &str = "main";

/// Demo failures
#[derive(Debug, thiserror::Error)]
pub enum DemoError {
    /// A patch could not be described
    #[error(transparent)]
    Patch(#[from] PatchError),

    /// The patched scope failed
    #[error(transparent)]
    Compose(#[from] ComposeError<AttrError>),

    /// Reading outside the scope failed
    #[error(transparent)]
    Attribute(#[from] AttrError),
}

/// Both property values at one point in time
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reading {
    /// Value of `foo`
    pub foo: Value,
    /// Value of `faa`
    pub faa: Value,
}

impl Reading {
    fn take(class: &Class) -> Result<Self, AttrError> {
        let instance = class.instantiate();
        Ok(Self {
            foo: instance.get("foo")?,
            faa: instance.get("faa")?,
        })
    }

    /// Line printed by the demo
    #[must_use]
    pub fn line(&self) -> String {
        format!("Foo property -> {} Faa property -> {}", self.foo, self.faa)
    }
}

/// Outcome of one demo run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DemoReport {
    /// Values read with both patches active
    pub patched: Reading,
    /// Values read after the stack closed
    pub restored: Reading,
    /// Calls recorded by each double, in declaration order
    pub calls: Vec<usize>,
}

impl DemoReport {
    /// Check that the scope left `Foo` as it found it
    #[must_use]
    pub fn is_restored(&self) -> bool {
        self.restored.foo == Value::from("foo") && self.restored.faa == Value::from("faa")
    }
}

/// The class under test
#[must_use]
pub fn foo_class() -> Class {
    Class::builder("Foo")
        .property("foo", Property::constant("foo"))
        .property("faa", Property::constant("faa"))
        .build()
}

/// Run the demo
///
/// # Errors
/// [`DemoError`] if any patch fails to activate, restore, or read.
pub fn run(config: &DemoConfig) -> Result<DemoReport, DemoError> {
    let namespace = Namespace::new();
    let class = foo_class();
    namespace.register_class(MODULE, &class);

    let mut stack = CompositionStack::new()
        .with_config(config.patch)
        .with(PatchDescriptor::path(&namespace, "main.Foo.foo", PatchKind::ComputedRead)?)
        .with(PatchDescriptor::path(&namespace, "main.Foo.faa", PatchKind::ComputedRead)?);

    let (patched, calls) = stack.run(|handles| {
        handles[0].set_return_value(config.foo.as_str());
        handles[1].set_return_value(config.faa.as_str());
        let reading = Reading::take(&class)?;
        let calls = handles.iter().map(|h| h.call_count()).collect();
        Ok((reading, calls))
    })?;
    tracing::info!(line = %patched.line(), "read patched properties");

    let restored = Reading::take(&class)?;
    Ok(DemoReport {
        patched,
        restored,
        calls,
    })
}
