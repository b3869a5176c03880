//! Classes, instances and patchable owners
//!
//! A [`Class`] holds class-level bindings (computed properties and shared
//! values). An [`Instance`] holds its own bindings and falls back to its
//! class. Both are cheap handles over shared state; cloning one yields
//! another handle to the same object.

use crate::binding::{Binding, Property};
use crate::error::AttrError;
use crate::slots::SlotTable;
use crate::value::Value;
use indexmap::IndexMap;
use std::sync::Arc;

#[derive(Debug)]
struct ClassInner {
    name: String,
    slots: SlotTable,
}

/// Class: a named table of class-level bindings
#[derive(Debug, Clone)]
pub struct Class(Arc<ClassInner>);

impl Class {
    /// Create class without attributes
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self(Arc::new(ClassInner {
            slots: SlotTable::new(name.clone()),
            name,
        }))
    }

    /// Start building a class
    #[must_use]
    pub fn builder(name: impl Into<String>) -> ClassBuilder {
        ClassBuilder {
            name: name.into(),
            bindings: IndexMap::new(),
        }
    }

    /// Class name
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.0.name
    }

    /// Class-level slot table
    #[inline]
    #[must_use]
    pub fn slots(&self) -> &SlotTable {
        &self.0.slots
    }

    /// Current binding at `name`
    #[inline]
    #[must_use]
    pub fn binding(&self, name: &str) -> Option<Binding> {
        self.0.slots.binding(name)
    }

    /// Bind `name` on the class
    ///
    /// # Errors
    /// Fails if the slot is currently patched.
    pub fn define(&self, name: &str, binding: impl Into<Binding>) -> Result<Option<Binding>, AttrError> {
        self.0.slots.define(name, binding.into())
    }

    /// Read a class-level value
    ///
    /// # Errors
    /// - [`AttrError::NotFound`] if `name` is not bound
    /// - [`AttrError::NeedsInstance`] if `name` is a computed property
    pub fn get(&self, name: &str) -> Result<Value, AttrError> {
        let binding = self
            .binding(name)
            .ok_or_else(|| AttrError::not_found(&self.0.name, name))?;
        binding.plain_value().unwrap_or_else(|| {
            Err(AttrError::NeedsInstance {
                owner: self.0.name.clone(),
                name: name.to_string(),
            })
        })
    }

    /// Create a new instance of this class
    #[must_use]
    pub fn instantiate(&self) -> Instance {
        Instance::new(self.clone())
    }

    /// Check if both handles refer to the same class
    #[inline]
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

/// Builder for [`Class`]
#[derive(Debug)]
pub struct ClassBuilder {
    name: String,
    bindings: IndexMap<String, Binding>,
}

impl ClassBuilder {
    /// Add computed property
    #[must_use]
    pub fn property(mut self, name: impl Into<String>, property: Property) -> Self {
        self.bindings.insert(name.into(), Binding::Property(property));
        self
    }

    /// Add class-level value
    #[must_use]
    pub fn value(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.bindings.insert(name.into(), Binding::value(value));
        self
    }

    /// Finish the class
    #[must_use]
    pub fn build(self) -> Class {
        let slots = SlotTable::with_bindings(self.name.clone(), self.bindings);
        Class(Arc::new(ClassInner {
            name: self.name,
            slots,
        }))
    }
}

#[derive(Debug)]
struct InstanceInner {
    class: Class,
    slots: SlotTable,
}

/// Instance: own bindings plus a class to fall back to
#[derive(Debug, Clone)]
pub struct Instance(Arc<InstanceInner>);

impl Instance {
    /// Create instance of `class` with no own attributes
    #[must_use]
    pub fn new(class: Class) -> Self {
        let slots = SlotTable::new(format!("{} instance", class.name()));
        Self(Arc::new(InstanceInner { class, slots }))
    }

    /// Class of this instance
    #[inline]
    #[must_use]
    pub fn class(&self) -> &Class {
        &self.0.class
    }

    /// Instance-level slot table
    #[inline]
    #[must_use]
    pub fn slots(&self) -> &SlotTable {
        &self.0.slots
    }

    /// Read `name`: own binding first, then the class binding
    ///
    /// # Errors
    /// [`AttrError::NotFound`] if neither defines `name`; otherwise whatever
    /// a computed property's getter returns.
    pub fn get(&self, name: &str) -> Result<Value, AttrError> {
        let binding = self
            .0
            .slots
            .binding(name)
            .or_else(|| self.0.class.binding(name))
            .ok_or_else(|| AttrError::not_found(self.0.slots.label(), name))?;
        match binding {
            Binding::Value(value) => Ok((*value).clone()),
            Binding::Cell(cell) => cell.load(),
            Binding::Property(property) => property.get(self),
        }
    }

    /// Write `name`
    ///
    /// Own properties and class properties go through their setter. An own
    /// value cell takes the write. Any other plain value is stored on the
    /// instance, shadowing the class.
    ///
    /// # Errors
    /// [`AttrError::ReadOnly`] for a property without setter; otherwise the
    /// setter's result.
    pub fn set(&self, name: &str, value: impl Into<Value>) -> Result<(), AttrError> {
        let value = value.into();
        let property = match self.0.slots.binding(name) {
            Some(Binding::Property(property)) => Some(property),
            Some(Binding::Cell(cell)) => {
                cell.store(value);
                return Ok(());
            }
            Some(Binding::Value(_)) => None,
            None => match self.0.class.binding(name) {
                Some(Binding::Property(property)) => Some(property),
                _ => None,
            },
        };

        match property {
            Some(property) => property
                .set(self, value)
                .unwrap_or_else(|| Err(AttrError::read_only(self.0.class.name(), name))),
            None => self.0.slots.define(name, Binding::value(value)).map(|_| ()),
        }
    }

    /// Check if both handles refer to the same instance
    #[inline]
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

/// Anything a patch can target
#[derive(Debug, Clone)]
pub enum Owner {
    /// Class-level attribute
    Class(Class),

    /// Instance-level attribute
    Instance(Instance),
}

impl Owner {
    /// Slot table holding the owner's own bindings
    #[inline]
    #[must_use]
    pub fn slots(&self) -> &SlotTable {
        match self {
            Self::Class(class) => class.slots(),
            Self::Instance(instance) => instance.slots(),
        }
    }

    /// Owner label used in diagnostics
    #[inline]
    #[must_use]
    pub fn label(&self) -> &str {
        self.slots().label()
    }

    /// Check if both owners are the same object
    #[must_use]
    pub fn same_as(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Class(a), Self::Class(b)) => a.ptr_eq(b),
            (Self::Instance(a), Self::Instance(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

impl From<Class> for Owner {
    fn from(class: Class) -> Self {
        Self::Class(class)
    }
}

impl From<&Class> for Owner {
    fn from(class: &Class) -> Self {
        Self::Class(class.clone())
    }
}

impl From<Instance> for Owner {
    fn from(instance: Instance) -> Self {
        Self::Instance(instance)
    }
}

impl From<&Instance> for Owner {
    fn from(instance: &Instance) -> Self {
        Self::Instance(instance.clone())
    }
}
