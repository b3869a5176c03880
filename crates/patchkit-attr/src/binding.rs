//! Attribute bindings
//!
//! A [`Binding`] is what a slot holds: either a stored value or a computed
//! [`Property`]. Bindings are reference counted so that a captured binding
//! can be put back later and compared by identity.

use crate::error::AttrError;
use crate::object::Instance;
use crate::value::Value;
use std::fmt;
use std::sync::Arc;

/// Read behavior of a computed property
pub type Getter = Arc<dyn Fn(&Instance) -> Result<Value, AttrError> + Send + Sync>;

/// Write behavior of a computed property
pub type Setter = Arc<dyn Fn(&Instance, Value) -> Result<(), AttrError> + Send + Sync>;

/// Computed property: read (and optionally write) runs behavior
#[derive(Clone)]
pub struct Property {
    getter: Getter,
    setter: Option<Setter>,
}

impl Property {
    /// Create read-only property
    #[must_use]
    pub fn read_only<G>(getter: G) -> Self
    where
        G: Fn(&Instance) -> Result<Value, AttrError> + Send + Sync + 'static,
    {
        Self {
            getter: Arc::new(getter),
            setter: None,
        }
    }

    /// Create read-write property
    #[must_use]
    pub fn read_write<G, S>(getter: G, setter: S) -> Self
    where
        G: Fn(&Instance) -> Result<Value, AttrError> + Send + Sync + 'static,
        S: Fn(&Instance, Value) -> Result<(), AttrError> + Send + Sync + 'static,
    {
        Self {
            getter: Arc::new(getter),
            setter: Some(Arc::new(setter)),
        }
    }

    /// Property returning a fixed value
    #[must_use]
    pub fn constant(value: impl Into<Value>) -> Self {
        let value = value.into();
        Self::read_only(move |_| Ok(value.clone()))
    }

    /// Run the getter
    ///
    /// # Errors
    /// Propagates whatever the getter returns.
    #[inline]
    pub fn get(&self, instance: &Instance) -> Result<Value, AttrError> {
        (self.getter)(instance)
    }

    /// Run the setter, if any
    ///
    /// # Errors
    /// Returns `None` when the property is read-only, otherwise the
    /// setter's own result.
    #[inline]
    pub fn set(&self, instance: &Instance, value: Value) -> Option<Result<(), AttrError>> {
        self.setter.as_ref().map(|setter| setter(instance, value))
    }

    /// Check if the property accepts writes
    #[inline]
    #[must_use]
    pub fn is_writable(&self) -> bool {
        self.setter.is_some()
    }

    /// Identity comparison of getter and setter
    #[must_use]
    pub fn is_identical(&self, other: &Self) -> bool {
        let setters_match = match (&self.setter, &other.setter) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        };
        Arc::ptr_eq(&self.getter, &other.getter) && setters_match
    }
}

impl fmt::Debug for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Property")
            .field("writable", &self.is_writable())
            .finish_non_exhaustive()
    }
}

/// Read side of a [`ValueCell`]
pub type Load = Arc<dyn Fn() -> Result<Value, AttrError> + Send + Sync>;

/// Write side of a [`ValueCell`]
pub type Store = Arc<dyn Fn(Value) + Send + Sync>;

/// Plain value kept outside the slot table
///
/// Reads and writes behave like a stored [`Binding::Value`]: no instance is
/// needed to read it, and writing replaces what later reads return.
#[derive(Clone)]
pub struct ValueCell {
    load: Load,
    store: Store,
}

impl ValueCell {
    /// Create cell from its load and store halves
    #[must_use]
    pub fn new<L, S>(load: L, store: S) -> Self
    where
        L: Fn() -> Result<Value, AttrError> + Send + Sync + 'static,
        S: Fn(Value) + Send + Sync + 'static,
    {
        Self {
            load: Arc::new(load),
            store: Arc::new(store),
        }
    }

    /// Current value
    ///
    /// # Errors
    /// Propagates whatever the load half returns.
    #[inline]
    pub fn load(&self) -> Result<Value, AttrError> {
        (self.load)()
    }

    /// Replace the value
    #[inline]
    pub fn store(&self, value: Value) {
        (self.store)(value);
    }

    /// Identity comparison of both halves
    #[must_use]
    pub fn is_identical(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.load, &other.load) && Arc::ptr_eq(&self.store, &other.store)
    }
}

impl fmt::Debug for ValueCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValueCell").finish_non_exhaustive()
    }
}

/// Whatever is bound at an attribute name
#[derive(Debug, Clone)]
pub enum Binding {
    /// Stored plain value
    Value(Arc<Value>),

    /// Plain value read and written through a [`ValueCell`]
    Cell(ValueCell),

    /// Computed property
    Property(Property),
}

impl Binding {
    /// Create value binding
    #[inline]
    #[must_use]
    pub fn value(value: impl Into<Value>) -> Self {
        Self::Value(Arc::new(value.into()))
    }

    /// Read a plain value without an instance
    ///
    /// Returns `None` for computed properties.
    ///
    /// # Errors
    /// Whatever a [`ValueCell`] load returns.
    pub fn plain_value(&self) -> Option<Result<Value, AttrError>> {
        match self {
            Self::Value(value) => Some(Ok((**value).clone())),
            Self::Cell(cell) => Some(cell.load()),
            Self::Property(_) => None,
        }
    }

    /// Check if binding is a computed property
    #[inline]
    #[must_use]
    pub fn is_property(&self) -> bool {
        matches!(self, Self::Property(_))
    }

    /// Identity comparison
    ///
    /// Values compare by allocation, properties by their closures. Two
    /// separately created bindings with equal contents are not identical.
    #[must_use]
    pub fn is_identical(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Value(a), Self::Value(b)) => Arc::ptr_eq(a, b),
            (Self::Cell(a), Self::Cell(b)) => a.is_identical(b),
            (Self::Property(a), Self::Property(b)) => a.is_identical(b),
            _ => false,
        }
    }

    /// Short kind name for diagnostics
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Value(_) => "value",
            Self::Cell(_) => "value(cell)",
            Self::Property(p) if p.is_writable() => "property(rw)",
            Self::Property(_) => "property",
        }
    }
}

impl From<ValueCell> for Binding {
    fn from(cell: ValueCell) -> Self {
        Self::Cell(cell)
    }
}

impl From<Property> for Binding {
    fn from(property: Property) -> Self {
        Self::Property(property)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_are_identical() {
        let binding = Binding::from(Property::constant("foo"));
        let copy = binding.clone();
        assert!(binding.is_identical(&copy));
    }

    #[test]
    fn equal_contents_are_not_identical() {
        let a = Binding::value("foo");
        let b = Binding::value("foo");
        assert!(!a.is_identical(&b));
        assert!(a.is_identical(&a.clone()));
    }

    #[test]
    fn kind_names() {
        assert_eq!(Binding::value(1_i64).kind_name(), "value");
        assert_eq!(Binding::from(Property::constant(1_i64)).kind_name(), "property");
        let rw = Property::read_write(|_| Ok(Value::Null), |_, _| Ok(()));
        assert_eq!(Binding::from(rw).kind_name(), "property(rw)");
    }

    #[test]
    fn cell_reads_like_a_plain_value() {
        let shared = Arc::new(parking_lot::Mutex::new(Value::Int(1)));
        let (load, store) = (Arc::clone(&shared), Arc::clone(&shared));
        let cell = ValueCell::new(move || Ok(load.lock().clone()), move |v| *store.lock() = v);
        let binding = Binding::from(cell.clone());

        assert!(!binding.is_property());
        assert_eq!(binding.plain_value().unwrap().unwrap(), Value::Int(1));
        cell.store(Value::Int(2));
        assert_eq!(binding.plain_value().unwrap().unwrap(), Value::Int(2));
        assert!(binding.is_identical(&binding.clone()));
        assert!(Binding::from(Property::constant(1_i64)).plain_value().is_none());
    }
}
