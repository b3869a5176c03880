//! patchkit attribute model
//!
//! A small dynamic object model whose attributes live behind swappable slot
//! tables. Patching never rewrites code; it swaps the [`Binding`] stored in
//! a [`SlotTable`] and swaps the captured original back afterwards.
//!
//! # Overview
//!
//! - [`Class`] / [`Instance`]: owners of attributes
//! - [`Binding`]: a stored [`Value`], a [`ValueCell`], or a computed [`Property`]
//! - [`SlotTable`]: per-owner indirection table, the only mutation point
//! - [`Namespace`]: dotted-path registry for resolving `main.Foo.foo`
//!
//! # Example
//!
//! ```rust
//! use patchkit_attr::{Class, Property, Value};
//!
//! let foo = Class::builder("Foo")
//!     .property("foo", Property::constant("foo"))
//!     .build();
//!
//! let instance = foo.instantiate();
//! assert_eq!(instance.get("foo").unwrap(), Value::from("foo"));
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod binding;
pub mod error;
pub mod namespace;
pub mod object;
pub mod path;
pub mod slots;
pub mod value;

// Re-exports
pub use binding::{Binding, Getter, Load, Property, Setter, Store, ValueCell};
pub use error::AttrError;
pub use namespace::Namespace;
pub use object::{Class, ClassBuilder, Instance, Owner};
pub use path::{AttributePath, PathError};
pub use slots::{PatchId, SlotTable};
pub use value::Value;

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for building patchable objects
    pub use crate::{AttrError, Binding, Class, Instance, Namespace, Owner, Property, Value};
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
