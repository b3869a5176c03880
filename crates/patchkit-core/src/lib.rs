//! patchkit core
//!
//! Patch descriptors and the doubles they install.
//!
//! # Core Concepts
//!
//! - [`PatchDescriptor`]: one pending substitution (target + kind)
//! - [`PatchHandle`]: the live double, configured by test code
//! - [`PatchGuard`]: single-substitution scope restoring on drop
//! - [`PatchKind`]: plain value, computed read, computed read-write
//!
//! # Example
//!
//! ```rust
//! use patchkit_attr::{Class, Property, Value};
//! use patchkit_core::{PatchDescriptor, PatchKind};
//!
//! let foo = Class::builder("Foo")
//!     .property("foo", Property::constant("foo"))
//!     .build();
//!
//! let mut patch = PatchDescriptor::object(&foo, "foo", PatchKind::ComputedRead);
//! {
//!     let guard = patch.scope().unwrap();
//!     guard.handle().set_return_value("Hello there!");
//!     assert_eq!(foo.instantiate().get("foo").unwrap(), Value::from("Hello there!"));
//! }
//! assert_eq!(foo.instantiate().get("foo").unwrap(), Value::from("foo"));
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

mod config;
mod descriptor;
mod double;
mod error;
mod kind;
mod target;

// Re-exports
pub use config::{ExhaustedPolicy, PatchConfig};
pub use descriptor::{PatchDescriptor, PatchGuard};
pub use double::{Call, PatchHandle};
pub use error::PatchError;
pub use kind::PatchKind;
pub use target::Target;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
