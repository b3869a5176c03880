//! patchkit composition
//!
//! Applies several patches as one scope with guaranteed, reverse-order
//! restoration.
//!
//! # Core Concepts
//!
//! - [`CompositionStack`]: ordered patch set; activation first to last
//! - [`ActiveStack`]: the live scope; restores last to first on close, drop
//!   or unwind
//! - [`compose`]: run a body inside a stack in one call
//! - [`PatchObserver`]: lifecycle hook, [`RecordingObserver`] keeps events
//!
//! # Example
//!
//! ```rust
//! use patchkit_attr::{AttrError, Class, Property, Value};
//! use patchkit_composition::compose;
//! use patchkit_core::{PatchDescriptor, PatchKind};
//!
//! let foo = Class::builder("Foo")
//!     .property("foo", Property::constant("foo"))
//!     .property("faa", Property::constant("faa"))
//!     .build();
//!
//! let seen = compose(
//!     [
//!         PatchDescriptor::object(&foo, "foo", PatchKind::ComputedRead),
//!         PatchDescriptor::object(&foo, "faa", PatchKind::ComputedRead),
//!     ],
//!     |handles| {
//!         handles[0].set_return_value("Hello there!");
//!         handles[1].set_return_value("Bye!");
//!         let obj = foo.instantiate();
//!         Ok::<_, AttrError>(format!("{} {}", obj.get("foo")?, obj.get("faa")?))
//!     },
//! )
//! .unwrap();
//!
//! assert_eq!(seen, "Hello there! Bye!");
//! assert_eq!(foo.instantiate().get("foo").unwrap(), Value::from("foo"));
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

mod error;
mod observer;
mod scope;
mod stack;

// Re-exports
pub use error::{ActivationError, ComposeError, TeardownError, TeardownFailure};
pub use observer::{PatchObserver, RecordingObserver, StackEvent};
pub use scope::ActiveStack;
pub use stack::{compose, CompositionStack};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
