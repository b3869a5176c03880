//! # patchkit CLI
//!
//! Drives the stacked-property demo: two computed properties of `Foo` patched
//! through one [`CompositionStack`](patchkit_composition::CompositionStack),
//! read inside the scope, then read again after restoration.

pub mod config;
pub mod demo;
pub mod logging;

pub use config::{ConfigError, DemoConfig};
pub use demo::{run, DemoError, DemoReport, Reading};
pub use logging::init_tracing;
