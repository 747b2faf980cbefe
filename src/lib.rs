//! Generate PHP stub declarations from the API surface of an extension.
//!
//! The [`runtime`] module models extensions the way the engine loads them,
//! [`reflection`] turns a loaded extension into an [`reflection::ExtensionSnapshot`],
//! and [`stubgen`] renders that snapshot as declaration-only PHP source.

pub mod core;
pub mod error;
pub mod reflection;
pub mod runtime;
pub mod stubgen;

pub use error::StubError;
