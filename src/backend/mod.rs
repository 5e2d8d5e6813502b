//! Backend abstraction layer
//!
//! Provides the traits and types the engine's GPU layer implements for the
//! morph helper. The `dummy` backend records calls instead of touching a GPU.

pub mod traits;
pub mod types;

#[cfg(feature = "dummy")]
pub mod dummy;

pub use traits::*;
pub use types::*;
