//! CPU-side asset data consumed by the morph helper.
//!
//! This module provides:
//! - [`Accessor`] - typed view over shared vertex/index bytes
//! - [`Primitive`], [`MorphTarget`], [`Mesh`] - mesh structure with blend shapes
//! - [`UvMap`] - texcoord routing decided by the material provider
//! - [`AssetGraph`] - the provider interface, with [`StaticAsset`] as an in-memory implementation

mod accessor;
mod graph;
mod primitive;

pub use accessor::*;
pub use graph::*;
pub use primitive::*;
