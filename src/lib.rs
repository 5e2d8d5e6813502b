//! Morph target blending beyond four targets for the RedLilium renderer.
//!
//! The vertex pipeline blends exactly four morph targets. Models with more
//! targets go through [`MorphHelper`]: every weight update selects the four
//! most influential targets and binds a vertex buffer built for that
//! combination. Built buffers are cached per entity and combination.
//!
//! # Example
//!
//! ```ignore
//! let mut helper = MorphHelper::new(asset, MorphConfig::default());
//! helper.apply_weights(&mut backend, entity, &weights)?;
//! // ...
//! helper.destroy(&mut backend);
//! ```
//!
//! # Modules
//! - [`asset`]: CPU mesh data and the asset graph interface
//! - [`backend`]: GPU buffer and renderable interfaces, plus a dummy backend
//! - [`morph`]: selection, synthesis, and caching
//! - [`tangents`]: packed tangent frame generation

pub mod asset;
pub mod backend;
pub mod error;
pub mod morph;
pub mod scene;
pub mod tangents;

pub use error::{MorphError, MorphResult};
pub use morph::{MorphCacheStats, MorphHelper, PrimaryIndices, Selection, WeightSelector};
pub use scene::Entity;

/// Configuration for a [`MorphHelper`]
#[derive(Debug, Clone)]
pub struct MorphConfig {
    /// Weights past this count are ignored (clamped to 4..=255)
    pub max_weights: usize,
    /// Maximum number of buffer slots per vertex buffer
    pub max_buffer_count: usize,
    /// Byte pattern of the dummy UV/color buffer
    pub dummy_fill: u8,
    /// Attach `morph:<entity>:<primitive>` labels to built vertex buffers
    pub label_buffers: bool,
}

impl Default for MorphConfig {
    fn default() -> Self {
        Self {
            max_weights: morph::MAX_WEIGHTS,
            max_buffer_count: 16,
            dummy_fill: 0xff,
            label_buffers: true,
        }
    }
}
