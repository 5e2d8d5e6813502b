//! Morph target selection and vertex buffer variants.
//!
//! - [`WeightSelector`] - picks the four most influential targets
//! - [`VertexBufferSynthesizer`] - builds a vertex buffer for one combination
//! - [`MorphTable`] - caches variants per entity and combination
//! - [`MorphHelper`] - ties the above together behind `apply_weights`

mod cache;
mod helper;
mod key;
mod selector;
mod synthesizer;

pub use cache::*;
pub use helper::*;
pub use key::*;
pub use selector::*;
pub use synthesizer::*;
