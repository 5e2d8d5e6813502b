//! Error types for morph weight application.

use thiserror::Error;

use crate::asset::{AccessorKind, AttributeSemantic, ComponentType, PrimitiveMode};
use crate::backend::BackendError;
use crate::scene::Entity;

/// Errors raised while applying morph weights or synthesizing vertex buffers.
///
/// Apart from [`MorphError::Backend`], every variant describes mesh data that
/// upstream loading should already have rejected. Callers usually treat them
/// as fatal.
#[derive(Error, Debug)]
pub enum MorphError {
    #[error("entity {0} is not part of the asset's node map")]
    UnknownEntity(Entity),
    #[error("entity {0} does not reference a mesh")]
    MissingMesh(Entity),
    #[error("entity {0} has no renderable instance")]
    MissingRenderable(Entity),
    #[error("no index buffer or uv map registered for primitive {primitive}")]
    MissingPrimitiveBinding { primitive: usize },
    #[error("primitive has no attribute with vertex data")]
    NoVertexData,
    #[error("attribute {0:?} has no accessor")]
    MissingAccessor(AttributeSemantic),
    #[error("accessor range {offset}..{end} exceeds buffer of {len} bytes")]
    AccessorOutOfBounds { offset: usize, end: usize, len: usize },
    #[error("no vertex element format for {kind:?} of {component:?}")]
    UnsupportedElementFormat {
        kind: AccessorKind,
        component: ComponentType,
    },
    #[error("unsupported primitive mode {0:?}")]
    UnsupportedTopology(PrimitiveMode),
    #[error("morph target {target} out of range ({available} targets)")]
    MorphTargetOutOfRange { target: u8, available: usize },
    #[error("vertex buffer needs {count} slots, backend allows {max}")]
    TooManyBuffers { count: usize, max: usize },
    #[error("{attributes} attribute slots but {payloads} payloads")]
    SlotMismatch { attributes: usize, payloads: usize },
    #[error(transparent)]
    Backend(#[from] BackendError),
}

pub type MorphResult<T> = Result<T, MorphError>;
