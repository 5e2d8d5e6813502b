//! Core backend abstraction traits
//!
//! These traits define the services the morph helper consumes from the engine:
//! vertex buffer objects and renderable geometry assignment.

use glam::Vec4;
use thiserror::Error;

use crate::backend::types::*;
use crate::scene::Entity;

/// Backend error type
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("Failed to create buffer: {0}")]
    BufferCreationFailed(String),
    #[error("Invalid buffer handle: {0}")]
    InvalidHandle(u64),
    #[error("Buffer slot {slot} out of range (buffer count {buffer_count})")]
    SlotOutOfRange { slot: u32, buffer_count: u32 },
    #[error("Out of memory")]
    OutOfMemory,
}

pub type BackendResult<T> = Result<T, BackendError>;

/// Handle to a GPU vertex buffer object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VertexBufferHandle(u64);

impl VertexBufferHandle {
    pub const fn from_raw(id: u64) -> Self {
        Self(id)
    }

    pub const fn raw(self) -> u64 {
        self.0
    }
}

/// Handle to a GPU index buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IndexBufferHandle(u64);

impl IndexBufferHandle {
    pub const fn from_raw(id: u64) -> Self {
        Self(id)
    }

    pub const fn raw(self) -> u64 {
        self.0
    }
}

/// Handle to a renderable instance of an entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RenderableInstance(u64);

impl RenderableInstance {
    pub const fn from_raw(id: u64) -> Self {
        Self(id)
    }

    pub const fn raw(self) -> u64 {
        self.0
    }
}

/// A vertex buffer exclusively owned by its holder.
///
/// Not `Clone`: the only way to give it up is [`OwnedVertexBuffer::destroy`].
/// Renderables receive the plain [`VertexBufferHandle`] via [`handle`](Self::handle).
#[derive(Debug, PartialEq, Eq)]
#[must_use = "owned vertex buffers leak unless destroyed"]
pub struct OwnedVertexBuffer(VertexBufferHandle);

impl OwnedVertexBuffer {
    /// Take ownership of a freshly built buffer.
    pub fn new(handle: VertexBufferHandle) -> Self {
        Self(handle)
    }

    pub fn handle(&self) -> VertexBufferHandle {
        self.0
    }

    /// Release the buffer through the backend that built it.
    pub fn destroy<B: VertexBufferBackend + ?Sized>(self, backend: &mut B) {
        backend.destroy_vertex_buffer(self.0);
    }
}

/// An index buffer borrowed from the asset's mesh cache.
///
/// Never destroyed through this reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IndexBufferRef {
    handle: IndexBufferHandle,
    index_count: u32,
}

impl IndexBufferRef {
    pub fn new(handle: IndexBufferHandle, index_count: u32) -> Self {
        Self {
            handle,
            index_count,
        }
    }

    pub fn handle(&self) -> IndexBufferHandle {
        self.handle
    }

    pub fn index_count(&self) -> u32 {
        self.index_count
    }
}

/// Vertex buffer object creation and destruction.
pub trait VertexBufferBackend {
    /// Build a vertex buffer object with `desc.buffer_count` empty slots.
    fn build_vertex_buffer(
        &mut self,
        desc: &VertexBufferDescriptor,
    ) -> BackendResult<VertexBufferHandle>;

    /// Upload `data` into slot `slot`. The backend takes ownership of the bytes.
    fn set_buffer_at(
        &mut self,
        buffer: VertexBufferHandle,
        slot: u32,
        data: Vec<u8>,
    ) -> BackendResult<()>;

    /// Destroy a vertex buffer object
    fn destroy_vertex_buffer(&mut self, buffer: VertexBufferHandle);
}

/// Geometry and uniform assignment on renderables.
pub trait RenderableBackend {
    /// The renderable instance of `entity`, if it has one.
    fn renderable(&self, entity: Entity) -> Option<RenderableInstance>;

    /// Replace the geometry of primitive `primitive_index`.
    fn set_geometry_at(
        &mut self,
        renderable: RenderableInstance,
        primitive_index: usize,
        geometry: &GeometryBinding,
    );

    /// Set the four blend weights the vertex shader applies.
    fn set_morph_weights(&mut self, renderable: RenderableInstance, weights: Vec4);
}

/// Everything [`MorphHelper`](crate::MorphHelper) needs from the engine.
pub trait MorphBackend: VertexBufferBackend + RenderableBackend {}

impl<T: VertexBufferBackend + RenderableBackend> MorphBackend for T {}
