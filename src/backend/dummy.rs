//! Dummy GPU backend for testing and development.
//!
//! This backend doesn't perform actual GPU operations. It keeps every
//! descriptor and payload it receives so callers can inspect what would
//! have been uploaded, and counts buffer creation and destruction.

use std::collections::HashMap;

use glam::Vec4;

use crate::scene::Entity;

use super::traits::*;
use super::types::{GeometryBinding, VertexBufferDescriptor};

/// A vertex buffer object recorded by the dummy backend.
#[derive(Debug, Clone)]
pub struct DummyVertexBuffer {
    pub descriptor: VertexBufferDescriptor,
    /// Payload bound to each slot, `None` while unbound.
    pub slots: Vec<Option<Vec<u8>>>,
}

/// Geometry and weights last assigned to a renderable.
#[derive(Debug, Clone, Default)]
pub struct DummyRenderable {
    pub geometry: Vec<Option<GeometryBinding>>,
    pub weights: Vec4,
}

/// Dummy GPU backend.
#[derive(Debug, Default)]
pub struct DummyBackend {
    next_id: u64,
    buffers: HashMap<VertexBufferHandle, DummyVertexBuffer>,
    entities: HashMap<Entity, RenderableInstance>,
    renderables: HashMap<RenderableInstance, DummyRenderable>,
    created: usize,
    destroyed: usize,
    invalid_destroys: usize,
    geometry_updates: usize,
    build_budget: Option<usize>,
}

impl DummyBackend {
    /// Create a new dummy backend.
    pub fn new() -> Self {
        Self::default()
    }

    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    /// Give `entity` a renderable instance.
    pub fn add_renderable(&mut self, entity: Entity) -> RenderableInstance {
        if let Some(renderable) = self.entities.get(&entity) {
            return *renderable;
        }
        let renderable = RenderableInstance::from_raw(self.next_id());
        self.entities.insert(entity, renderable);
        self.renderables.insert(renderable, DummyRenderable::default());
        renderable
    }

    /// Let `count` more builds succeed, then fail with [`BackendError::OutOfMemory`].
    pub fn fail_builds_after(&mut self, count: usize) {
        self.build_budget = Some(count);
    }

    /// Look up a live vertex buffer.
    pub fn vertex_buffer(&self, handle: VertexBufferHandle) -> Option<&DummyVertexBuffer> {
        self.buffers.get(&handle)
    }

    /// State of the renderable belonging to `entity`.
    pub fn renderable_state(&self, entity: Entity) -> Option<&DummyRenderable> {
        self.entities
            .get(&entity)
            .and_then(|renderable| self.renderables.get(renderable))
    }

    /// Number of vertex buffers built and not yet destroyed.
    pub fn live_buffer_count(&self) -> usize {
        self.buffers.len()
    }

    pub fn created_count(&self) -> usize {
        self.created
    }

    pub fn destroyed_count(&self) -> usize {
        self.destroyed
    }

    /// Destroy calls for handles that were unknown or already destroyed.
    pub fn invalid_destroy_count(&self) -> usize {
        self.invalid_destroys
    }

    /// Total number of `set_geometry_at` calls.
    pub fn geometry_update_count(&self) -> usize {
        self.geometry_updates
    }
}

impl VertexBufferBackend for DummyBackend {
    fn build_vertex_buffer(
        &mut self,
        desc: &VertexBufferDescriptor,
    ) -> BackendResult<VertexBufferHandle> {
        if let Some(budget) = self.build_budget.as_mut() {
            if *budget == 0 {
                return Err(BackendError::OutOfMemory);
            }
            *budget -= 1;
        }
        log::trace!(
            "DummyBackend: building vertex buffer {:?} ({} vertices, {} slots)",
            desc.label,
            desc.vertex_count,
            desc.buffer_count
        );
        let handle = VertexBufferHandle::from_raw(self.next_id());
        self.buffers.insert(
            handle,
            DummyVertexBuffer {
                descriptor: desc.clone(),
                slots: vec![None; desc.buffer_count as usize],
            },
        );
        self.created += 1;
        Ok(handle)
    }

    fn set_buffer_at(
        &mut self,
        buffer: VertexBufferHandle,
        slot: u32,
        data: Vec<u8>,
    ) -> BackendResult<()> {
        let entry = self
            .buffers
            .get_mut(&buffer)
            .ok_or(BackendError::InvalidHandle(buffer.raw()))?;
        let buffer_count = entry.slots.len() as u32;
        let target = entry
            .slots
            .get_mut(slot as usize)
            .ok_or(BackendError::SlotOutOfRange { slot, buffer_count })?;
        log::trace!(
            "DummyBackend: set_buffer_at {:?} slot={} len={}",
            buffer,
            slot,
            data.len()
        );
        *target = Some(data);
        Ok(())
    }

    fn destroy_vertex_buffer(&mut self, buffer: VertexBufferHandle) {
        if self.buffers.remove(&buffer).is_some() {
            self.destroyed += 1;
        } else {
            log::error!("DummyBackend: destroying unknown vertex buffer {:?}", buffer);
            self.invalid_destroys += 1;
        }
    }
}

impl RenderableBackend for DummyBackend {
    fn renderable(&self, entity: Entity) -> Option<RenderableInstance> {
        self.entities.get(&entity).copied()
    }

    fn set_geometry_at(
        &mut self,
        renderable: RenderableInstance,
        primitive_index: usize,
        geometry: &GeometryBinding,
    ) {
        self.geometry_updates += 1;
        if let Some(state) = self.renderables.get_mut(&renderable) {
            if state.geometry.len() <= primitive_index {
                state.geometry.resize(primitive_index + 1, None);
            }
            state.geometry[primitive_index] = Some(*geometry);
        }
    }

    fn set_morph_weights(&mut self, renderable: RenderableInstance, weights: Vec4) {
        if let Some(state) = self.renderables.get_mut(&renderable) {
            state.weights = weights;
        }
    }
}
