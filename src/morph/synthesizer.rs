//! Vertex buffer synthesis for one combination of blended morph targets.
//!
//! Each variant is a standalone, non-interleaved vertex buffer: every
//! attribute gets its own slot holding a private copy of the source bytes.
//! Attributes that don't change between variants (UVs, colors, skinning) are
//! therefore duplicated across variants.
//!
//! # Slot Assignment
//!
//! Slots are assigned in this order:
//!
//! 1. Base attributes of the primitive, in declaration order. Normals become a
//!    regenerated tangent frame; raw tangents are dropped; texcoords are routed
//!    through the primitive's [`UvMap`].
//! 2. A flat tangent frame, when the primitive is lit but has no normals.
//! 3. Per blended target (ordinal 0..4): its tangent frame and position delta.
//! 4. One shared dummy slot backing every missing UV0, UV1, and COLOR attribute.

use crate::asset::{Accessor, AttributeSemantic, Primitive, UvMap, UvSet};
use crate::backend::{
    ElementFormat, OwnedVertexBuffer, VertexAttributeSemantic, VertexBufferAttribute,
    VertexBufferBackend, VertexBufferDescriptor, VertexBufferHandle,
};
use crate::error::{MorphError, MorphResult};
use crate::tangents::{TangentRequest, TangentService};
use crate::MorphConfig;

use super::key::PrimaryIndices;

/// Bytes per vertex of the dummy buffer (one `ubyte4`, the widest dummy format).
const DUMMY_VERTEX_SIZE: usize = 4;

/// Descriptor and per-slot payloads of a vertex buffer that hasn't been built yet.
#[derive(Debug, Clone)]
pub struct PreparedVertexBuffer {
    pub descriptor: VertexBufferDescriptor,
    /// Bytes for each slot; `None` leaves the slot unbound.
    pub payloads: Vec<Option<Vec<u8>>>,
}

/// Attribute descriptors plus matching slot payloads, built incrementally.
#[derive(Debug, Default)]
struct SlotList {
    attributes: Vec<VertexBufferAttribute>,
    payloads: Vec<Option<Vec<u8>>>,
}

impl SlotList {
    fn next_slot(&self) -> u32 {
        self.payloads.len() as u32
    }

    fn push(&mut self, attribute: VertexBufferAttribute, payload: Vec<u8>) {
        debug_assert_eq!(attribute.buffer_index, self.next_slot());
        log::trace!(
            "slot {}: {:?} {:?} ({} bytes)",
            attribute.buffer_index,
            attribute.semantic,
            attribute.format,
            payload.len()
        );
        self.attributes.push(attribute);
        self.payloads.push(if payload.is_empty() { None } else { Some(payload) });
    }

    fn push_tangents(&mut self, semantic: VertexAttributeSemantic, data: Vec<u8>) {
        let attribute =
            VertexBufferAttribute::new(semantic, self.next_slot(), ElementFormat::Short4)
                .with_normalized(true);
        self.push(attribute, data);
    }

    /// Bind a deep copy of the accessor's bytes with its native format.
    fn push_accessor(
        &mut self,
        semantic: VertexAttributeSemantic,
        accessor: &Accessor,
    ) -> MorphResult<()> {
        let format = ElementFormat::from_accessor(accessor.kind(), accessor.component_type())
            .ok_or(MorphError::UnsupportedElementFormat {
                kind: accessor.kind(),
                component: accessor.component_type(),
            })?;
        let attribute = VertexBufferAttribute::new(semantic, self.next_slot(), format)
            .with_stride(accessor.stride() as u32)
            .with_normalized(accessor.normalized());
        let bytes = accessor.binding_bytes()?.to_vec();
        self.push(attribute, bytes);
        Ok(())
    }

    /// Point every semantic in `missing` at one shared slot of dummy data.
    fn push_dummy(&mut self, missing: &[(VertexAttributeSemantic, ElementFormat)], data: Vec<u8>) {
        if missing.is_empty() {
            return;
        }
        let slot = self.next_slot();
        for (semantic, format) in missing {
            log::trace!("slot {slot}: dummy {semantic:?} {format:?}");
            self.attributes.push(
                VertexBufferAttribute::new(*semantic, slot, *format).with_normalized(true),
            );
        }
        self.payloads.push(Some(data));
    }
}

/// Builds vertex buffer variants for specific sets of blended morph targets.
#[derive(Debug, Clone)]
pub struct VertexBufferSynthesizer {
    max_buffer_count: usize,
    dummy_fill: u8,
}

impl VertexBufferSynthesizer {
    pub fn new(config: &MorphConfig) -> Self {
        Self {
            max_buffer_count: config.max_buffer_count,
            dummy_fill: config.dummy_fill,
        }
    }

    /// Lay out the vertex buffer for `primitive` blended with `primary`.
    ///
    /// Calls the tangent service once per tangent frame slot.
    pub fn prepare(
        &self,
        tangents: &mut dyn TangentService,
        primitive: &Primitive,
        uv_map: &UvMap,
        primary: PrimaryIndices,
    ) -> MorphResult<PreparedVertexBuffer> {
        let vertex_count = primitive.vertex_count().ok_or(MorphError::NoVertexData)?;

        let mut slots = SlotList::default();
        let mut has_uv0 = false;
        let mut has_uv1 = false;
        let mut has_color = false;
        let mut has_normals = false;

        for attribute in &primitive.attributes {
            match attribute.semantic {
                AttributeSemantic::Tangent => continue,
                AttributeSemantic::Normal => {
                    let frames = tangents.compute(&TangentRequest {
                        primitive,
                        morph_target: None,
                    })?;
                    slots.push_tangents(VertexAttributeSemantic::Tangents, frames.data);
                    has_normals = true;
                    continue;
                }
                AttributeSemantic::Color => has_color = true,
                _ => {}
            }

            let mut semantic = VertexAttributeSemantic::from_asset(attribute.semantic);
            if attribute.semantic == AttributeSemantic::TexCoord {
                let Some(uv_set) = uv_map.get(attribute.set) else {
                    log::warn!("ignoring texcoord set {} beyond the uv map", attribute.set);
                    continue;
                };
                match uv_set {
                    UvSet::Uv0 => {
                        semantic = VertexAttributeSemantic::Uv0;
                        has_uv0 = true;
                    }
                    UvSet::Uv1 => {
                        semantic = VertexAttributeSemantic::Uv1;
                        has_uv1 = true;
                    }
                    // Unclassified sets: promote the first one when the map routes nothing.
                    UvSet::Unused if !has_uv0 && uv_map.active_sets() == 0 => {
                        semantic = VertexAttributeSemantic::Uv0;
                        has_uv0 = true;
                    }
                    UvSet::Unused => continue,
                }
            }

            let accessor = attribute
                .accessor
                .as_ref()
                .ok_or(MorphError::MissingAccessor(attribute.semantic))?;
            slots.push_accessor(semantic, accessor)?;
        }

        if primitive.is_lit() && !has_normals {
            let frames = tangents.compute(&TangentRequest {
                primitive,
                morph_target: None,
            })?;
            slots.push_tangents(VertexAttributeSemantic::Tangents, frames.data);
        }

        for (ordinal, target_index) in primary.iter().enumerate() {
            let target = primitive.targets.get(target_index as usize).ok_or(
                MorphError::MorphTargetOutOfRange {
                    target: target_index,
                    available: primitive.targets.len(),
                },
            )?;
            for attribute in &target.attributes {
                match attribute.semantic {
                    AttributeSemantic::Tangent => {}
                    AttributeSemantic::Normal => {
                        let frames = tangents.compute(&TangentRequest {
                            primitive,
                            morph_target: Some(target_index),
                        })?;
                        slots.push_tangents(
                            VertexAttributeSemantic::morph_tangents(ordinal),
                            frames.data,
                        );
                    }
                    _ => {
                        let accessor = attribute
                            .accessor
                            .as_ref()
                            .ok_or(MorphError::MissingAccessor(attribute.semantic))?;
                        slots.push_accessor(
                            VertexAttributeSemantic::morph_position(ordinal),
                            accessor,
                        )?;
                    }
                }
            }
        }

        // Assumes the worst case: every material variant may read UV0, UV1, and COLOR.
        let mut missing = Vec::new();
        if !has_uv0 {
            missing.push((VertexAttributeSemantic::Uv0, ElementFormat::Ushort2));
        }
        if !has_uv1 {
            missing.push((VertexAttributeSemantic::Uv1, ElementFormat::Ushort2));
        }
        if !has_color {
            missing.push((VertexAttributeSemantic::Color, ElementFormat::Ubyte4));
        }
        let dummy = vec![self.dummy_fill; DUMMY_VERTEX_SIZE * vertex_count as usize];
        slots.push_dummy(&missing, dummy);

        let SlotList {
            attributes,
            payloads,
        } = slots;
        if payloads.len() > self.max_buffer_count {
            return Err(MorphError::TooManyBuffers {
                count: payloads.len(),
                max: self.max_buffer_count,
            });
        }
        let referenced = attributes
            .iter()
            .map(|attr| attr.buffer_index as usize + 1)
            .max()
            .unwrap_or(0);
        if referenced != payloads.len() {
            return Err(MorphError::SlotMismatch {
                attributes: referenced,
                payloads: payloads.len(),
            });
        }

        Ok(PreparedVertexBuffer {
            descriptor: VertexBufferDescriptor {
                label: None,
                vertex_count,
                attributes,
                buffer_count: payloads.len() as u32,
            },
            payloads,
        })
    }

    /// Issue the build call and upload every bound slot.
    ///
    /// On upload failure the half-initialized buffer is destroyed.
    pub fn build<B: VertexBufferBackend + ?Sized>(
        &self,
        backend: &mut B,
        prepared: PreparedVertexBuffer,
    ) -> MorphResult<OwnedVertexBuffer> {
        let buffer = OwnedVertexBuffer::new(backend.build_vertex_buffer(&prepared.descriptor)?);
        if let Err(err) = upload(backend, buffer.handle(), prepared.payloads) {
            buffer.destroy(backend);
            return Err(err);
        }
        Ok(buffer)
    }

    /// [`prepare`](Self::prepare) followed by [`build`](Self::build).
    pub fn synthesize<B: VertexBufferBackend + ?Sized>(
        &self,
        backend: &mut B,
        tangents: &mut dyn TangentService,
        primitive: &Primitive,
        uv_map: &UvMap,
        primary: PrimaryIndices,
        label: Option<String>,
    ) -> MorphResult<OwnedVertexBuffer> {
        let mut prepared = self.prepare(tangents, primitive, uv_map, primary)?;
        prepared.descriptor.label = label;
        self.build(backend, prepared)
    }
}

fn upload<B: VertexBufferBackend + ?Sized>(
    backend: &mut B,
    handle: VertexBufferHandle,
    payloads: Vec<Option<Vec<u8>>>,
) -> MorphResult<()> {
    for (slot, payload) in payloads.into_iter().enumerate() {
        if let Some(data) = payload {
            backend.set_buffer_at(handle, slot as u32, data)?;
        }
    }
    Ok(())
}
