//! Tangent frame generation.
//!
//! Lit shading consumes one packed quaternion per vertex instead of separate
//! normal and tangent attributes. The frame is stored as four snorm `i16`
//! components (`short4`), with the sign of `w` encoding the bitangent
//! handedness.
//!
//! [`TangentService`] is called synchronously from vertex buffer synthesis.
//! Implementations are free to batch or cache internally.

use glam::{Mat3, Quat, Vec3, Vec4};

use crate::asset::{AttributeSemantic, Primitive, PrimitiveMode};
use crate::error::{MorphError, MorphResult};

/// Size in bytes of one packed tangent frame.
pub const PACKED_FRAME_SIZE: usize = 8;

/// Input of a tangent computation.
#[derive(Debug, Clone, Copy)]
pub struct TangentRequest<'a> {
    pub primitive: &'a Primitive,
    /// Compute the frames of the primitive deformed by this morph target
    /// instead of the base frames.
    pub morph_target: Option<u8>,
}

/// Packed tangent frames, `PACKED_FRAME_SIZE` bytes per vertex.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tangents {
    pub data: Vec<u8>,
    pub vertex_count: u32,
}

/// Computes packed tangent frames for a primitive.
pub trait TangentService {
    fn compute(&mut self, request: &TangentRequest<'_>) -> MorphResult<Tangents>;
}

/// Default [`TangentService`].
///
/// Normals come from the `NORMAL` attribute, or from face normals when the
/// primitive has none. Tangents come from the `TANGENT` attribute when present
/// and are otherwise chosen orthogonal to the normal. Morph-scoped requests add
/// the target's normal and tangent deltas before packing.
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameTangents;

impl TangentService for FrameTangents {
    fn compute(&mut self, request: &TangentRequest<'_>) -> MorphResult<Tangents> {
        let primitive = request.primitive;
        let vertex_count = primitive.vertex_count().ok_or(MorphError::NoVertexData)?;

        let mut normals = match primitive.accessor(AttributeSemantic::Normal) {
            Some(accessor) => (0..vertex_count)
                .map(|i| accessor.read_vec3(i))
                .collect::<MorphResult<Vec<_>>>()?,
            None => flat_normals(primitive, vertex_count)?,
        };
        let mut tangents = primitive
            .accessor(AttributeSemantic::Tangent)
            .map(|accessor| {
                (0..vertex_count)
                    .map(|i| accessor.read_vec4(i))
                    .collect::<MorphResult<Vec<_>>>()
            })
            .transpose()?;

        if let Some(index) = request.morph_target {
            let target = primitive.targets.get(index as usize).ok_or(
                MorphError::MorphTargetOutOfRange {
                    target: index,
                    available: primitive.targets.len(),
                },
            )?;
            if let Some(delta) = target.accessor(AttributeSemantic::Normal) {
                for (i, normal) in normals.iter_mut().enumerate() {
                    *normal += delta.read_vec3(i as u32)?;
                }
            }
            if let (Some(tangents), Some(delta)) =
                (tangents.as_mut(), target.accessor(AttributeSemantic::Tangent))
            {
                for (i, tangent) in tangents.iter_mut().enumerate() {
                    *tangent += delta.read_vec3(i as u32)?.extend(0.0);
                }
            }
        }

        let mut data = Vec::with_capacity(vertex_count as usize * PACKED_FRAME_SIZE);
        for (i, normal) in normals.iter().enumerate() {
            let tangent = tangents.as_ref().map(|t| t[i]);
            let packed = pack_frame(*normal, tangent);
            data.extend_from_slice(bytemuck::cast_slice(&packed));
        }

        Ok(Tangents { data, vertex_count })
    }
}

/// Per-vertex face normals of a triangle list.
///
/// Vertices shared between faces keep the normal of the last face touching
/// them. Non-triangle primitives and unreferenced vertices get +Z.
fn flat_normals(primitive: &Primitive, vertex_count: u32) -> MorphResult<Vec<Vec3>> {
    let mut normals = vec![Vec3::Z; vertex_count as usize];
    if primitive.mode != PrimitiveMode::Triangles {
        return Ok(normals);
    }
    let positions = primitive
        .accessor(AttributeSemantic::Position)
        .ok_or(MorphError::MissingAccessor(AttributeSemantic::Position))?;

    let index_count = primitive
        .indices
        .as_ref()
        .map_or(vertex_count, |indices| indices.count());
    let index = |i: u32| -> MorphResult<u32> {
        match &primitive.indices {
            Some(indices) => indices.read_index(i),
            None => Ok(i),
        }
    };

    for face in 0..index_count / 3 {
        let corners = [index(face * 3)?, index(face * 3 + 1)?, index(face * 3 + 2)?];
        let a = positions.read_vec3(corners[0])?;
        let b = positions.read_vec3(corners[1])?;
        let c = positions.read_vec3(corners[2])?;
        let normal = (b - a).cross(c - a).normalize_or_zero();
        if normal == Vec3::ZERO {
            continue;
        }
        for corner in corners {
            if let Some(slot) = normals.get_mut(corner as usize) {
                *slot = normal;
            }
        }
    }
    Ok(normals)
}

/// Pack a tangent frame into a snorm quaternion.
///
/// `tangent.w` is the bitangent sign as stored in mesh data.
pub fn pack_frame(normal: Vec3, tangent: Option<Vec4>) -> [i16; 4] {
    // Smallest positive snorm16 value; keeps w nonzero so its sign survives.
    const BIAS: f32 = 1.0 / 32767.0;

    let mut n = normal.normalize_or_zero();
    if n == Vec3::ZERO {
        n = Vec3::Z;
    }
    let (t, handedness) = match tangent {
        Some(t) => {
            let xyz = t.truncate();
            ((xyz - n * n.dot(xyz)).normalize_or_zero(), t.w)
        }
        None => (Vec3::ZERO, 1.0),
    };
    let t = if t == Vec3::ZERO {
        n.any_orthonormal_vector()
    } else {
        t
    };
    let b = n.cross(t);

    let mut q = Quat::from_mat3(&Mat3::from_cols(t, b, n)).normalize();
    if q.w < 0.0 {
        q = -q;
    }
    if q.w < BIAS {
        let scale = (1.0 - BIAS * BIAS).sqrt();
        q = Quat::from_xyzw(q.x * scale, q.y * scale, q.z * scale, BIAS);
    }
    if handedness < 0.0 {
        q = -q;
    }

    q.to_array()
        .map(|c| (c.clamp(-1.0, 1.0) * 32767.0).round() as i16)
}
