//! Typed views over raw vertex and index data.

use std::sync::Arc;

use glam::{Vec3, Vec4};

use crate::error::{MorphError, MorphResult};

/// Scalar type of each accessor component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentType {
    I8,
    U8,
    I16,
    U16,
    U32,
    F32,
}

impl ComponentType {
    /// Size in bytes of one component.
    pub fn size(&self) -> usize {
        match self {
            Self::I8 | Self::U8 => 1,
            Self::I16 | Self::U16 => 2,
            Self::U32 | Self::F32 => 4,
        }
    }
}

/// Number of components per element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccessorKind {
    Scalar,
    Vec2,
    Vec3,
    Vec4,
    Mat2,
    Mat3,
    Mat4,
}

impl AccessorKind {
    pub fn components(&self) -> usize {
        match self {
            Self::Scalar => 1,
            Self::Vec2 => 2,
            Self::Vec3 => 3,
            Self::Vec4 | Self::Mat2 => 4,
            Self::Mat3 => 9,
            Self::Mat4 => 16,
        }
    }
}

/// A view of `count` elements inside a shared byte buffer.
///
/// The buffer is shared with the asset; vertex buffer synthesis copies the
/// bound range out of it.
#[derive(Debug, Clone)]
pub struct Accessor {
    buffer: Arc<[u8]>,
    byte_offset: usize,
    byte_stride: Option<usize>,
    count: u32,
    kind: AccessorKind,
    component_type: ComponentType,
    normalized: bool,
}

impl Accessor {
    /// Create an accessor reading tightly packed elements from the start of `buffer`.
    pub fn new(
        buffer: Arc<[u8]>,
        kind: AccessorKind,
        component_type: ComponentType,
        count: u32,
    ) -> Self {
        Self {
            buffer,
            byte_offset: 0,
            byte_stride: None,
            count,
            kind,
            component_type,
            normalized: false,
        }
    }

    /// Create a float accessor owning a copy of `values`.
    pub fn from_f32(kind: AccessorKind, values: &[f32]) -> Self {
        let count = (values.len() / kind.components()) as u32;
        let bytes: Arc<[u8]> = Arc::from(bytemuck::cast_slice::<f32, u8>(values));
        Self::new(bytes, kind, ComponentType::F32, count)
    }

    /// Create a scalar `u32` index accessor owning a copy of `indices`.
    pub fn from_u32_indices(indices: &[u32]) -> Self {
        let bytes: Arc<[u8]> = Arc::from(bytemuck::cast_slice::<u32, u8>(indices));
        Self::new(
            bytes,
            AccessorKind::Scalar,
            ComponentType::U32,
            indices.len() as u32,
        )
    }

    /// Set the byte offset of the first element.
    pub fn with_offset(mut self, byte_offset: usize) -> Self {
        self.byte_offset = byte_offset;
        self
    }

    /// Set an explicit byte stride between elements (interleaved data).
    pub fn with_stride(mut self, byte_stride: usize) -> Self {
        self.byte_stride = Some(byte_stride);
        self
    }

    /// Mark integer components as normalized.
    pub fn with_normalized(mut self, normalized: bool) -> Self {
        self.normalized = normalized;
        self
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn kind(&self) -> AccessorKind {
        self.kind
    }

    pub fn component_type(&self) -> ComponentType {
        self.component_type
    }

    pub fn normalized(&self) -> bool {
        self.normalized
    }

    /// Size in bytes of one element.
    pub fn element_size(&self) -> usize {
        self.kind.components() * self.component_type.size()
    }

    /// Distance in bytes between consecutive elements.
    pub fn stride(&self) -> usize {
        self.byte_stride.unwrap_or_else(|| self.element_size())
    }

    /// Byte offset of the first element within the buffer.
    pub fn binding_offset(&self) -> usize {
        self.byte_offset
    }

    /// Number of bytes a vertex buffer slot needs to cover every element.
    ///
    /// The last element only contributes its own size, not a full stride.
    pub fn binding_size(&self) -> usize {
        if self.count == 0 {
            return 0;
        }
        self.stride() * (self.count as usize - 1) + self.element_size()
    }

    /// The bytes covered by this accessor.
    pub fn binding_bytes(&self) -> MorphResult<&[u8]> {
        let offset = self.binding_offset();
        let end = offset + self.binding_size();
        self.buffer
            .get(offset..end)
            .ok_or(MorphError::AccessorOutOfBounds {
                offset,
                end,
                len: self.buffer.len(),
            })
    }

    fn element(&self, index: u32) -> MorphResult<&[u8]> {
        let offset = self.byte_offset + self.stride() * index as usize;
        let end = offset + self.element_size();
        self.buffer
            .get(offset..end)
            .ok_or(MorphError::AccessorOutOfBounds {
                offset,
                end,
                len: self.buffer.len(),
            })
    }

    fn read_f32s<const N: usize>(&self, index: u32) -> MorphResult<[f32; N]> {
        if self.component_type != ComponentType::F32 || self.kind.components() < N {
            return Err(MorphError::UnsupportedElementFormat {
                kind: self.kind,
                component: self.component_type,
            });
        }
        let bytes = self.element(index)?;
        let mut out = [0.0f32; N];
        for (i, value) in out.iter_mut().enumerate() {
            *value = bytemuck::pod_read_unaligned(&bytes[i * 4..i * 4 + 4]);
        }
        Ok(out)
    }

    /// Read element `index` as a float3.
    pub fn read_vec3(&self, index: u32) -> MorphResult<Vec3> {
        self.read_f32s::<3>(index).map(Vec3::from_array)
    }

    /// Read element `index` as a float4.
    pub fn read_vec4(&self, index: u32) -> MorphResult<Vec4> {
        self.read_f32s::<4>(index).map(Vec4::from_array)
    }

    /// Read element `index` of a scalar index accessor.
    pub fn read_index(&self, index: u32) -> MorphResult<u32> {
        let bytes = self.element(index)?;
        match (self.kind, self.component_type) {
            (AccessorKind::Scalar, ComponentType::U8) => Ok(bytes[0] as u32),
            (AccessorKind::Scalar, ComponentType::U16) => {
                Ok(bytemuck::pod_read_unaligned::<u16>(bytes) as u32)
            }
            (AccessorKind::Scalar, ComponentType::U32) => {
                Ok(bytemuck::pod_read_unaligned::<u32>(bytes))
            }
            _ => Err(MorphError::UnsupportedElementFormat {
                kind: self.kind,
                component: self.component_type,
            }),
        }
    }
}
