//! Vertex buffer layout types shared between backends

use crate::asset::{AccessorKind, AttributeSemantic, ComponentType, PrimitiveMode};

use super::traits::{IndexBufferHandle, VertexBufferHandle};

/// Number of morph targets the vertex pipeline blends at once.
pub const MAX_MORPH_TARGETS: usize = 4;

/// Semantic meaning of a vertex attribute on the GPU side.
///
/// Semantics are used to match vertex buffer slots with shader inputs.
/// Morph semantics carry the ordinal (0..4) of the blended target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VertexAttributeSemantic {
    Position,
    /// Packed tangent frame (quaternion), replacing normals and tangents.
    Tangents,
    Color,
    Uv0,
    Uv1,
    BoneIndices,
    BoneWeights,
    /// Position delta of the blended target in this ordinal slot.
    MorphPosition(u8),
    /// Tangent frame of the blended target in this ordinal slot.
    MorphTangents(u8),
}

impl VertexAttributeSemantic {
    /// GPU semantic for an asset attribute semantic.
    ///
    /// Normals and tangents both land in the packed tangent frame; texcoords
    /// default to UV0 and are remapped through the primitive's UV map.
    pub fn from_asset(semantic: AttributeSemantic) -> Self {
        match semantic {
            AttributeSemantic::Position => Self::Position,
            AttributeSemantic::Normal | AttributeSemantic::Tangent => Self::Tangents,
            AttributeSemantic::Color => Self::Color,
            AttributeSemantic::TexCoord => Self::Uv0,
            AttributeSemantic::Joints => Self::BoneIndices,
            AttributeSemantic::Weights => Self::BoneWeights,
        }
    }

    /// Position delta semantic for morph ordinal `ordinal`.
    pub fn morph_position(ordinal: usize) -> Self {
        debug_assert!(ordinal < MAX_MORPH_TARGETS);
        Self::MorphPosition(ordinal as u8)
    }

    /// Tangent frame semantic for morph ordinal `ordinal`.
    pub fn morph_tangents(ordinal: usize) -> Self {
        debug_assert!(ordinal < MAX_MORPH_TARGETS);
        Self::MorphTangents(ordinal as u8)
    }
}

/// Element format of a vertex attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementFormat {
    Byte,
    Byte2,
    Byte3,
    Byte4,
    Ubyte,
    Ubyte2,
    Ubyte3,
    Ubyte4,
    Short,
    Short2,
    Short3,
    Short4,
    Ushort,
    Ushort2,
    Ushort3,
    Ushort4,
    Uint,
    Float,
    Float2,
    Float3,
    Float4,
}

impl ElementFormat {
    /// Get the size in bytes of this format.
    pub fn size(&self) -> u32 {
        match self {
            Self::Byte | Self::Ubyte => 1,
            Self::Byte2 | Self::Ubyte2 | Self::Short | Self::Ushort => 2,
            Self::Byte3 | Self::Ubyte3 => 3,
            Self::Byte4 | Self::Ubyte4 | Self::Short2 | Self::Ushort2 => 4,
            Self::Uint | Self::Float => 4,
            Self::Short3 | Self::Ushort3 => 6,
            Self::Short4 | Self::Ushort4 | Self::Float2 => 8,
            Self::Float3 => 12,
            Self::Float4 => 16,
        }
    }

    /// Translate an accessor's cardinality and component type.
    ///
    /// Matrices and non-scalar `u32` data have no vertex format.
    pub fn from_accessor(kind: AccessorKind, component: ComponentType) -> Option<Self> {
        use AccessorKind::*;
        let format = match (component, kind) {
            (ComponentType::I8, Scalar) => Self::Byte,
            (ComponentType::I8, Vec2) => Self::Byte2,
            (ComponentType::I8, Vec3) => Self::Byte3,
            (ComponentType::I8, Vec4) => Self::Byte4,
            (ComponentType::U8, Scalar) => Self::Ubyte,
            (ComponentType::U8, Vec2) => Self::Ubyte2,
            (ComponentType::U8, Vec3) => Self::Ubyte3,
            (ComponentType::U8, Vec4) => Self::Ubyte4,
            (ComponentType::I16, Scalar) => Self::Short,
            (ComponentType::I16, Vec2) => Self::Short2,
            (ComponentType::I16, Vec3) => Self::Short3,
            (ComponentType::I16, Vec4) => Self::Short4,
            (ComponentType::U16, Scalar) => Self::Ushort,
            (ComponentType::U16, Vec2) => Self::Ushort2,
            (ComponentType::U16, Vec3) => Self::Ushort3,
            (ComponentType::U16, Vec4) => Self::Ushort4,
            (ComponentType::U32, Scalar) => Self::Uint,
            (ComponentType::F32, Scalar) => Self::Float,
            (ComponentType::F32, Vec2) => Self::Float2,
            (ComponentType::F32, Vec3) => Self::Float3,
            (ComponentType::F32, Vec4) => Self::Float4,
            _ => return None,
        };
        Some(format)
    }
}

/// Primitive topology
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveTopology {
    PointList,
    LineList,
    LineStrip,
    TriangleList,
    TriangleStrip,
}

impl PrimitiveTopology {
    /// Topology for an asset primitive mode. Loops and fans have no GPU equivalent.
    pub fn from_mode(mode: PrimitiveMode) -> Option<Self> {
        match mode {
            PrimitiveMode::Points => Some(Self::PointList),
            PrimitiveMode::Lines => Some(Self::LineList),
            PrimitiveMode::LineStrip => Some(Self::LineStrip),
            PrimitiveMode::Triangles => Some(Self::TriangleList),
            PrimitiveMode::TriangleStrip => Some(Self::TriangleStrip),
            PrimitiveMode::LineLoop | PrimitiveMode::TriangleFan => None,
        }
    }
}

/// One attribute of a vertex buffer, reading from buffer slot `buffer_index`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VertexBufferAttribute {
    pub semantic: VertexAttributeSemantic,
    pub buffer_index: u32,
    pub format: ElementFormat,
    /// Byte offset within the slot.
    pub offset: u32,
    /// Byte stride between vertices; 0 means tightly packed.
    pub stride: u32,
    pub normalized: bool,
}

impl VertexBufferAttribute {
    /// Create a tightly packed, non-normalized attribute at offset 0.
    pub fn new(
        semantic: VertexAttributeSemantic,
        buffer_index: u32,
        format: ElementFormat,
    ) -> Self {
        Self {
            semantic,
            buffer_index,
            format,
            offset: 0,
            stride: 0,
            normalized: false,
        }
    }

    pub fn with_stride(mut self, stride: u32) -> Self {
        self.stride = stride;
        self
    }

    pub fn with_normalized(mut self, normalized: bool) -> Self {
        self.normalized = normalized;
        self
    }
}

/// Everything a backend needs to build a vertex buffer object.
#[derive(Debug, Clone, Default)]
pub struct VertexBufferDescriptor {
    pub label: Option<String>,
    pub vertex_count: u32,
    pub attributes: Vec<VertexBufferAttribute>,
    /// Number of buffer slots; payloads are bound per slot after the build.
    pub buffer_count: u32,
}

impl VertexBufferDescriptor {
    /// Get an attribute by semantic.
    pub fn attribute(&self, semantic: VertexAttributeSemantic) -> Option<&VertexBufferAttribute> {
        self.attributes.iter().find(|attr| attr.semantic == semantic)
    }

    /// Check if this descriptor has a specific semantic.
    pub fn has_semantic(&self, semantic: VertexAttributeSemantic) -> bool {
        self.attribute(semantic).is_some()
    }
}

/// Geometry assigned to one primitive slot of a renderable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeometryBinding {
    pub topology: PrimitiveTopology,
    pub vertices: VertexBufferHandle,
    pub indices: IndexBufferHandle,
    pub offset: u32,
    pub count: u32,
}
