//! Mesh primitives as produced by asset loading.

use super::accessor::Accessor;

/// Semantic of a mesh attribute, as declared by the interchange format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeSemantic {
    Position,
    Normal,
    Tangent,
    Color,
    TexCoord,
    Joints,
    Weights,
}

/// A named attribute of a primitive or a morph target.
///
/// `set` distinguishes multiple sets of the same semantic (`TEXCOORD_1`).
#[derive(Debug, Clone)]
pub struct Attribute {
    pub semantic: AttributeSemantic,
    pub set: u32,
    pub accessor: Option<Accessor>,
}

impl Attribute {
    pub fn new(semantic: AttributeSemantic, accessor: Accessor) -> Self {
        Self {
            semantic,
            set: 0,
            accessor: Some(accessor),
        }
    }

    /// Set the attribute set index.
    pub fn with_set(mut self, set: u32) -> Self {
        self.set = set;
        self
    }
}

/// Per-vertex deltas of one blend shape.
#[derive(Debug, Clone, Default)]
pub struct MorphTarget {
    pub attributes: Vec<Attribute>,
}

impl MorphTarget {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_attribute(mut self, attribute: Attribute) -> Self {
        self.attributes.push(attribute);
        self
    }

    /// The accessor for `semantic`, if the target carries it.
    pub fn accessor(&self, semantic: AttributeSemantic) -> Option<&Accessor> {
        self.attributes
            .iter()
            .find(|attr| attr.semantic == semantic)
            .and_then(|attr| attr.accessor.as_ref())
    }
}

/// The subset of material state that affects vertex buffer contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Material {
    /// Unlit materials never need a tangent frame.
    pub unlit: bool,
}

/// Primitive assembly mode as declared by the interchange format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PrimitiveMode {
    Points,
    Lines,
    LineLoop,
    LineStrip,
    #[default]
    Triangles,
    TriangleStrip,
    TriangleFan,
}

/// One drawable part of a mesh.
#[derive(Debug, Clone, Default)]
pub struct Primitive {
    pub mode: PrimitiveMode,
    pub attributes: Vec<Attribute>,
    pub targets: Vec<MorphTarget>,
    pub indices: Option<Accessor>,
    pub material: Option<Material>,
}

impl Primitive {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_mode(mut self, mode: PrimitiveMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_attribute(mut self, attribute: Attribute) -> Self {
        self.attributes.push(attribute);
        self
    }

    pub fn with_target(mut self, target: MorphTarget) -> Self {
        self.targets.push(target);
        self
    }

    pub fn with_indices(mut self, indices: Accessor) -> Self {
        self.indices = Some(indices);
        self
    }

    pub fn with_material(mut self, material: Material) -> Self {
        self.material = Some(material);
        self
    }

    /// The accessor of the first attribute with `semantic` (set 0).
    pub fn accessor(&self, semantic: AttributeSemantic) -> Option<&Accessor> {
        self.attributes
            .iter()
            .find(|attr| attr.semantic == semantic && attr.set == 0)
            .and_then(|attr| attr.accessor.as_ref())
    }

    /// Vertex count, taken from the first attribute that has data.
    pub fn vertex_count(&self) -> Option<u32> {
        self.attributes
            .iter()
            .find_map(|attr| attr.accessor.as_ref())
            .map(Accessor::count)
    }

    /// Whether the primitive is shaded with lighting and thus needs tangents.
    pub fn is_lit(&self) -> bool {
        self.material.is_some_and(|material| !material.unlit)
    }
}

/// A mesh: an ordered list of primitives sharing one node transform.
#[derive(Debug, Clone, Default)]
pub struct Mesh {
    pub name: Option<String>,
    pub primitives: Vec<Primitive>,
}

impl Mesh {
    pub fn new(name: &str) -> Self {
        Self {
            name: Some(name.to_string()),
            primitives: Vec::new(),
        }
    }

    pub fn with_primitive(mut self, primitive: Primitive) -> Self {
        self.primitives.push(primitive);
        self
    }
}

/// Number of texcoord sets a [`UvMap`] can classify.
pub const UV_MAP_SIZE: usize = 8;

/// Where a texcoord set ends up in the shading pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum UvSet {
    #[default]
    Unused,
    Uv0,
    Uv1,
}

/// Maps texcoord set indices of a primitive to the two UV slots materials read.
///
/// Built by the material provider during loading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UvMap(pub [UvSet; UV_MAP_SIZE]);

impl UvMap {
    /// A map that routes set 0 to UV0 and set 1 to UV1.
    pub fn standard() -> Self {
        let mut map = Self::default();
        map.0[0] = UvSet::Uv0;
        map.0[1] = UvSet::Uv1;
        map
    }

    /// Classification of texcoord `set`, or `None` past the end of the map.
    pub fn get(&self, set: u32) -> Option<UvSet> {
        self.0.get(set as usize).copied()
    }

    /// Number of texcoord sets routed to a UV slot.
    pub fn active_sets(&self) -> usize {
        self.0.iter().filter(|set| **set != UvSet::Unused).count()
    }
}
