//! Common fixtures for morph helper integration tests.
//!
//! Builds small procedural assets with many morph targets and wires them to
//! a [`DummyBackend`].

use std::sync::Arc;

use redlilium_morph::asset::{
    Accessor, AccessorKind, Attribute, AttributeSemantic, Material, Mesh, MorphTarget, Node,
    Primitive, PrimitiveBinding, PrimitiveMode, StaticAsset, UvMap,
};
use redlilium_morph::backend::dummy::DummyBackend;
use redlilium_morph::backend::{IndexBufferHandle, IndexBufferRef};
use redlilium_morph::{Entity, MorphConfig, MorphHelper};

/// Vertices per fixture primitive (two triangles).
pub const VERTEX_COUNT: u32 = 4;
/// Indices per fixture primitive.
pub const INDEX_COUNT: u32 = 6;

/// Install the test logger once.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// A lit quad with normals and one UV set.
pub fn quad(targets: usize) -> Primitive {
    let positions = [
        0.0, 0.0, 0.0, //
        1.0, 0.0, 0.0, //
        1.0, 1.0, 0.0, //
        0.0, 1.0, 0.0f32,
    ];
    let mut primitive = Primitive::new()
        .with_attribute(Attribute::new(
            AttributeSemantic::Position,
            Accessor::from_f32(AccessorKind::Vec3, &positions),
        ))
        .with_attribute(Attribute::new(
            AttributeSemantic::Normal,
            Accessor::from_f32(AccessorKind::Vec3, &[0.0f32, 0.0, 1.0].repeat(4)),
        ))
        .with_attribute(Attribute::new(
            AttributeSemantic::TexCoord,
            Accessor::from_f32(AccessorKind::Vec2, &[0.5f32; 8]),
        ))
        .with_indices(Accessor::from_u32_indices(&[0, 1, 2, 0, 2, 3]))
        .with_material(Material::default());

    for t in 0..targets {
        let delta = [t as f32 * 0.01; 12];
        primitive = primitive.with_target(
            MorphTarget::new()
                .with_attribute(Attribute::new(
                    AttributeSemantic::Position,
                    Accessor::from_f32(AccessorKind::Vec3, &delta),
                ))
                .with_attribute(Attribute::new(
                    AttributeSemantic::Normal,
                    Accessor::from_f32(AccessorKind::Vec3, &[0.0f32; 12]),
                )),
        );
    }
    primitive
}

/// Describes one entity of a fixture asset.
#[derive(Debug, Clone)]
pub struct EntityFixture {
    pub entity: Entity,
    pub targets: usize,
    pub primitives: usize,
    pub mode: PrimitiveMode,
}

impl EntityFixture {
    pub fn new(entity: u32, targets: usize, primitives: usize) -> Self {
        Self {
            entity: Entity::from_raw(entity),
            targets,
            primitives,
            mode: PrimitiveMode::Triangles,
        }
    }

    pub fn with_mode(mut self, mode: PrimitiveMode) -> Self {
        self.mode = mode;
        self
    }
}

/// Build an asset with one mesh node per fixture.
pub fn build_asset(fixtures: &[EntityFixture]) -> StaticAsset {
    let mut asset = StaticAsset::new();
    let mut next_index_buffer = 1000;
    for fixture in fixtures {
        let mut mesh = Mesh::new(&format!("mesh{}", fixture.entity));
        for _ in 0..fixture.primitives {
            mesh = mesh.with_primitive(quad(fixture.targets).with_mode(fixture.mode));
        }
        let mesh_id = asset.add_mesh(mesh);
        for primitive in 0..fixture.primitives {
            next_index_buffer += 1;
            asset.bind_primitive(
                mesh_id,
                primitive,
                PrimitiveBinding {
                    indices: IndexBufferRef::new(
                        IndexBufferHandle::from_raw(next_index_buffer),
                        INDEX_COUNT,
                    ),
                    uv_map: UvMap::standard(),
                },
            );
        }
        asset.add_node(
            Node {
                name: Some(format!("node{}", fixture.entity)),
                mesh: Some(mesh_id),
            },
            fixture.entity,
        );
    }
    asset
}

/// A helper and a backend with a renderable for every fixture.
pub struct TestContext {
    pub helper: MorphHelper<StaticAsset>,
    pub backend: DummyBackend,
}

impl TestContext {
    pub fn new(fixtures: &[EntityFixture]) -> Self {
        Self::with_config(fixtures, MorphConfig::default())
    }

    pub fn with_config(fixtures: &[EntityFixture], config: MorphConfig) -> Self {
        init_logging();
        let mut backend = DummyBackend::new();
        for fixture in fixtures {
            backend.add_renderable(fixture.entity);
        }
        let helper = MorphHelper::new(Arc::new(build_asset(fixtures)), config);
        Self { helper, backend }
    }

    pub fn apply(&mut self, entity: Entity, weights: &[f32]) -> redlilium_morph::MorphResult<()> {
        self.helper.apply_weights(&mut self.backend, entity, weights)
    }

    /// Tear the helper down and return the backend for inspection.
    pub fn teardown(self) -> DummyBackend {
        let Self {
            helper,
            mut backend,
        } = self;
        helper.destroy(&mut backend);
        backend
    }
}

/// Weights with `hot` indices set to decreasing large values and the rest small.
pub fn weights(count: usize, hot: &[usize]) -> Vec<f32> {
    let mut weights = vec![0.01; count];
    for (rank, index) in hot.iter().enumerate() {
        weights[*index] = 0.9 - rank as f32 * 0.1;
    }
    weights
}
