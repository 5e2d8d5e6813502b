//! Applies morph weights to the renderables of a loaded asset.

use std::collections::HashMap;
use std::sync::Arc;

use crate::asset::{AssetGraph, MeshId, Node, Primitive};
use crate::backend::{MorphBackend, PrimitiveTopology, VertexBufferBackend};
use crate::error::{MorphError, MorphResult};
use crate::scene::Entity;
use crate::tangents::{FrameTangents, TangentService};
use crate::MorphConfig;

use super::cache::{MorphCacheStats, MorphPrimitive, MorphTable, MorphValue};
use super::key::MorphKey;
use super::selector::{Selection, WeightSelector};
use super::synthesizer::VertexBufferSynthesizer;

/// Lets renderables blend any number of morph targets on a pipeline that
/// blends four.
///
/// For models with more than four targets, every call to
/// [`apply_weights`](Self::apply_weights) picks the four most influential
/// targets and binds a vertex buffer variant built for exactly that
/// combination. Variants are cached per entity and combination for the
/// lifetime of the helper. Attribute data that doesn't depend on the
/// combination is duplicated in every variant.
///
/// The helper owns every variant's vertex buffers. Call
/// [`destroy`](Self::destroy) with the backend before dropping it.
pub struct MorphHelper<A: AssetGraph> {
    asset: Arc<A>,
    nodes: HashMap<Entity, Node>,
    selector: WeightSelector,
    synthesizer: VertexBufferSynthesizer,
    tangents: Box<dyn TangentService>,
    table: MorphTable,
    config: MorphConfig,
}

impl<A: AssetGraph> MorphHelper<A> {
    /// Create a helper generating tangent frames with [`FrameTangents`].
    pub fn new(asset: Arc<A>, config: MorphConfig) -> Self {
        Self::with_tangent_service(asset, config, Box::new(FrameTangents))
    }

    /// Create a helper with a custom tangent service.
    pub fn with_tangent_service(
        asset: Arc<A>,
        config: MorphConfig,
        tangents: Box<dyn TangentService>,
    ) -> Self {
        let mut nodes = HashMap::with_capacity(asset.node_map().len());
        for (id, entity) in asset.node_map() {
            match asset.node(*id) {
                Some(node) => {
                    nodes.insert(*entity, node.clone());
                }
                None => log::warn!("node map references missing node {:?}", id),
            }
        }

        Self {
            selector: WeightSelector::new(config.max_weights),
            synthesizer: VertexBufferSynthesizer::new(&config),
            asset,
            nodes,
            tangents,
            table: MorphTable::new(),
            config,
        }
    }

    pub fn asset(&self) -> &Arc<A> {
        &self.asset
    }

    pub fn config(&self) -> &MorphConfig {
        &self.config
    }

    /// Number of cached variants.
    pub fn cache_len(&self) -> usize {
        self.table.len()
    }

    pub fn stats(&self) -> MorphCacheStats {
        self.table.stats()
    }

    /// Apply `weights` (one per morph target) to the renderable of `entity`.
    ///
    /// With four or fewer weights they are written to the weight uniform
    /// directly. Otherwise the four highest weights are blended and the
    /// matching vertex buffer variant is bound to every primitive, building
    /// it first if this combination hasn't been seen for `entity`.
    pub fn apply_weights<B: MorphBackend + ?Sized>(
        &mut self,
        backend: &mut B,
        entity: Entity,
        weights: &[f32],
    ) -> MorphResult<()> {
        let renderable = backend
            .renderable(entity)
            .ok_or(MorphError::MissingRenderable(entity))?;

        let (primary, uniform) = match self.selector.select(weights) {
            Selection::Direct(uniform) => {
                backend.set_morph_weights(renderable, uniform);
                return Ok(());
            }
            Selection::Primary { indices, weights } => (indices, weights),
        };

        let key = MorphKey::new(entity, primary);
        let Self {
            asset,
            nodes,
            synthesizer,
            tangents,
            table,
            config,
            ..
        } = self;
        let value = table.get_or_try_insert_with(key, || {
            let variant = Variant {
                asset: &**asset,
                nodes,
                synthesizer,
                label_buffers: config.label_buffers,
            };
            variant.build(backend, &mut **tangents, key)
        })?;

        for (index, primitive) in value.primitives.iter().enumerate() {
            backend.set_geometry_at(renderable, index, &primitive.geometry());
        }
        backend.set_morph_weights(renderable, uniform);
        Ok(())
    }

    /// Destroy every vertex buffer the helper created.
    pub fn destroy<B: VertexBufferBackend + ?Sized>(mut self, backend: &mut B) {
        let variants = self.table.len();
        let destroyed = self.table.destroy_all(backend);
        log::debug!("destroyed {destroyed} morph vertex buffers across {variants} variants");
    }
}

impl<A: AssetGraph> Drop for MorphHelper<A> {
    fn drop(&mut self) {
        if !self.table.is_empty() {
            log::warn!(
                "MorphHelper dropped without destroy(); leaking {} vertex buffers",
                self.table.buffer_count()
            );
        }
    }
}

/// Everything a cache miss needs, borrowed from the helper.
struct Variant<'a, A> {
    asset: &'a A,
    nodes: &'a HashMap<Entity, Node>,
    synthesizer: &'a VertexBufferSynthesizer,
    label_buffers: bool,
}

impl<A: AssetGraph> Variant<'_, A> {
    /// Build one vertex buffer per primitive of the entity's mesh.
    ///
    /// Buffers built before a failure are destroyed again.
    fn build<B: VertexBufferBackend + ?Sized>(
        &self,
        backend: &mut B,
        tangents: &mut dyn TangentService,
        key: MorphKey,
    ) -> MorphResult<MorphValue> {
        let entity = key.entity;
        let node = self
            .nodes
            .get(&entity)
            .ok_or(MorphError::UnknownEntity(entity))?;
        let mesh_id = node.mesh.ok_or(MorphError::MissingMesh(entity))?;
        let mesh = self
            .asset
            .mesh(mesh_id)
            .ok_or(MorphError::MissingMesh(entity))?;

        log::debug!(
            "building morph variant for entity {} with targets {:?} ({} primitives)",
            entity,
            key.primary,
            mesh.primitives.len()
        );

        let mut value = MorphValue {
            primitives: Vec::with_capacity(mesh.primitives.len()),
        };
        for (index, primitive) in mesh.primitives.iter().enumerate() {
            match self.build_primitive(backend, tangents, key, mesh_id, index, primitive) {
                Ok(primitive) => value.primitives.push(primitive),
                Err(err) => {
                    let released = value.destroy(backend);
                    log::debug!("morph variant failed, released {released} vertex buffers");
                    return Err(err);
                }
            }
        }
        Ok(value)
    }

    fn build_primitive<B: VertexBufferBackend + ?Sized>(
        &self,
        backend: &mut B,
        tangents: &mut dyn TangentService,
        key: MorphKey,
        mesh_id: MeshId,
        index: usize,
        primitive: &Primitive,
    ) -> MorphResult<MorphPrimitive> {
        let binding = self
            .asset
            .primitive_binding(mesh_id, index)
            .ok_or(MorphError::MissingPrimitiveBinding { primitive: index })?;
        let topology = PrimitiveTopology::from_mode(primitive.mode)
            .ok_or(MorphError::UnsupportedTopology(primitive.mode))?;

        let label = self
            .label_buffers
            .then(|| format!("morph:{}:{}", key.entity, index));
        let vertices = self.synthesizer.synthesize(
            backend,
            tangents,
            primitive,
            &binding.uv_map,
            key.primary,
            label,
        )?;

        Ok(MorphPrimitive {
            vertices,
            indices: binding.indices,
            topology,
        })
    }
}
