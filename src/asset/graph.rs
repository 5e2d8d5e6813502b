//! Asset graph provider interface.
//!
//! Asset loading populates nodes, meshes, and the per-primitive GPU state
//! (index buffers and UV maps) before a [`MorphHelper`](crate::MorphHelper)
//! is created. The helper only reads from the graph.

use std::collections::HashMap;

use crate::backend::IndexBufferRef;
use crate::scene::Entity;

use super::primitive::{Mesh, UvMap};

/// Index of a node in the asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

/// Index of a mesh in the asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MeshId(pub usize);

/// A scene node as seen by the morph helper.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Node {
    pub name: Option<String>,
    pub mesh: Option<MeshId>,
}

/// GPU state created for a primitive at load time.
#[derive(Debug, Clone, Copy)]
pub struct PrimitiveBinding {
    /// Index buffer shared by every vertex buffer variant of the primitive.
    pub indices: IndexBufferRef,
    /// Texcoord routing chosen by the material provider.
    pub uv_map: UvMap,
}

/// Read access to a loaded asset.
pub trait AssetGraph {
    /// Node to entity mapping.
    ///
    /// Instanced assets return the mapping of their first instance.
    fn node_map(&self) -> &HashMap<NodeId, Entity>;

    /// Look up a node.
    fn node(&self, id: NodeId) -> Option<&Node>;

    /// Look up a mesh.
    fn mesh(&self, id: MeshId) -> Option<&Mesh>;

    /// GPU state of primitive `primitive` of mesh `mesh`.
    fn primitive_binding(&self, mesh: MeshId, primitive: usize) -> Option<&PrimitiveBinding>;
}

/// An in-memory asset graph.
///
/// Useful when meshes are produced procedurally, and as a fixture in tests.
#[derive(Debug, Default)]
pub struct StaticAsset {
    nodes: Vec<Node>,
    meshes: Vec<Mesh>,
    bindings: HashMap<(MeshId, usize), PrimitiveBinding>,
    node_map: HashMap<NodeId, Entity>,
}

impl StaticAsset {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a mesh and return its id.
    pub fn add_mesh(&mut self, mesh: Mesh) -> MeshId {
        self.meshes.push(mesh);
        MeshId(self.meshes.len() - 1)
    }

    /// Register the GPU state of one primitive of `mesh`.
    pub fn bind_primitive(&mut self, mesh: MeshId, primitive: usize, binding: PrimitiveBinding) {
        self.bindings.insert((mesh, primitive), binding);
    }

    /// Add a node and map it to `entity`.
    pub fn add_node(&mut self, node: Node, entity: Entity) -> NodeId {
        self.nodes.push(node);
        let id = NodeId(self.nodes.len() - 1);
        self.node_map.insert(id, entity);
        id
    }
}

impl AssetGraph for StaticAsset {
    fn node_map(&self) -> &HashMap<NodeId, Entity> {
        &self.node_map
    }

    fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    fn mesh(&self, id: MeshId) -> Option<&Mesh> {
        self.meshes.get(id.0)
    }

    fn primitive_binding(&self, mesh: MeshId, primitive: usize) -> Option<&PrimitiveBinding> {
        self.bindings.get(&(mesh, primitive))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::IndexBufferHandle;

    #[test]
    fn test_static_asset_lookup() {
        let mut asset = StaticAsset::new();
        let mesh = asset.add_mesh(Mesh::new("face"));
        let node = asset.add_node(
            Node {
                name: Some("head".into()),
                mesh: Some(mesh),
            },
            Entity::from_raw(3),
        );
        asset.bind_primitive(
            mesh,
            0,
            PrimitiveBinding {
                indices: IndexBufferRef::new(IndexBufferHandle::from_raw(9), 36),
                uv_map: UvMap::standard(),
            },
        );

        assert_eq!(asset.node_map().get(&node), Some(&Entity::from_raw(3)));
        assert_eq!(asset.node(node).and_then(|n| n.mesh), Some(mesh));
        assert_eq!(asset.mesh(mesh).and_then(|m| m.name.as_deref()), Some("face"));
        assert_eq!(
            asset.primitive_binding(mesh, 0).map(|b| b.indices.index_count()),
            Some(36)
        );
        assert!(asset.primitive_binding(mesh, 1).is_none());
    }
}
