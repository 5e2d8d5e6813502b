//! Storage for synthesized vertex buffer variants.
//!
//! Entries are created lazily and live until [`MorphTable::destroy_all`].
//! There is no eviction.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use crate::backend::{
    GeometryBinding, IndexBufferRef, OwnedVertexBuffer, PrimitiveTopology, VertexBufferBackend,
};
use crate::error::MorphResult;

use super::key::MorphKey;

/// Geometry of one primitive of a cached variant.
#[derive(Debug)]
pub struct MorphPrimitive {
    /// Owned by the table, destroyed at teardown.
    pub vertices: OwnedVertexBuffer,
    /// Borrowed from the asset.
    pub indices: IndexBufferRef,
    pub topology: PrimitiveTopology,
}

impl MorphPrimitive {
    /// Binding that draws the whole index range.
    pub fn geometry(&self) -> GeometryBinding {
        GeometryBinding {
            topology: self.topology,
            vertices: self.vertices.handle(),
            indices: self.indices.handle(),
            offset: 0,
            count: self.indices.index_count(),
        }
    }
}

/// One cached variant: a record per mesh primitive, in mesh order.
#[derive(Debug, Default)]
pub struct MorphValue {
    pub primitives: Vec<MorphPrimitive>,
}

impl MorphValue {
    /// Destroy every owned vertex buffer, returning how many were destroyed.
    pub fn destroy<B: VertexBufferBackend + ?Sized>(self, backend: &mut B) -> usize {
        let count = self.primitives.len();
        for primitive in self.primitives {
            primitive.vertices.destroy(backend);
        }
        count
    }
}

/// Lookup counters of a [`MorphTable`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MorphCacheStats {
    pub hits: u64,
    pub misses: u64,
    /// Vertex buffers inserted into the table over its lifetime.
    pub buffers_created: u64,
}

/// Vertex buffer variants keyed by entity and primary target indices.
#[derive(Debug, Default)]
pub struct MorphTable {
    entries: HashMap<MorphKey, MorphValue>,
    stats: MorphCacheStats,
}

impl MorphTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> MorphCacheStats {
        self.stats
    }

    /// Number of owned vertex buffers across all entries.
    pub fn buffer_count(&self) -> usize {
        self.entries.values().map(|value| value.primitives.len()).sum()
    }

    /// Return the entry for `key`, creating it with `create` on a miss.
    ///
    /// If `create` fails nothing is inserted; `create` is responsible for
    /// releasing whatever it built before failing.
    pub fn get_or_try_insert_with<F>(
        &mut self,
        key: MorphKey,
        create: F,
    ) -> MorphResult<&MorphValue>
    where
        F: FnOnce() -> MorphResult<MorphValue>,
    {
        match self.entries.entry(key) {
            Entry::Occupied(entry) => {
                self.stats.hits += 1;
                Ok(entry.into_mut())
            }
            Entry::Vacant(entry) => {
                self.stats.misses += 1;
                let value = create()?;
                self.stats.buffers_created += value.primitives.len() as u64;
                Ok(entry.insert(value))
            }
        }
    }

    /// Destroy every owned vertex buffer and empty the table.
    ///
    /// Returns the number of buffers destroyed. Statistics are kept.
    pub fn destroy_all<B: VertexBufferBackend + ?Sized>(&mut self, backend: &mut B) -> usize {
        std::mem::take(&mut self.entries)
            .into_values()
            .map(|value| value.destroy(backend))
            .sum()
    }
}
