//! Cache keys for morph vertex buffer variants.

use std::fmt;

use crate::backend::MAX_MORPH_TARGETS;
use crate::scene::Entity;

/// Indices of the (at most four) morph targets currently blended.
///
/// Unused slots hold [`PrimaryIndices::UNUSED`] and always trail the used
/// ones. Equality and hashing follow slot order, so `[1, 3, ..]` and
/// `[3, 1, ..]` are different keys. [`WeightSelector`](super::WeightSelector)
/// emits indices in ascending order, which makes the slot order canonical for
/// any given set of targets.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct PrimaryIndices([u8; MAX_MORPH_TARGETS]);

impl PrimaryIndices {
    /// Sentinel for an unused slot. Also the reason at most 255 targets are addressable.
    pub const UNUSED: u8 = 0xff;

    /// No targets in use.
    pub const fn empty() -> Self {
        Self([Self::UNUSED; MAX_MORPH_TARGETS])
    }

    /// Build from raw slot values; sentinels must trail real indices.
    pub fn from_slots(slots: [u8; MAX_MORPH_TARGETS]) -> Self {
        let indices = Self(slots);
        debug_assert!(
            slots[indices.len()..].iter().all(|slot| *slot == Self::UNUSED),
            "unused slots must trail used ones: {slots:?}"
        );
        indices
    }

    /// Build from up to four target indices, in the given order.
    pub fn from_indices(indices: &[u8]) -> Self {
        let mut slots = [Self::UNUSED; MAX_MORPH_TARGETS];
        for (slot, index) in slots.iter_mut().zip(indices) {
            debug_assert!(*index != Self::UNUSED);
            *slot = *index;
        }
        Self(slots)
    }

    pub fn slots(&self) -> [u8; MAX_MORPH_TARGETS] {
        self.0
    }

    /// Number of used slots.
    pub fn len(&self) -> usize {
        self.0
            .iter()
            .position(|slot| *slot == Self::UNUSED)
            .unwrap_or(MAX_MORPH_TARGETS)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Used target indices in slot order.
    pub fn iter(&self) -> impl Iterator<Item = u8> + '_ {
        self.0.iter().copied().take_while(|slot| *slot != Self::UNUSED)
    }

    /// Slot values with sentinels replaced by target 0.
    ///
    /// Used to gather uniform weights; the vertex buffer carries no geometry
    /// for those slots, so the gathered weight has nothing to scale.
    pub fn safe_slots(&self) -> [usize; MAX_MORPH_TARGETS] {
        self.0.map(|slot| if slot == Self::UNUSED { 0 } else { slot as usize })
    }

    /// The same set of targets in ascending order.
    pub fn sorted(&self) -> Self {
        // The sentinel is the largest u8, so sorting keeps it trailing.
        let mut slots = self.0;
        slots.sort_unstable();
        Self(slots)
    }
}

impl Default for PrimaryIndices {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Debug for PrimaryIndices {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

/// Identifies one vertex buffer variant: an entity blended with a set of targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MorphKey {
    pub entity: Entity,
    pub primary: PrimaryIndices,
}

impl MorphKey {
    pub fn new(entity: Entity, primary: PrimaryIndices) -> Self {
        Self { entity, primary }
    }
}
