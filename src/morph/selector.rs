//! Picks the morph targets that get blended on the GPU.

use glam::Vec4;

use crate::backend::MAX_MORPH_TARGETS;

use super::key::PrimaryIndices;

/// Hard cap on addressable targets; index 255 is the unused-slot sentinel.
pub const MAX_WEIGHTS: usize = PrimaryIndices::UNUSED as usize;

/// Result of [`WeightSelector::select`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Selection {
    /// The model has at most four targets: its own vertex buffer already
    /// carries all of them, so the weights are used as-is (zero padded).
    Direct(Vec4),
    /// The four most influential targets and their weights.
    Primary {
        indices: PrimaryIndices,
        weights: Vec4,
    },
}

impl Selection {
    /// The uniform value to hand to the vertex shader.
    pub fn weights(&self) -> Vec4 {
        match self {
            Self::Direct(weights) | Self::Primary { weights, .. } => *weights,
        }
    }
}

/// Selects the (at most) four highest weights in linear time.
///
/// Keeps a scratch buffer between calls so steady-state selection does not allocate.
#[derive(Debug, Clone)]
pub struct WeightSelector {
    scratch: Vec<f32>,
    max_weights: usize,
}

impl WeightSelector {
    /// Create a selector that ignores weights past `max_weights`.
    ///
    /// The limit is clamped to `MAX_MORPH_TARGETS..=MAX_WEIGHTS`.
    pub fn new(max_weights: usize) -> Self {
        Self {
            scratch: Vec::new(),
            max_weights: max_weights.clamp(MAX_MORPH_TARGETS, MAX_WEIGHTS),
        }
    }

    pub fn max_weights(&self) -> usize {
        self.max_weights
    }

    /// Select the targets to blend for `weights`.
    ///
    /// Primary indices are collected by scanning the weights in index order,
    /// so they come out ascending. Only strictly positive weights qualify, and
    /// among equal weights the lowest indices win. NaN weights are ignored.
    pub fn select(&mut self, weights: &[f32]) -> Selection {
        if weights.len() <= MAX_MORPH_TARGETS {
            let mut direct = [0.0; MAX_MORPH_TARGETS];
            direct[..weights.len()].copy_from_slice(weights);
            return Selection::Direct(Vec4::from_array(direct));
        }

        let weights = &weights[..weights.len().min(self.max_weights)];

        self.scratch.clear();
        self.scratch
            .extend(weights.iter().copied().filter(|weight| !weight.is_nan()));
        if self.scratch.len() < MAX_MORPH_TARGETS {
            self.scratch.resize(MAX_MORPH_TARGETS, -1.0);
        }

        // Partition so the four largest values occupy the front.
        self.scratch
            .select_nth_unstable_by(MAX_MORPH_TARGETS - 1, |a, b| b.total_cmp(a));
        // Each of the four values is claimed by one index; NaN marks a claimed value.
        let mut highest = [f32::NAN; MAX_MORPH_TARGETS];
        highest.copy_from_slice(&self.scratch[..MAX_MORPH_TARGETS]);

        let mut slots = [PrimaryIndices::UNUSED; MAX_MORPH_TARGETS];
        let mut primary = 0;
        for (index, weight) in weights.iter().enumerate() {
            if primary == MAX_MORPH_TARGETS {
                break;
            }
            if *weight <= 0.0 || weight.is_nan() {
                continue;
            }
            if let Some(value) = highest.iter_mut().find(|value| **value == *weight) {
                *value = f32::NAN;
                slots[primary] = index as u8;
                primary += 1;
            }
        }

        let indices = PrimaryIndices::from_slots(slots);
        let gathered = Vec4::from_array(indices.safe_slots().map(|index| weights[index]));
        Selection::Primary {
            indices,
            weights: gathered,
        }
    }
}

impl Default for WeightSelector {
    fn default() -> Self {
        Self::new(MAX_WEIGHTS)
    }
}
