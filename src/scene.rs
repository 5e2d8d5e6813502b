//! Scene-side identifiers.

use std::fmt;

/// Opaque handle identifying a renderable mesh instance in the scene graph.
///
/// Entities are owned by the scene; this crate only stores and compares them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Entity(u32);

impl Entity {
    /// Wrap a raw entity id.
    pub const fn from_raw(id: u32) -> Self {
        Self(id)
    }

    /// The raw entity id.
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
