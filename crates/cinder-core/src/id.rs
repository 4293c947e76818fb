//! Entity identifiers

use serde::{Deserialize, Serialize};
use std::fmt;

/// An entity identifier handed out by an entity store.
///
/// Also the native representation of `entity` fields inside components,
/// where [`EntityId::NULL`] marks "no entity". Stores never allocate the
/// null id.
#[derive(Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
#[repr(transparent)]
pub struct EntityId(pub u64);

/// Native representation of `entity` fields
pub type EntityRef = EntityId;

impl EntityId {
    /// The null entity
    pub const NULL: Self = Self(0);

    /// Create an EntityId from a raw value
    pub const fn from_raw(id: u64) -> Self {
        Self(id)
    }

    /// Get the raw u64 value
    pub const fn raw(&self) -> u64 {
        self.0
    }

    pub const fn is_null(&self) -> bool {
        self.0 == 0
    }

    /// Return the id following this one, skipping the null id
    pub fn next(&self) -> Self {
        match self.0.wrapping_add(1) {
            0 => Self(1),
            n => Self(n),
        }
    }
}

impl fmt::Debug for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntityId({})", self.0)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
