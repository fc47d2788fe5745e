//! # Entity Management
//!
//! Entities are lightweight identifiers consisting of:
//! - A slot index into the registry's per-entity tables
//! - A generation counter for safe slot reuse

use std::fmt;

/// Unique identifier for an entity.
///
/// The ID is split into two parts:
/// - Lower 32 bits: Slot index
/// - Upper 32 bits: Generation counter for detecting stale references
///
/// An id is valid iff the registry's generation table holds the same
/// generation for its slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct EntityId(u64);

impl EntityId {
    /// Mask selecting the slot index bits.
    pub const INDEX_MASK: u64 = 0xFFFF_FFFF;

    /// Shift applied to the generation counter.
    pub const GENERATION_SHIFT: u32 = 32;

    /// Null/invalid entity ID.
    pub const NULL: Self = Self(u64::MAX);

    /// Creates a new entity ID from index and generation.
    ///
    /// # Arguments
    ///
    /// * `index` - The slot index (0 to 2^32-1)
    /// * `generation` - The generation counter (0 to 2^32-1)
    #[inline]
    #[must_use]
    pub const fn new(index: u32, generation: u32) -> Self {
        Self(((generation as u64) << Self::GENERATION_SHIFT) | (index as u64))
    }

    /// Reinterprets a raw 64-bit value as an entity ID.
    #[inline]
    #[must_use]
    pub const fn from_bits(bits: u64) -> Self {
        Self(bits)
    }

    /// Returns the raw 64-bit representation.
    #[inline]
    #[must_use]
    pub const fn to_bits(self) -> u64 {
        self.0
    }

    /// Returns the index portion of the entity ID.
    #[inline]
    #[must_use]
    pub const fn index(self) -> u32 {
        (self.0 & Self::INDEX_MASK) as u32
    }

    /// Returns the generation portion of the entity ID.
    #[inline]
    #[must_use]
    pub const fn generation(self) -> u32 {
        (self.0 >> Self::GENERATION_SHIFT) as u32
    }

    /// Checks if this entity ID is null/invalid.
    #[inline]
    #[must_use]
    pub const fn is_null(self) -> bool {
        self.0 == u64::MAX
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::NULL
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            f.write_str("null")
        } else {
            write!(f, "{}v{}", self.index(), self.generation())
        }
    }
}

impl From<EntityId> for u64 {
    fn from(id: EntityId) -> Self {
        id.0
    }
}

/// Lifecycle state of an entity slot.
///
/// ```text
/// Free -> PendingCreate -> Active -> PendingDestroy -> Free
///                                                  (generation + 1)
/// ```
///
/// `PendingCreate` entities accept component operations immediately but are
/// not visible to systems until the next synchronization point.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum EntityState {
    /// Slot is unused (or was never allocated).
    #[default]
    Free,
    /// Created; awaiting the next synchronization point.
    PendingCreate,
    /// Visible to systems.
    Active,
    /// Killed; will be purged at the next synchronization point.
    PendingDestroy,
}

impl EntityState {
    /// Returns true for states where the slot holds a live entity.
    #[inline]
    #[must_use]
    pub const fn is_live(self) -> bool {
        !matches!(self, Self::Free)
    }
}
