//! # Dense Entity Set
//!
//! Packed list of entity ids with O(1) membership test, insert and removal.
//!
//! Same swap-and-pop layout as a component pool, without a payload. Used for
//! group membership and system entity lists.

use std::collections::HashMap;

use crate::ecs::EntityId;

/// Unordered set of entities stored contiguously.
///
/// Iteration order is packing order and changes when an element is removed
/// (the last element moves into the hole).
#[derive(Default, Debug, Clone)]
pub struct EntitySet {
    entities: Vec<EntityId>,
    positions: HashMap<EntityId, usize>,
}

impl EntitySet {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `entity`. Returns `false` if it was already present.
    pub fn insert(&mut self, entity: EntityId) -> bool {
        if self.positions.contains_key(&entity) {
            return false;
        }
        self.positions.insert(entity, self.entities.len());
        self.entities.push(entity);
        true
    }

    /// Removes `entity` with swap-and-pop. Returns `false` if absent.
    pub fn remove(&mut self, entity: EntityId) -> bool {
        let Some(position) = self.positions.remove(&entity) else {
            return false;
        };
        self.entities.swap_remove(position);
        if let Some(&moved) = self.entities.get(position) {
            self.positions.insert(moved, position);
        }
        true
    }

    /// Checks membership.
    #[inline]
    #[must_use]
    pub fn contains(&self, entity: EntityId) -> bool {
        self.positions.contains_key(&entity)
    }

    /// Packed view of the members.
    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[EntityId] {
        &self.entities
    }

    /// Number of members.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Checks if the set is empty.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Removes every member.
    pub fn clear(&mut self) {
        self.entities.clear();
        self.positions.clear();
    }
}
