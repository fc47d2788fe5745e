//! # Component Storage
//!
//! Sparse-set storage for a single component type.
//!
//! The pool keeps three parallel structures:
//! - `values`: packed component values, no gaps
//! - `entities`: owning entity id for each packed value
//! - `sparse`: paged index mapping slot index -> packed position
//!
//! ```text
//! sparse:   slot 0 -> 1, slot 4 -> 0, slot 9 -> 2
//! entities: [ 4v0 | 0v0 | 9v1 ]
//! values:   [ V4  | V0  | V9  ]
//! ```
//!
//! Invariant: for every live position `i`,
//! `sparse[entities[i].index()] == i`. Removal moves the last element into
//! the hole, so iteration order is packing order and is not stable across
//! removals.

use std::any::{type_name, Any};
use std::ops::{Index, IndexMut};

use super::component::{Component, ComponentKind};
use super::entity::EntityId;
use crate::config::{DEFAULT_CAPACITY, DEFAULT_MAX_ENTITIES};
use crate::error::{EcsError, EcsResult};
use crate::memory::SparsePages;

/// Sparse-set storage for component type `T`.
///
/// # Example
///
/// ```rust,ignore
/// let mut pool: ComponentPool<Position> = ComponentPool::new();
/// pool.add(entity, Position::new(1.0, 2.0, 3.0))?;
/// for (id, position) in pool.iter() {
///     // packed order
/// }
/// ```
pub struct ComponentPool<T> {
    /// Packed component values.
    values: Vec<T>,
    /// Owner of each packed value.
    entities: Vec<EntityId>,
    /// Slot index -> packed position.
    sparse: SparsePages,
    /// Exclusive upper bound on slot indices.
    max_entities: u32,
}

impl<T> Default for ComponentPool<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> ComponentPool<T> {
    /// Creates a pool with the default entity bound and reservation.
    #[must_use]
    pub fn new() -> Self {
        Self::with_limits(DEFAULT_MAX_ENTITIES, DEFAULT_CAPACITY)
    }

    /// Creates a pool accepting slot indices below `max_entities`, with
    /// `capacity` packed entries reserved up front.
    #[must_use]
    pub fn with_limits(max_entities: u32, capacity: usize) -> Self {
        Self {
            values: Vec::with_capacity(capacity),
            entities: Vec::with_capacity(capacity),
            sparse: SparsePages::new(),
            max_entities,
        }
    }

    /// Exclusive upper bound on accepted slot indices.
    #[inline]
    #[must_use]
    pub const fn max_entities(&self) -> u32 {
        self.max_entities
    }

    /// Number of stored components.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Checks if the pool holds no component.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Packed position of `id`'s component, if it has one.
    ///
    /// A stale id never resolves to the component of the entity that now
    /// occupies its slot.
    #[inline]
    #[must_use]
    pub fn position(&self, id: EntityId) -> Option<usize> {
        let position = self.sparse.get(id.index())? as usize;
        (self.entities[position] == id).then_some(position)
    }

    /// Checks whether `id` has a component in this pool. O(1).
    #[inline]
    #[must_use]
    pub fn contains(&self, id: EntityId) -> bool {
        self.position(id).is_some()
    }

    /// Stores `value` for `id`. O(1) amortized.
    ///
    /// Appends to the packed arrays and allocates the sparse page on
    /// demand. If the slot is already occupied the entry is overwritten in
    /// place, so the packed arrays never hold two entries for one slot.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::CapacityExceeded`] if the slot index is not below
    /// [`max_entities`](Self::max_entities).
    pub fn add(&mut self, id: EntityId, value: T) -> EcsResult<()> {
        let index = id.index();
        if index >= self.max_entities {
            return Err(EcsError::CapacityExceeded {
                index,
                max: self.max_entities,
            });
        }

        if let Some(position) = self.sparse.get(index) {
            let position = position as usize;
            self.values[position] = value;
            self.entities[position] = id;
            return Ok(());
        }

        let position = u32::try_from(self.values.len()).map_err(|_| EcsError::CapacityExceeded {
            index,
            max: self.max_entities,
        })?;
        self.values.push(value);
        self.entities.push(id);
        self.sparse.set(index, position);
        Ok(())
    }

    /// Replaces `id`'s component if present, otherwise inserts it.
    ///
    /// Returns the previous value.
    ///
    /// # Errors
    ///
    /// Same as [`add`](Self::add).
    pub fn set(&mut self, id: EntityId, value: T) -> EcsResult<Option<T>> {
        if let Some(position) = self.position(id) {
            return Ok(Some(std::mem::replace(&mut self.values[position], value)));
        }
        self.add(id, value)?;
        Ok(None)
    }

    /// Removes `id`'s component with swap-and-pop. O(1).
    ///
    /// No-op returning `None` if absent.
    pub fn remove(&mut self, id: EntityId) -> Option<T> {
        let position = self.position(id)?;

        let value = self.values.swap_remove(position);
        self.entities.swap_remove(position);
        self.sparse.clear_slot(id.index());

        // Repoint the element that moved into the hole.
        if let Some(&moved) = self.entities.get(position) {
            #[allow(clippy::cast_possible_truncation)]
            self.sparse.set(moved.index(), position as u32);
        }

        Some(value)
    }

    /// Gets `id`'s component.
    #[inline]
    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<&T> {
        self.position(id).map(|position| &self.values[position])
    }

    /// Gets `id`'s component mutably.
    #[inline]
    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut T> {
        self.position(id).map(|position| &mut self.values[position])
    }

    /// Drops every component and releases sparse pages.
    pub fn clear(&mut self) {
        self.values.clear();
        self.entities.clear();
        self.sparse.clear();
    }

    /// Packed owner ids, index-aligned with [`values`](Self::values).
    #[inline]
    #[must_use]
    pub fn entities(&self) -> &[EntityId] {
        &self.entities
    }

    /// Packed component values.
    #[inline]
    #[must_use]
    pub fn values(&self) -> &[T] {
        &self.values
    }

    /// Packed component values, mutably.
    ///
    /// Useful for batch processing.
    #[inline]
    pub fn values_mut(&mut self) -> &mut [T] {
        &mut self.values
    }

    /// Iterates `(owner, value)` pairs in packing order.
    pub fn iter(&self) -> impl Iterator<Item = (EntityId, &T)> {
        self.entities.iter().copied().zip(self.values.iter())
    }

    /// Iterates `(owner, value)` pairs mutably in packing order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (EntityId, &mut T)> {
        self.entities.iter().copied().zip(self.values.iter_mut())
    }

    /// Owner and value at a packed position.
    #[inline]
    pub(crate) fn entry_mut(&mut self, position: usize) -> (EntityId, &mut T) {
        (self.entities[position], &mut self.values[position])
    }

    /// Number of sparse pages currently allocated.
    #[must_use]
    pub fn allocated_pages(&self) -> usize {
        self.sparse.allocated_pages()
    }
}

impl<T> Index<EntityId> for ComponentPool<T> {
    type Output = T;

    /// Trusted-caller accessor.
    ///
    /// # Panics
    ///
    /// Panics if `id` has no component in this pool.
    #[inline]
    fn index(&self, id: EntityId) -> &T {
        match self.position(id) {
            Some(position) => &self.values[position],
            None => missing_component::<T>(id),
        }
    }
}

impl<T> IndexMut<EntityId> for ComponentPool<T> {
    #[inline]
    fn index_mut(&mut self, id: EntityId) -> &mut T {
        match self.position(id) {
            Some(position) => &mut self.values[position],
            None => missing_component::<T>(id),
        }
    }
}

#[cold]
#[inline(never)]
pub(crate) fn missing_component<T>(id: EntityId) -> ! {
    panic!("entity {id} has no `{}` component", type_name::<T>())
}

/// Type-erased pool interface used by the registry.
///
/// Lets the registry purge a destroyed entity from every pool without
/// knowing the component types.
pub(crate) trait AnyPool {
    /// Removes `id`'s component, if any.
    fn remove_entity(&mut self, id: EntityId) -> bool;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Component> AnyPool for ComponentPool<T> {
    fn remove_entity(&mut self, id: EntityId) -> bool {
        self.remove(id).is_some()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Type-erased pools indexed by [`ComponentKind`].
///
/// Slot `k` is either empty or holds a `ComponentPool<T>` where `T` is the
/// type assigned kind `k`.
#[derive(Default)]
pub(crate) struct PoolTable {
    pools: Vec<Option<Box<dyn AnyPool>>>,
}

impl PoolTable {
    /// Pool for `T`, if one was created.
    #[inline]
    pub(crate) fn get<T: Component>(&self, kind: ComponentKind) -> Option<&ComponentPool<T>> {
        self.pools
            .get(kind.index())?
            .as_deref()?
            .as_any()
            .downcast_ref::<ComponentPool<T>>()
    }

    /// Pool for `T`, mutably, if one was created.
    #[inline]
    pub(crate) fn get_mut<T: Component>(
        &mut self,
        kind: ComponentKind,
    ) -> Option<&mut ComponentPool<T>> {
        self.pools
            .get_mut(kind.index())?
            .as_deref_mut()?
            .as_any_mut()
            .downcast_mut::<ComponentPool<T>>()
    }

    /// Pool for `T`, created with the given limits on first use.
    pub(crate) fn get_or_insert<T: Component>(
        &mut self,
        kind: ComponentKind,
        max_entities: u32,
        capacity: usize,
    ) -> &mut ComponentPool<T> {
        let index = kind.index();
        if index >= self.pools.len() {
            self.pools.resize_with(index + 1, || None);
        }
        let pool = self.pools[index].get_or_insert_with(|| {
            Box::new(ComponentPool::<T>::with_limits(max_entities, capacity)) as Box<dyn AnyPool>
        });
        match pool.as_any_mut().downcast_mut::<ComponentPool<T>>() {
            Some(pool) => pool,
            None => kind_mismatch::<T>(kind),
        }
    }

    /// Disjoint mutable access to several pools at once.
    ///
    /// A slot is `None` if its pool does not exist, or if its kind already
    /// appeared earlier in `kinds`.
    pub(crate) fn disjoint_mut<const N: usize>(
        &mut self,
        kinds: [ComponentKind; N],
    ) -> [Option<&mut (dyn AnyPool + 'static)>; N] {
        let mut out: [Option<&mut (dyn AnyPool + 'static)>; N] = std::array::from_fn(|_| None);
        for (index, slot) in self.pools.iter_mut().enumerate() {
            if let Some(position) = kinds.iter().position(|kind| kind.index() == index) {
                out[position] = slot.as_deref_mut();
            }
        }
        out
    }

    /// Removes `id` from every pool.
    ///
    /// Walks all pools rather than the entity's signature, so entries added
    /// straight through a pool are purged too.
    pub(crate) fn remove_entity(&mut self, id: EntityId) {
        for pool in self.pools.iter_mut().flatten() {
            pool.remove_entity(id);
        }
    }
}

#[cold]
#[inline(never)]
fn kind_mismatch<T>(kind: ComponentKind) -> ! {
    panic!("pool for {kind:?} does not store `{}`", type_name::<T>())
}
