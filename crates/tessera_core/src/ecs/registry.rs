//! # Registry
//!
//! The central container for entities, component pools and systems.
//!
//! ## Frame Lifecycle
//!
//! ```text
//! create_entity / kill_entity      (queued)
//! add_component / remove_component (immediate)
//! view*                            (immediate)
//! synchronize()                    (queues flushed, systems updated)
//! ```
//!
//! Component operations take effect at once. Entity creation and
//! destruction only become visible to systems at [`Registry::synchronize`],
//! so structural changes never happen underneath a running system.

use std::any::type_name;
use std::collections::VecDeque;
use std::mem;

use tracing::{debug, trace, warn};

use super::component::{Component, ComponentKind};
use super::entity::{EntityId, EntityState};
use super::handle::EntityHandle;
use super::naming::NameIndex;
use super::signature::Signature;
use super::storage::{missing_component, ComponentPool, PoolTable};
use super::system::{missing_system, AsAny, System, SystemKind};
use crate::config::RegistryConfig;
use crate::error::{EcsError, EcsResult};

/// Counts from one [`Registry::synchronize`] call.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Entities made visible to systems.
    pub created: usize,
    /// Entities purged and returned to the free list.
    pub destroyed: usize,
}

/// Owner of all entity, component and system state.
///
/// # Example
///
/// ```rust,ignore
/// let mut registry = Registry::new();
///
/// let player = registry.create_entity();
/// registry.add_component(player, Position::new(0.0, 0.0, 0.0))?;
/// registry.synchronize();
///
/// registry.view2::<Position, Velocity, _>(|_, position, velocity| {
///     position.x += velocity.x;
/// });
/// ```
pub struct Registry {
    config: RegistryConfig,
    /// Slots below the watermark have been handed out at least once.
    watermark: u32,
    /// Current generation per slot.
    generations: Vec<u32>,
    /// Lifecycle state per slot.
    states: Vec<EntityState>,
    /// Component bits per slot.
    signatures: Vec<Signature>,
    /// Recycled slots, oldest first.
    free_indices: VecDeque<u32>,
    pending_create: Vec<EntityId>,
    pending_destroy: Vec<EntityId>,
    pub(super) pools: PoolTable,
    /// Indexed by [`SystemKind`].
    systems: Vec<Option<Box<dyn System>>>,
    names: NameIndex,
    alive_count: usize,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    /// Creates an empty registry with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::build(RegistryConfig::default())
    }

    /// Creates an empty registry with the given limits.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::InvalidConfig`] if the configuration does not
    /// validate.
    pub fn with_config(config: RegistryConfig) -> EcsResult<Self> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: RegistryConfig) -> Self {
        Self {
            config,
            watermark: 0,
            generations: Vec::new(),
            states: Vec::new(),
            signatures: Vec::new(),
            free_indices: VecDeque::new(),
            pending_create: Vec::new(),
            pending_destroy: Vec::new(),
            pools: PoolTable::default(),
            systems: Vec::new(),
            names: NameIndex::default(),
            alive_count: 0,
        }
    }

    /// Active configuration.
    #[inline]
    #[must_use]
    pub const fn config(&self) -> &RegistryConfig {
        &self.config
    }

    // =========================================================================
    // Entity lifecycle
    // =========================================================================

    /// Allocates an entity slot, recycling the oldest freed slot first.
    ///
    /// The id accepts component operations immediately; systems see it after
    /// the next [`synchronize`](Self::synchronize).
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::EntitiesExhausted`] when every slot up to the
    /// configured maximum is in use.
    pub fn try_create_entity(&mut self) -> EcsResult<EntityId> {
        let index = match self.free_indices.pop_front() {
            Some(index) => index,
            None => self.grow()?,
        };

        let slot = index as usize;
        let id = EntityId::new(index, self.generations[slot]);
        self.states[slot] = EntityState::PendingCreate;
        self.pending_create.push(id);
        self.alive_count += 1;
        Ok(id)
    }

    /// Hands out a never-used slot.
    fn grow(&mut self) -> EcsResult<u32> {
        let max = self.config.max_entities;
        if self.watermark >= max {
            warn!(max, "entity slots exhausted");
            return Err(EcsError::EntitiesExhausted { max });
        }

        let index = self.watermark;
        self.watermark += 1;
        self.generations.push(0);
        self.states.push(EntityState::Free);
        self.signatures.push(Signature::EMPTY);
        Ok(index)
    }

    /// Allocates an entity slot.
    ///
    /// # Panics
    ///
    /// Panics when every slot is in use. See
    /// [`try_create_entity`](Self::try_create_entity).
    pub fn create_entity(&mut self) -> EntityId {
        match self.try_create_entity() {
            Ok(id) => id,
            Err(err) => panic!("cannot create entity: {err}"),
        }
    }

    /// Creates an entity and returns a handle to it.
    ///
    /// # Panics
    ///
    /// Same as [`create_entity`](Self::create_entity).
    pub fn spawn(&mut self) -> EntityHandle<'_> {
        let id = self.create_entity();
        EntityHandle::new(id, self)
    }

    /// Wraps an existing id in a handle.
    pub fn entity(&mut self, id: EntityId) -> EntityHandle<'_> {
        EntityHandle::new(id, self)
    }

    /// Queues `id` for destruction at the next synchronization point.
    ///
    /// Stale ids and entities already queued are ignored.
    pub fn kill_entity(&mut self, id: EntityId) {
        if !self.is_valid(id) {
            trace!(%id, "ignoring kill of stale entity");
            return;
        }

        let state = &mut self.states[id.index() as usize];
        if *state == EntityState::PendingDestroy {
            return;
        }
        *state = EntityState::PendingDestroy;
        self.pending_destroy.push(id);
    }

    /// Checks that `id` refers to the current occupant of a live slot. O(1).
    #[inline]
    #[must_use]
    pub fn is_valid(&self, id: EntityId) -> bool {
        let slot = id.index() as usize;
        slot < self.generations.len()
            && self.generations[slot] == id.generation()
            && self.states[slot].is_live()
    }

    /// Lifecycle state of `id`'s slot, or `None` if `id` is stale.
    #[must_use]
    pub fn entity_state(&self, id: EntityId) -> Option<EntityState> {
        let slot = id.index() as usize;
        if slot < self.generations.len() && self.generations[slot] == id.generation() {
            Some(self.states[slot])
        } else {
            None
        }
    }

    /// Number of live entities, pending ones included.
    #[inline]
    #[must_use]
    pub const fn alive_count(&self) -> usize {
        self.alive_count
    }

    /// Entities waiting to become visible.
    #[inline]
    #[must_use]
    pub fn pending_creations(&self) -> usize {
        self.pending_create.len()
    }

    /// Entities waiting to be purged.
    #[inline]
    #[must_use]
    pub fn pending_destructions(&self) -> usize {
        self.pending_destroy.len()
    }

    /// Flushes queued creations, then queued destructions.
    ///
    /// Call once per tick. New entities join every system whose signature
    /// their current components satisfy. Destroyed entities leave every
    /// system, lose all components, tags and groups, and their slot returns
    /// to the free list with its generation bumped.
    pub fn synchronize(&mut self) -> SyncReport {
        let mut report = SyncReport::default();

        let mut created = mem::take(&mut self.pending_create);
        for &id in &created {
            if !self.is_valid(id) {
                continue;
            }
            let slot = id.index() as usize;
            if self.states[slot] == EntityState::PendingCreate {
                self.states[slot] = EntityState::Active;
            }
            self.attach_to_systems(id);
            report.created += 1;
        }
        created.clear();
        self.pending_create = created;

        let mut destroyed = mem::take(&mut self.pending_destroy);
        for &id in &destroyed {
            if !self.is_valid(id) {
                continue;
            }
            self.purge(id);
            report.destroyed += 1;
        }
        destroyed.clear();
        self.pending_destroy = destroyed;

        if report.created > 0 || report.destroyed > 0 {
            debug!(
                created = report.created,
                destroyed = report.destroyed,
                alive = self.alive_count,
                "registry synchronized"
            );
        }
        report
    }

    fn attach_to_systems(&mut self, id: EntityId) {
        let signature = self.signatures[id.index() as usize];
        for system in self.systems.iter_mut().flatten() {
            if signature.contains_all(system.base().signature()) && system.base_mut().add_entity(id)
            {
                system.on_entity_added(id);
            }
        }
    }

    fn purge(&mut self, id: EntityId) {
        for system in self.systems.iter_mut().flatten() {
            if system.base_mut().remove_entity(id) {
                system.on_entity_removed(id);
            }
        }

        let slot = id.index() as usize;
        self.signatures[slot] = Signature::EMPTY;
        self.pools.remove_entity(id);
        self.names.remove_tag(id);
        self.names.remove_from_groups(id);

        self.generations[slot] = self.generations[slot].wrapping_add(1);
        self.states[slot] = EntityState::Free;
        self.free_indices.push_back(id.index());
        self.alive_count -= 1;
    }

    // =========================================================================
    // Components
    // =========================================================================

    /// Attaches `component` to `id`, replacing any existing value of `T`.
    ///
    /// Takes effect immediately. System membership is not re-evaluated for
    /// entities that are already visible.
    ///
    /// # Errors
    ///
    /// - [`EcsError::StaleEntity`] if `id` is not valid
    /// - [`EcsError::TooManyComponentKinds`] if `T` is new and no kind is left
    pub fn add_component<T: Component>(&mut self, id: EntityId, component: T) -> EcsResult<&mut T> {
        if !self.is_valid(id) {
            return Err(EcsError::StaleEntity(id));
        }
        let kind = ComponentKind::try_of::<T>()?;

        let pool =
            self.pools
                .get_or_insert::<T>(kind, self.config.max_entities, self.config.initial_capacity);
        pool.set(id, component)?;
        self.signatures[id.index() as usize].insert(kind);
        Ok(&mut pool[id])
    }

    /// Detaches and returns `id`'s `T`, if it has one.
    pub fn remove_component<T: Component>(&mut self, id: EntityId) -> Option<T> {
        if !self.is_valid(id) {
            return None;
        }
        let kind = ComponentKind::lookup::<T>()?;
        let value = self.pools.get_mut::<T>(kind)?.remove(id)?;
        self.signatures[id.index() as usize].remove(kind);
        Some(value)
    }

    /// Checks whether `id` has a `T`. O(1).
    #[must_use]
    pub fn has_component<T: Component>(&self, id: EntityId) -> bool {
        self.pool::<T>().is_some_and(|pool| pool.contains(id))
    }

    /// Gets `id`'s `T`.
    ///
    /// # Panics
    ///
    /// Panics if `id` has no `T`. Guard with
    /// [`has_component`](Self::has_component) or use
    /// [`try_get_component`](Self::try_get_component).
    #[must_use]
    pub fn get_component<T: Component>(&self, id: EntityId) -> &T {
        match self.try_get_component::<T>(id) {
            Some(component) => component,
            None => missing_component::<T>(id),
        }
    }

    /// Gets `id`'s `T` mutably.
    ///
    /// # Panics
    ///
    /// Panics if `id` has no `T`.
    pub fn get_component_mut<T: Component>(&mut self, id: EntityId) -> &mut T {
        match self.try_get_component_mut::<T>(id) {
            Some(component) => component,
            None => missing_component::<T>(id),
        }
    }

    /// Gets `id`'s `T`, if it has one.
    #[inline]
    #[must_use]
    pub fn try_get_component<T: Component>(&self, id: EntityId) -> Option<&T> {
        self.pool::<T>()?.get(id)
    }

    /// Gets `id`'s `T` mutably, if it has one.
    #[inline]
    pub fn try_get_component_mut<T: Component>(&mut self, id: EntityId) -> Option<&mut T> {
        self.pool_mut::<T>()?.get_mut(id)
    }

    /// Component signature of `id`, or `None` if `id` is stale.
    #[must_use]
    pub fn signature(&self, id: EntityId) -> Option<Signature> {
        if self.is_valid(id) {
            Some(self.signatures[id.index() as usize])
        } else {
            None
        }
    }

    /// The packed pool for `T`, if any `T` was ever stored.
    #[inline]
    #[must_use]
    pub fn pool<T: Component>(&self) -> Option<&ComponentPool<T>> {
        self.pools.get::<T>(ComponentKind::lookup::<T>()?)
    }

    /// The packed pool for `T`, mutably.
    ///
    /// Meant for bulk value updates through
    /// [`values_mut`](ComponentPool::values_mut) or
    /// [`iter_mut`](ComponentPool::iter_mut). Adding or removing entries
    /// here bypasses entity signatures, so system membership will not see
    /// them; use [`add_component`](Self::add_component) and
    /// [`remove_component`](Self::remove_component) for that. Destruction
    /// still purges such entries.
    #[inline]
    pub fn pool_mut<T: Component>(&mut self) -> Option<&mut ComponentPool<T>> {
        self.pools.get_mut::<T>(ComponentKind::lookup::<T>()?)
    }

    // =========================================================================
    // Systems
    // =========================================================================

    /// Adds `system`, replacing any existing system of the same type.
    ///
    /// The system sees entities made visible from the next
    /// [`synchronize`](Self::synchronize) on; already visible entities are
    /// not back-filled.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::TooManySystemKinds`] if `S` is new and the system
    /// table is full.
    pub fn try_add_system<S: System>(&mut self, system: S) -> EcsResult<&mut S> {
        let index = SystemKind::try_of::<S>()?.index();
        if index >= self.systems.len() {
            self.systems.resize_with(index + 1, || None);
        }

        let replaced = self.systems[index].replace(Box::new(system)).is_some();
        debug!(system = type_name::<S>(), replaced, "system added");

        match self.systems[index]
            .as_deref_mut()
            .and_then(|system| system.downcast_mut::<S>())
        {
            Some(system) => Ok(system),
            None => missing_system::<S>(),
        }
    }

    /// Adds `system`, replacing any existing system of the same type.
    ///
    /// # Panics
    ///
    /// Panics if the system table is full. See
    /// [`try_add_system`](Self::try_add_system).
    pub fn add_system<S: System>(&mut self, system: S) -> &mut S {
        match self.try_add_system(system) {
            Ok(system) => system,
            Err(err) => panic!("cannot add system `{}`: {err}", type_name::<S>()),
        }
    }

    /// Removes the system of type `S` and returns it.
    pub fn remove_system<S: System>(&mut self) -> Option<S> {
        let kind = SystemKind::lookup::<S>()?;
        let system = self.systems.get_mut(kind.index())?.take()?;
        debug!(system = type_name::<S>(), "system removed");
        system.into_any().downcast::<S>().ok().map(|system| *system)
    }

    /// Checks whether a system of type `S` is present.
    #[must_use]
    pub fn has_system<S: System>(&self) -> bool {
        self.try_get_system::<S>().is_some()
    }

    /// Gets the system of type `S`.
    ///
    /// # Panics
    ///
    /// Panics if no `S` was added.
    #[must_use]
    pub fn get_system<S: System>(&self) -> &S {
        match self.try_get_system::<S>() {
            Some(system) => system,
            None => missing_system::<S>(),
        }
    }

    /// Gets the system of type `S` mutably.
    ///
    /// # Panics
    ///
    /// Panics if no `S` was added.
    pub fn get_system_mut<S: System>(&mut self) -> &mut S {
        match self.try_get_system_mut::<S>() {
            Some(system) => system,
            None => missing_system::<S>(),
        }
    }

    /// Gets the system of type `S`, if present.
    #[must_use]
    pub fn try_get_system<S: System>(&self) -> Option<&S> {
        let kind = SystemKind::lookup::<S>()?;
        self.systems.get(kind.index())?.as_deref()?.downcast_ref::<S>()
    }

    /// Gets the system of type `S` mutably, if present.
    pub fn try_get_system_mut<S: System>(&mut self) -> Option<&mut S> {
        let kind = SystemKind::lookup::<S>()?;
        self.systems
            .get_mut(kind.index())?
            .as_deref_mut()?
            .downcast_mut::<S>()
    }

    // =========================================================================
    // Tags and groups
    // =========================================================================

    /// Gives `id` the tag `name`.
    ///
    /// Drops `id`'s previous tag, and takes `name` from any other holder.
    /// Ignored for stale ids.
    pub fn tag_entity(&mut self, id: EntityId, name: &str) {
        if self.is_valid(id) {
            self.names.tag(id, name);
        }
    }

    /// Checks whether `id` holds the tag `name`.
    #[must_use]
    pub fn has_tag(&self, id: EntityId, name: &str) -> bool {
        self.is_valid(id) && self.names.has_tag(id, name)
    }

    /// Entity holding the tag `name`.
    #[must_use]
    pub fn entity_by_tag(&self, name: &str) -> Option<EntityId> {
        self.names.entity_by_tag(name)
    }

    /// Drops `id`'s tag. Returns `false` if it had none.
    pub fn remove_tag(&mut self, id: EntityId) -> bool {
        self.is_valid(id) && self.names.remove_tag(id)
    }

    /// Adds `id` to the group `name`. Returns `false` if it already belonged
    /// or `id` is stale.
    pub fn group_entity(&mut self, id: EntityId, name: &str) -> bool {
        self.is_valid(id) && self.names.group(id, name)
    }

    /// Checks whether `id` belongs to the group `name`.
    #[must_use]
    pub fn belongs_to_group(&self, id: EntityId, name: &str) -> bool {
        self.is_valid(id) && self.names.belongs_to_group(id, name)
    }

    /// Members of the group `name`, without duplicates. Empty if unknown.
    #[must_use]
    pub fn entities_by_group(&self, name: &str) -> &[EntityId] {
        self.names.group_members(name)
    }

    /// Removes `id` from the group `name`. Returns `false` if it was not a
    /// member.
    pub fn ungroup_entity(&mut self, id: EntityId, name: &str) -> bool {
        self.is_valid(id) && self.names.ungroup(id, name)
    }

    /// Removes `id` from every group.
    pub fn remove_from_groups(&mut self, id: EntityId) {
        if self.is_valid(id) {
            self.names.remove_from_groups(id);
        }
    }
}
