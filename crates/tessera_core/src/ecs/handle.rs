//! # Entity Handle
//!
//! An id paired with the registry that issued it.

use super::component::Component;
use super::entity::EntityId;
use super::registry::Registry;
use crate::error::EcsResult;

/// Borrowed view of one entity.
///
/// Every method forwards to the [`Registry`] method of the same name. The
/// handle holds the registry mutably, so keep it short-lived and store the
/// [`EntityId`] instead.
///
/// ```rust,ignore
/// let mut player = registry.spawn();
/// player.add_component(Health(100))?;
/// player.tag("player");
/// let id = player.id();
/// ```
pub struct EntityHandle<'r> {
    id: EntityId,
    registry: &'r mut Registry,
}

impl<'r> EntityHandle<'r> {
    pub(crate) fn new(id: EntityId, registry: &'r mut Registry) -> Self {
        Self { id, registry }
    }

    /// The wrapped id.
    #[inline]
    #[must_use]
    pub const fn id(&self) -> EntityId {
        self.id
    }

    /// See [`Registry::is_valid`].
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.registry.is_valid(self.id)
    }

    /// Queues the entity for destruction. See [`Registry::kill_entity`].
    pub fn kill(self) {
        self.registry.kill_entity(self.id);
    }

    /// See [`Registry::tag_entity`].
    pub fn tag(&mut self, name: &str) {
        self.registry.tag_entity(self.id, name);
    }

    /// See [`Registry::has_tag`].
    #[must_use]
    pub fn has_tag(&self, name: &str) -> bool {
        self.registry.has_tag(self.id, name)
    }

    /// See [`Registry::group_entity`].
    pub fn group(&mut self, name: &str) -> bool {
        self.registry.group_entity(self.id, name)
    }

    /// See [`Registry::belongs_to_group`].
    #[must_use]
    pub fn belongs_to_group(&self, name: &str) -> bool {
        self.registry.belongs_to_group(self.id, name)
    }

    /// See [`Registry::add_component`].
    ///
    /// # Errors
    ///
    /// Same as [`Registry::add_component`].
    pub fn add_component<T: Component>(&mut self, component: T) -> EcsResult<&mut T> {
        self.registry.add_component(self.id, component)
    }

    /// See [`Registry::remove_component`].
    pub fn remove_component<T: Component>(&mut self) -> Option<T> {
        self.registry.remove_component(self.id)
    }

    /// See [`Registry::has_component`].
    #[must_use]
    pub fn has_component<T: Component>(&self) -> bool {
        self.registry.has_component::<T>(self.id)
    }

    /// See [`Registry::get_component`].
    ///
    /// # Panics
    ///
    /// Panics if the entity has no `T`.
    #[must_use]
    pub fn get_component<T: Component>(&self) -> &T {
        self.registry.get_component(self.id)
    }

    /// See [`Registry::get_component_mut`].
    ///
    /// # Panics
    ///
    /// Panics if the entity has no `T`.
    pub fn get_component_mut<T: Component>(&mut self) -> &mut T {
        self.registry.get_component_mut(self.id)
    }

    /// See [`Registry::try_get_component`].
    #[must_use]
    pub fn try_get_component<T: Component>(&self) -> Option<&T> {
        self.registry.try_get_component(self.id)
    }
}
