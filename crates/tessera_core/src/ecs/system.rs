//! # Systems
//!
//! A system declares a required [`Signature`] and receives the entities
//! matching it.
//!
//! Membership is computed when an entity becomes visible at a
//! synchronization point and torn down when it is destroyed. Adding or
//! removing components on an already visible entity does not re-evaluate
//! membership.
//!
//! ```rust,ignore
//! struct Movement {
//!     base: SystemBase,
//! }
//!
//! impl Movement {
//!     fn new() -> Self {
//!         let mut base = SystemBase::new();
//!         base.require::<Position>();
//!         base.require::<Velocity>();
//!         Self { base }
//!     }
//! }
//!
//! impl System for Movement {
//!     fn base(&self) -> &SystemBase { &self.base }
//!     fn base_mut(&mut self) -> &mut SystemBase { &mut self.base }
//! }
//! ```

use std::any::{type_name, Any, TypeId};
use std::cell::RefCell;
use std::fmt;
use std::sync::OnceLock;

use super::component::{Component, ComponentKind};
use super::entity::EntityId;
use super::kind::{KindTable, TypeIdMap};
use super::signature::Signature;
use crate::error::{EcsError, EcsResult};
use crate::memory::EntitySet;

/// Maximum number of distinct system types.
pub const MAX_SYSTEM_KINDS: usize = 1024;

/// Required signature plus the cached list of matching entities.
#[derive(Default, Debug, Clone)]
pub struct SystemBase {
    signature: Signature,
    entities: EntitySet,
}

impl SystemBase {
    /// Creates a base requiring nothing.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a base with a prebuilt signature.
    #[must_use]
    pub fn with_signature(signature: Signature) -> Self {
        Self {
            signature,
            entities: EntitySet::new(),
        }
    }

    /// Adds component `C` to the required signature.
    ///
    /// # Panics
    ///
    /// Panics if `C` needs a new component kind and none are left.
    pub fn require<C: Component>(&mut self) {
        self.signature.insert(ComponentKind::of::<C>());
    }

    /// Required signature.
    #[inline]
    #[must_use]
    pub fn signature(&self) -> Signature {
        self.signature
    }

    /// Entities currently matching, in packing order.
    #[inline]
    #[must_use]
    pub fn entities(&self) -> &[EntityId] {
        self.entities.as_slice()
    }

    /// Checks whether `entity` is a member.
    #[inline]
    #[must_use]
    pub fn contains(&self, entity: EntityId) -> bool {
        self.entities.contains(entity)
    }

    pub(crate) fn add_entity(&mut self, entity: EntityId) -> bool {
        self.entities.insert(entity)
    }

    pub(crate) fn remove_entity(&mut self, entity: EntityId) -> bool {
        self.entities.remove(entity)
    }
}

/// Conversion to [`Any`] for downcasting boxed systems.
///
/// Implemented for every `'static` type.
pub trait AsAny: Any {
    /// Upcasts to `&dyn Any`.
    fn as_any(&self) -> &dyn Any;

    /// Upcasts to `&mut dyn Any`.
    fn as_any_mut(&mut self) -> &mut dyn Any;

    /// Upcasts a box to `Box<dyn Any>`.
    fn into_any(self: Box<Self>) -> Box<dyn Any>;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }
}

/// An observer of entities matching a component signature.
pub trait System: AsAny {
    /// Shared signature/membership state.
    fn base(&self) -> &SystemBase;

    /// Shared signature/membership state, mutably.
    fn base_mut(&mut self) -> &mut SystemBase;

    /// Called after `entity` joined this system.
    fn on_entity_added(&mut self, _entity: EntityId) {}

    /// Called after `entity` left this system.
    fn on_entity_removed(&mut self, _entity: EntityId) {}
}

impl dyn System {
    /// Downcasts to the concrete system type.
    #[must_use]
    pub fn downcast_ref<S: System>(&self) -> Option<&S> {
        AsAny::as_any(self).downcast_ref::<S>()
    }

    /// Downcasts to the concrete system type, mutably.
    pub fn downcast_mut<S: System>(&mut self) -> Option<&mut S> {
        AsAny::as_any_mut(self).downcast_mut::<S>()
    }
}

thread_local! {
    static CACHED_KINDS: RefCell<TypeIdMap<u16>> = RefCell::new(TypeIdMap::default());
}

fn system_kinds() -> &'static KindTable {
    static KINDS: OnceLock<KindTable> = OnceLock::new();
    KINDS.get_or_init(|| KindTable::new(MAX_SYSTEM_KINDS, &CACHED_KINDS))
}

/// Dense identifier of a system type, indexing the registry's system table.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SystemKind(u16);

impl SystemKind {
    /// Returns the kind of `S`, assigning one on first use.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::TooManySystemKinds`] when `S` is new and the
    /// table is full.
    pub fn try_of<S: System>() -> EcsResult<Self> {
        let table = system_kinds();
        table
            .assign(TypeId::of::<S>())
            .map(Self)
            .ok_or(EcsError::TooManySystemKinds { max: table.limit() })
    }

    /// Returns the kind of `S` only if it has been assigned already.
    #[inline]
    #[must_use]
    pub fn lookup<S: System>() -> Option<Self> {
        system_kinds().lookup(TypeId::of::<S>()).map(Self)
    }

    /// Index into the system table.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for SystemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SystemKind({})", self.0)
    }
}

#[cold]
#[inline(never)]
pub(crate) fn missing_system<S>() -> ! {
    panic!("system `{}` has not been added to the registry", type_name::<S>())
}
