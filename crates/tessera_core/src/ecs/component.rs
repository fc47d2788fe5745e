//! # Component System
//!
//! Components are pure data containers with no behavior.
//!
//! Any `'static` type can be a component. Each distinct component type is
//! given a [`ComponentKind`] the first time it is stored or required by a
//! system; the kind indexes the registry's pool vector and selects one bit of
//! a [`Signature`](super::Signature).

use std::any::{type_name, TypeId};
use std::cell::RefCell;
use std::fmt;
use std::sync::OnceLock;

use super::kind::{KindTable, TypeIdMap};
use crate::error::{EcsError, EcsResult};

/// Maximum number of distinct component types (signature width).
pub const MAX_COMPONENT_KINDS: usize = 64;

/// Marker trait for ECS components.
///
/// Implemented for every `'static` type, so plain structs work without
/// boilerplate:
///
/// ```rust,ignore
/// struct Health(u32);
///
/// registry.add_component(entity, Health(100))?;
/// ```
pub trait Component: 'static {}

impl<T: 'static> Component for T {}

thread_local! {
    static CACHED_KINDS: RefCell<TypeIdMap<u16>> = RefCell::new(TypeIdMap::default());
}

fn component_kinds() -> &'static KindTable {
    static KINDS: OnceLock<KindTable> = OnceLock::new();
    KINDS.get_or_init(|| KindTable::new(MAX_COMPONENT_KINDS, &CACHED_KINDS))
}

/// Dense identifier of a component type.
///
/// Always less than [`MAX_COMPONENT_KINDS`].
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ComponentKind(u8);

impl ComponentKind {
    /// Returns the kind of `C`, assigning one on first use.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::TooManyComponentKinds`] when `C` is new and all
    /// [`MAX_COMPONENT_KINDS`] kinds are taken.
    pub fn try_of<C: Component>() -> EcsResult<Self> {
        let table = component_kinds();
        table
            .assign(TypeId::of::<C>())
            .and_then(|kind| u8::try_from(kind).ok())
            .map(Self)
            .ok_or(EcsError::TooManyComponentKinds { max: table.limit() })
    }

    /// Returns the kind of `C`, assigning one on first use.
    ///
    /// # Panics
    ///
    /// Panics if `C` is new and all [`MAX_COMPONENT_KINDS`] kinds are taken.
    #[must_use]
    pub fn of<C: Component>() -> Self {
        match Self::try_of::<C>() {
            Ok(kind) => kind,
            Err(err) => panic!("cannot register component `{}`: {err}", type_name::<C>()),
        }
    }

    /// Returns the kind of `C` only if it has been assigned already.
    ///
    /// Read paths use this so that querying a never-stored type does not
    /// consume a kind.
    #[inline]
    #[must_use]
    pub fn lookup<C: Component>() -> Option<Self> {
        component_kinds()
            .lookup(TypeId::of::<C>())
            .and_then(|kind| u8::try_from(kind).ok())
            .map(Self)
    }

    /// Builds a kind from a raw index.
    #[inline]
    pub(crate) const fn from_index(index: usize) -> Self {
        debug_assert!(index < MAX_COMPONENT_KINDS);
        Self(index as u8)
    }

    /// Index into pool vectors and signature bits.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ComponentKind({})", self.0)
    }
}
