//! # TESSERA Core
//!
//! Sparse-set Entity Component System (ECS) designed for:
//! - Millions of component lookups per frame
//! - Contiguous iteration over packed component arrays
//! - Safe reuse of entity slots via generation counters
//!
//! ## Architecture Rules
//!
//! 1. **Components are plain data** - any `'static` type, stored per type
//! 2. **Structural changes are deferred** - entities appear and disappear
//!    only at [`Registry::synchronize`]
//! 3. **Stale ids are harmless** - every access checks the generation
//!
//! ## Example
//!
//! ```rust,ignore
//! use tessera_core::Registry;
//!
//! let mut registry = Registry::new();
//! let entity = registry.create_entity();
//! registry.add_component(entity, Position { x: 0.0, y: 0.0 })?;
//! registry.add_component(entity, Velocity { x: 1.0, y: 0.0 })?;
//! registry.synchronize();
//!
//! registry.view2::<Velocity, Position, _>(|_, velocity, position| {
//!     position.x += velocity.x;
//! });
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod ecs;
pub mod error;
pub mod memory;

pub use config::{RegistryConfig, DEFAULT_CAPACITY, DEFAULT_MAX_ENTITIES};
pub use ecs::{
    AsAny, Component, ComponentKind, ComponentPool, EntityHandle, EntityId, EntityState,
    Registry, Signature, SignatureIter, SyncReport, System, SystemBase, SystemKind,
    MAX_COMPONENT_KINDS, MAX_SYSTEM_KINDS,
};
pub use error::{EcsError, EcsResult};
pub use memory::{EntitySet, SparsePages, PAGE_SIZE};
