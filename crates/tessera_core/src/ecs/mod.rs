//! # Entity Component System
//!
//! Sparse-set ECS with deferred entity lifecycle.
//!
//! ## Design Philosophy
//!
//! - One packed pool per component type; add, remove and lookup are O(1)
//! - Entity ids carry a generation so recycled slots never alias old handles
//! - Creation and destruction are queued until [`Registry::synchronize`]
//! - Systems cache their matching entities instead of scanning every frame

mod component;
mod entity;
mod handle;
mod kind;
mod naming;
mod registry;
mod signature;
mod storage;
mod system;
mod view;

pub use component::{Component, ComponentKind, MAX_COMPONENT_KINDS};
pub use entity::{EntityId, EntityState};
pub use handle::EntityHandle;
pub use registry::{Registry, SyncReport};
pub use signature::{Signature, SignatureIter};
pub use storage::ComponentPool;
pub use system::{AsAny, System, SystemBase, SystemKind, MAX_SYSTEM_KINDS};
