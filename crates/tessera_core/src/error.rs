//! # Registry Error Types
//!
//! All recoverable errors that can occur in the registry.
//!
//! Most misuse of the registry is handled as a no-op (killing a stale
//! handle, removing a missing component). The errors below cover the cases
//! where silently ignoring the request would hide lost data.

use thiserror::Error;

use crate::ecs::EntityId;

/// Errors that can occur in the registry.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EcsError {
    /// A slot index is beyond the configured maximum entity count.
    #[error("entity index {index} exceeds maximum of {max} entities")]
    CapacityExceeded {
        /// The offending slot index.
        index: u32,
        /// The configured maximum.
        max: u32,
    },

    /// No free slot is left to create an entity.
    #[error("entity slots exhausted: all {max} slots are in use")]
    EntitiesExhausted {
        /// The configured maximum.
        max: u32,
    },

    /// The handle's generation no longer matches its slot.
    #[error("stale entity handle {0}")]
    StaleEntity(EntityId),

    /// More distinct component types than a signature can hold.
    #[error("too many component kinds: a signature holds at most {max}")]
    TooManyComponentKinds {
        /// Signature width.
        max: usize,
    },

    /// More distinct system types than the system table can hold.
    #[error("too many system kinds: at most {max} are supported")]
    TooManySystemKinds {
        /// System table limit.
        max: usize,
    },

    /// Invalid configuration file.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for registry operations.
pub type EcsResult<T> = Result<T, EcsError>;
