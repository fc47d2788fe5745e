//! # Registry Configuration
//!
//! Capacity limits for a [`Registry`](crate::Registry).
//!
//! Usually built in code, but can be loaded once at startup from TOML:
//!
//! ```toml
//! max_entities = 250000
//! initial_capacity = 4096
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{EcsError, EcsResult};

/// Default maximum number of entity slots.
pub const DEFAULT_MAX_ENTITIES: u32 = 1_000_000;

/// Default number of packed entries reserved per component pool.
pub const DEFAULT_CAPACITY: usize = 1_000;

/// Capacity limits for a registry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RegistryConfig {
    /// Maximum number of simultaneously allocated entity slots.
    pub max_entities: u32,
    /// Packed entries reserved when a component pool is created.
    pub initial_capacity: usize,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            max_entities: DEFAULT_MAX_ENTITIES,
            initial_capacity: DEFAULT_CAPACITY,
        }
    }
}

impl RegistryConfig {
    /// Parses and validates a TOML document. Missing keys take defaults.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::InvalidConfig`] on malformed TOML, unknown keys,
    /// or values rejected by [`validate`](Self::validate).
    pub fn from_toml_str(source: &str) -> EcsResult<Self> {
        let config: Self =
            toml::from_str(source).map_err(|err| EcsError::InvalidConfig(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Checks the limits are usable.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::InvalidConfig`] if `max_entities` is zero or
    /// `u32::MAX` (that index is reserved for the null id).
    pub fn validate(&self) -> EcsResult<()> {
        if self.max_entities == 0 {
            return Err(EcsError::InvalidConfig(
                "max_entities must be greater than zero".to_owned(),
            ));
        }
        if self.max_entities == u32::MAX {
            return Err(EcsError::InvalidConfig(
                "max_entities must be below u32::MAX".to_owned(),
            ));
        }
        Ok(())
    }
}
