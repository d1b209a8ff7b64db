// src/registry/mod.rs

//! Where job definitions come from.
//!
//! - [`StaticRegistry`] holds a fixed set of definitions, built from a list
//!   or from the `[job.<name>]` sections of a config file.
//! - [`ChainRegistry`] composes several registries and rejects duplicate
//!   names up front, before any supervisor operation runs.

pub mod chain;
pub mod static_registry;

use std::fmt::Debug;

use crate::errors::{JobscreenError, Result};
use crate::job::Definition;

pub use chain::ChainRegistry;
pub use static_registry::StaticRegistry;

/// Name → definition lookup.
pub trait Registry: Send + Sync + Debug {
    fn get(&self, name: &str) -> Option<&Definition>;

    /// All definitions, ordered by name.
    fn all(&self) -> Vec<&Definition>;

    fn has(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Like [`Registry::get`], but an unknown name is an error.
    fn require(&self, name: &str) -> Result<&Definition> {
        self.get(name)
            .ok_or_else(|| JobscreenError::JobNotFound(name.to_string()))
    }
}
