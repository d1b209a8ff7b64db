// src/registry/chain.rs

use std::collections::BTreeSet;

use tracing::debug;

use crate::errors::{JobscreenError, Result};
use crate::job::Definition;

use super::Registry;

/// Several registries queried in order.
///
/// Names must be unique across all members; this is checked once in
/// [`ChainRegistry::new`].
#[derive(Debug)]
pub struct ChainRegistry {
    members: Vec<Box<dyn Registry>>,
}

impl ChainRegistry {
    pub fn new(members: Vec<Box<dyn Registry>>) -> Result<Self> {
        let mut seen = BTreeSet::new();
        for member in &members {
            for definition in member.all() {
                if !seen.insert(definition.name().to_string()) {
                    return Err(JobscreenError::DuplicateJob(definition.name().to_string()));
                }
            }
        }
        debug!(members = members.len(), jobs = seen.len(), "composed registry");
        Ok(Self { members })
    }
}

impl Registry for ChainRegistry {
    fn get(&self, name: &str) -> Option<&Definition> {
        self.members.iter().find_map(|member| member.get(name))
    }

    fn all(&self) -> Vec<&Definition> {
        let mut all: Vec<&Definition> = self.members.iter().flat_map(|m| m.all()).collect();
        all.sort_by(|a, b| a.name().cmp(b.name()));
        all
    }
}
