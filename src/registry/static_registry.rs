// src/registry/static_registry.rs

use std::collections::BTreeMap;

use crate::config::{ConfigFile, JobConfig, JobsFile};
use crate::errors::{JobscreenError, Result};
use crate::job::Definition;

use super::Registry;

/// Fixed set of definitions, keyed by name.
#[derive(Debug, Clone, Default)]
pub struct StaticRegistry {
    definitions: BTreeMap<String, Definition>,
}

impl StaticRegistry {
    /// Build from a list; a repeated name is an error.
    pub fn from_definitions(definitions: impl IntoIterator<Item = Definition>) -> Result<Self> {
        let mut map = BTreeMap::new();
        for definition in definitions {
            let name = definition.name().to_string();
            if map.insert(name.clone(), definition).is_some() {
                return Err(JobscreenError::DuplicateJob(name));
            }
        }
        Ok(Self { definitions: map })
    }

    /// Build from `[job.<name>]` tables.
    pub fn from_jobs(jobs: &BTreeMap<String, JobConfig>) -> Result<Self> {
        let definitions = jobs
            .iter()
            .map(|(name, job)| Definition::new(name.as_str(), job.command.clone(), job.restart))
            .collect::<Result<Vec<_>>>()?;
        Self::from_definitions(definitions)
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

impl TryFrom<&ConfigFile> for StaticRegistry {
    type Error = JobscreenError;

    fn try_from(cfg: &ConfigFile) -> Result<Self> {
        Self::from_jobs(&cfg.job)
    }
}

impl TryFrom<&JobsFile> for StaticRegistry {
    type Error = JobscreenError;

    fn try_from(jobs: &JobsFile) -> Result<Self> {
        Self::from_jobs(&jobs.job)
    }
}

impl Registry for StaticRegistry {
    fn get(&self, name: &str) -> Option<&Definition> {
        self.definitions.get(name)
    }

    fn all(&self) -> Vec<&Definition> {
        self.definitions.values().collect()
    }
}
