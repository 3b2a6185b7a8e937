//! Workflow definition cache for one extraction pass.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::workflow::{WorkflowDefinition, WorkflowError};

/// Parsed workflow definitions keyed by path.
///
/// Owned by the batch driver. Entries are never invalidated: a definition is
/// treated as immutable for the whole pass.
#[derive(Debug, Default)]
pub struct WorkflowCache {
    entries: HashMap<PathBuf, Arc<WorkflowDefinition>>,
}

impl WorkflowCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached definition, loading it on first use.
    pub fn get_or_load(&mut self, path: &Path) -> Result<Arc<WorkflowDefinition>, WorkflowError> {
        if let Some(definition) = self.entries.get(path) {
            return Ok(Arc::clone(definition));
        }
        let definition = Arc::new(WorkflowDefinition::load(path)?);
        tracing::debug!(path = %path.display(), jobs = definition.jobs.len(), "workflow loaded");
        self.entries
            .insert(path.to_path_buf(), Arc::clone(&definition));
        Ok(definition)
    }

    /// Cached definition, without loading.
    pub fn get(&self, path: &Path) -> Option<Arc<WorkflowDefinition>> {
        self.entries.get(path).cloned()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
