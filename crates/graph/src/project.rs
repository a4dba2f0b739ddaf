use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use weave_core::{Guid, WeaveError};

use crate::edges::EdgeList;
use crate::store::EntityStore;

/// A graph view over stored entities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub vertex_set: Guid,
    pub edge_bundle: Option<Guid>,
    #[serde(default)]
    pub vertex_attributes: BTreeMap<String, Guid>,
    #[serde(default)]
    pub edge_attributes: BTreeMap<String, Guid>,
}

impl Project {
    pub fn new(vertex_set: Guid) -> Self {
        Self {
            vertex_set,
            edge_bundle: None,
            vertex_attributes: BTreeMap::new(),
            edge_attributes: BTreeMap::new(),
        }
    }

    pub fn vertex_count(&self, store: &EntityStore) -> Result<usize, WeaveError> {
        Ok(store.vertex_set(&self.vertex_set)?.len())
    }

    /// The project's edges as an index list.
    pub fn edges(&self, store: &EntityStore) -> Result<EdgeList, WeaveError> {
        let guid = self
            .edge_bundle
            .ok_or_else(|| WeaveError::MissingInput("project has no edges".to_string()))?;
        Ok(EdgeList::from(store.edge_bundle(&guid)?))
    }

    /// Copy of this project with one more vertex attribute.
    pub fn with_vertex_attribute(&self, name: &str, guid: Guid) -> Self {
        let mut next = self.clone();
        next.vertex_attributes.insert(name.to_string(), guid);
        next
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectSummary {
    pub name: String,
    pub checkpoint: Guid,
    pub vertex_count: usize,
    pub edge_count: usize,
    pub vertex_attributes: Vec<String>,
    pub edge_attributes: Vec<String>,
    pub saved_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
struct SavedProject {
    checkpoint: Guid,
    saved_at: DateTime<Utc>,
}

/// Immutable project checkpoints plus the names they are saved under.
#[derive(Debug, Default)]
pub struct ProjectRegistry {
    checkpoints: HashMap<Guid, Project>,
    saved: HashMap<String, SavedProject>,
}

impl ProjectRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_checkpoint(&mut self, project: Project) -> Guid {
        let guid = Guid::new_v4();
        self.checkpoints.insert(guid, project);
        guid
    }

    pub fn checkpoint(&self, guid: &Guid) -> Result<&Project, WeaveError> {
        self.checkpoints
            .get(guid)
            .ok_or_else(|| WeaveError::ProjectNotFound(format!("checkpoint {}", guid)))
    }

    /// Save (or overwrite) `name` to point at an existing checkpoint.
    pub fn save(&mut self, name: &str, checkpoint: Guid) -> Result<(), WeaveError> {
        if name.trim().is_empty() {
            return Err(WeaveError::InvalidParameter(
                "project name must not be empty".to_string(),
            ));
        }
        self.checkpoint(&checkpoint)?;
        self.saved.insert(
            name.to_string(),
            SavedProject {
                checkpoint,
                saved_at: Utc::now(),
            },
        );
        Ok(())
    }

    pub fn exists(&self, name: &str) -> bool {
        self.saved.contains_key(name)
    }

    pub fn checkpoint_of(&self, name: &str) -> Result<Guid, WeaveError> {
        self.saved
            .get(name)
            .map(|s| s.checkpoint)
            .ok_or_else(|| WeaveError::ProjectNotFound(name.to_string()))
    }

    pub fn get(&self, name: &str) -> Result<&Project, WeaveError> {
        let checkpoint = self.checkpoint_of(name)?;
        self.checkpoint(&checkpoint)
    }

    /// Saved project names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.saved.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.saved.len()
    }

    pub fn is_empty(&self) -> bool {
        self.saved.is_empty()
    }

    /// Forget every checkpoint and saved name. Returns the number of saved projects dropped.
    pub fn clear(&mut self) -> usize {
        let count = self.saved.len();
        self.saved.clear();
        self.checkpoints.clear();
        count
    }

    pub fn summary(&self, name: &str, store: &EntityStore) -> Result<ProjectSummary, WeaveError> {
        let saved = self
            .saved
            .get(name)
            .ok_or_else(|| WeaveError::ProjectNotFound(name.to_string()))?;
        let project = self.checkpoint(&saved.checkpoint)?;
        let edge_count = match project.edge_bundle {
            Some(guid) => store.edge_bundle(&guid)?.len(),
            None => 0,
        };
        Ok(ProjectSummary {
            name: name.to_string(),
            checkpoint: saved.checkpoint,
            vertex_count: project.vertex_count(store)?,
            edge_count,
            vertex_attributes: project.vertex_attributes.keys().cloned().collect(),
            edge_attributes: project.edge_attributes.keys().cloned().collect(),
            saved_at: saved.saved_at,
        })
    }
}
