use std::collections::HashMap;

use serde::Serialize;
use weave_core::{EdgeBundle, Entity, EntityKind, Guid, VertexSet, WeaveError};

#[derive(Debug, Serialize)]
pub struct StoreStats {
    pub entity_count: usize,
    pub entities_by_kind: HashMap<String, usize>,
}

/// In-memory entity store keyed by GUID.
#[derive(Debug, Default)]
pub struct EntityStore {
    entities: HashMap<Guid, Entity>,
}

impl EntityStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert under a fresh GUID.
    pub fn insert(&mut self, entity: Entity) -> Guid {
        let guid = Guid::new_v4();
        self.entities.insert(guid, entity);
        guid
    }

    /// Insert or replace the entity stored under `guid`.
    pub fn insert_with_guid(&mut self, guid: Guid, entity: Entity) {
        self.entities.insert(guid, entity);
    }

    pub fn get(&self, guid: &Guid) -> Result<&Entity, WeaveError> {
        self.entities
            .get(guid)
            .ok_or(WeaveError::EntityNotFound(*guid))
    }

    pub fn contains(&self, guid: &Guid) -> bool {
        self.entities.contains_key(guid)
    }

    pub fn remove(&mut self, guid: &Guid) -> Option<Entity> {
        self.entities.remove(guid)
    }

    pub fn vertex_set(&self, guid: &Guid) -> Result<&VertexSet, WeaveError> {
        match self.get(guid)? {
            Entity::VertexSet(vs) => Ok(vs),
            other => Err(wrong_kind(*guid, EntityKind::VertexSet, other)),
        }
    }

    pub fn edge_bundle(&self, guid: &Guid) -> Result<&EdgeBundle, WeaveError> {
        match self.get(guid)? {
            Entity::EdgeBundle(es) => Ok(es),
            other => Err(wrong_kind(*guid, EntityKind::EdgeBundle, other)),
        }
    }

    /// Drop every entity. Returns how many were removed.
    pub fn clear(&mut self) -> usize {
        let count = self.entities.len();
        self.entities.clear();
        count
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn stats(&self) -> StoreStats {
        let mut entities_by_kind: HashMap<String, usize> = HashMap::new();
        for entity in self.entities.values() {
            *entities_by_kind.entry(entity.kind().to_string()).or_default() += 1;
        }
        StoreStats {
            entity_count: self.entities.len(),
            entities_by_kind,
        }
    }
}

fn wrong_kind(guid: Guid, expected: EntityKind, found: &Entity) -> WeaveError {
    WeaveError::WrongEntityKind {
        guid,
        expected,
        found: found.kind(),
    }
}
