use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use tracing::debug;
use weave_core::{Entity, Guid, OperationInstance, WeaveError};

use crate::edges::EdgeList;
use crate::store::EntityStore;

/// Read side of one operation instance: parameters, inputs and the GUIDs
/// declared for its outputs.
pub struct OperationContext<'a> {
    store: &'a EntityStore,
    instance: &'a OperationInstance,
}

impl<'a> OperationContext<'a> {
    pub fn new(store: &'a EntityStore, instance: &'a OperationInstance) -> Self {
        Self { store, instance }
    }

    /// Deserialize the operation parameters.
    pub fn params<T: DeserializeOwned>(&self) -> Result<T, WeaveError> {
        serde_json::from_value(self.instance.operation.data.clone())
            .map_err(|e| WeaveError::InvalidParameter(e.to_string()))
    }

    pub fn input_guid(&self, name: &str) -> Result<Guid, WeaveError> {
        self.instance
            .inputs
            .get(name)
            .copied()
            .ok_or_else(|| WeaveError::MissingInput(name.to_string()))
    }

    /// Size of the vertex set bound to `name`.
    pub fn input_vertex_count(&self, name: &str) -> Result<usize, WeaveError> {
        let guid = self.input_guid(name)?;
        Ok(self.store.vertex_set(&guid)?.len())
    }

    /// Edge bundle bound to `name`, as index sequences.
    pub fn input_edges(&self, name: &str) -> Result<EdgeList, WeaveError> {
        let guid = self.input_guid(name)?;
        Ok(EdgeList::from(self.store.edge_bundle(&guid)?))
    }

    /// GUID declared for output `name`.
    pub fn output_guid(&self, name: &str) -> Result<Guid, WeaveError> {
        self.instance.outputs.get(name).copied().ok_or_else(|| {
            WeaveError::InvalidParameter(format!(
                "operation {} has no output named {}",
                self.instance.operation.class, name
            ))
        })
    }
}

/// Entities produced by an operation, not yet in the store.
#[derive(Debug, Default)]
pub struct OperationOutputs {
    entries: Vec<(String, Guid, Entity)>,
}

impl OperationOutputs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, name: &str, guid: Guid, entity: Entity) {
        self.entries.push((name.to_string(), guid, entity));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Insert every output under its GUID. Returns name -> GUID.
    pub fn commit(self, store: &mut EntityStore) -> BTreeMap<String, Guid> {
        let mut written = BTreeMap::new();
        for (name, guid, entity) in self.entries {
            debug!(output = %name, %guid, kind = %entity.kind(), "writing operation output");
            store.insert_with_guid(guid, entity);
            written.insert(name, guid);
        }
        written
    }
}
