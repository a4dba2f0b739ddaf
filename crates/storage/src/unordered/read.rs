//! Batch -> entity direction: external ids are mapped back to ordered indices.

use std::collections::HashMap;

use arrow::array::{Array, Float64Array, Int64Array, ListArray, StringArray};
use arrow::record_batch::RecordBatch;
use weave_core::{
    DoubleAttribute, DoubleTuple2Attribute, DoubleVectorAttribute, EdgeBundle, Entity,
    EntityKind, StringAttribute, VertexSet,
};

use crate::error::StorageError;

fn column<'b, T: 'static>(batch: &'b RecordBatch, name: &str) -> Result<&'b T, StorageError> {
    batch
        .column_by_name(name)
        .and_then(|c| c.as_any().downcast_ref::<T>())
        .ok_or_else(|| StorageError::MissingColumn(name.to_string()))
}

fn ordered(mapping: &HashMap<i64, usize>, id: i64) -> Result<usize, StorageError> {
    mapping.get(&id).copied().ok_or(StorageError::UnknownId(id))
}

/// Rebuild an entity of `kind` from the batches of one entity directory.
pub fn batches_to_entity(
    kind: EntityKind,
    batches: &[RecordBatch],
    vs1: Option<&VertexSet>,
    vs2: Option<&VertexSet>,
) -> Result<Entity, StorageError> {
    match kind {
        EntityKind::VertexSet => {
            let mut mapping = Vec::new();
            for batch in batches {
                mapping.extend(column::<Int64Array>(batch, "id")?.values().iter().copied());
            }
            Ok(Entity::VertexSet(VertexSet { mapping }))
        }
        EntityKind::EdgeBundle => {
            let m1 = vs1
                .ok_or_else(|| StorageError::MissingVertexSet("EdgeBundle source side".into()))?
                .mapping_to_ordered();
            let m2 = vs2
                .ok_or_else(|| {
                    StorageError::MissingVertexSet("EdgeBundle destination side".into())
                })?
                .mapping_to_ordered();
            let mut es = EdgeBundle::default();
            for batch in batches {
                let ids = column::<Int64Array>(batch, "id")?;
                let srcs = column::<Int64Array>(batch, "src")?;
                let dsts = column::<Int64Array>(batch, "dst")?;
                for row in 0..batch.num_rows() {
                    es.edge_mapping.push(ids.value(row));
                    es.src.push(ordered(&m1, srcs.value(row))?);
                    es.dst.push(ordered(&m2, dsts.value(row))?);
                }
            }
            Ok(Entity::EdgeBundle(es))
        }
        EntityKind::StringAttribute => {
            let vs = vs1.ok_or_else(|| StorageError::MissingVertexSet(kind.to_string()))?;
            let mapping = vs.mapping_to_ordered();
            let mut attr = StringAttribute {
                values: vec![String::new(); vs.len()],
                defined: vec![false; vs.len()],
            };
            for batch in batches {
                let ids = column::<Int64Array>(batch, "id")?;
                let values = column::<StringArray>(batch, "value")?;
                for row in 0..batch.num_rows() {
                    let i = ordered(&mapping, ids.value(row))?;
                    attr.values[i] = values.value(row).to_string();
                    attr.defined[i] = true;
                }
            }
            Ok(Entity::StringAttribute(attr))
        }
        EntityKind::DoubleAttribute => {
            let vs = vs1.ok_or_else(|| StorageError::MissingVertexSet(kind.to_string()))?;
            let mapping = vs.mapping_to_ordered();
            let mut attr = DoubleAttribute {
                values: vec![0.0; vs.len()],
                defined: vec![false; vs.len()],
            };
            for batch in batches {
                let ids = column::<Int64Array>(batch, "id")?;
                let values = column::<Float64Array>(batch, "value")?;
                for row in 0..batch.num_rows() {
                    let i = ordered(&mapping, ids.value(row))?;
                    attr.values[i] = values.value(row);
                    attr.defined[i] = true;
                }
            }
            Ok(Entity::DoubleAttribute(attr))
        }
        EntityKind::DoubleTuple2Attribute => {
            let vs = vs1.ok_or_else(|| StorageError::MissingVertexSet(kind.to_string()))?;
            let mapping = vs.mapping_to_ordered();
            let mut attr = DoubleTuple2Attribute {
                values1: vec![0.0; vs.len()],
                values2: vec![0.0; vs.len()],
                defined: vec![false; vs.len()],
            };
            for batch in batches {
                let ids = column::<Int64Array>(batch, "id")?;
                let values1 = column::<Float64Array>(batch, "value1")?;
                let values2 = column::<Float64Array>(batch, "value2")?;
                for row in 0..batch.num_rows() {
                    let i = ordered(&mapping, ids.value(row))?;
                    attr.values1[i] = values1.value(row);
                    attr.values2[i] = values2.value(row);
                    attr.defined[i] = true;
                }
            }
            Ok(Entity::DoubleTuple2Attribute(attr))
        }
        EntityKind::DoubleVectorAttribute => {
            let vs = vs1.ok_or_else(|| StorageError::MissingVertexSet(kind.to_string()))?;
            let mapping = vs.mapping_to_ordered();
            let mut attr = DoubleVectorAttribute {
                values: vec![Vec::new(); vs.len()],
                defined: vec![false; vs.len()],
            };
            for batch in batches {
                let ids = column::<Int64Array>(batch, "id")?;
                let lists = column::<ListArray>(batch, "value")?;
                for row in 0..batch.num_rows() {
                    let i = ordered(&mapping, ids.value(row))?;
                    let item = lists.value(row);
                    let item = item
                        .as_any()
                        .downcast_ref::<Float64Array>()
                        .ok_or_else(|| StorageError::MissingColumn("value.item".to_string()))?;
                    attr.values[i] = item.values().to_vec();
                    attr.defined[i] = true;
                }
            }
            Ok(Entity::DoubleVectorAttribute(attr))
        }
        EntityKind::Scalar => Err(StorageError::UnsupportedKind(kind)),
    }
}
