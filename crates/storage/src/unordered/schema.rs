//! Row layouts of the unordered disk files and the entity -> batch direction.

use std::sync::Arc;

use arrow::array::{ArrayRef, Float64Array, Float64Builder, Int64Array, ListBuilder, StringArray};
use arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use arrow::record_batch::RecordBatch;
use weave_core::{Entity, VertexSet};

use crate::error::StorageError;

fn id_field(name: &str) -> Field {
    Field::new(name, DataType::Int64, false)
}

/// Parquet schema for each supported entity kind.
pub fn vertex_schema() -> SchemaRef {
    Arc::new(Schema::new(vec![id_field("id")]))
}

pub fn edge_schema() -> SchemaRef {
    Arc::new(Schema::new(vec![id_field("id"), id_field("src"), id_field("dst")]))
}

pub fn string_attribute_schema() -> SchemaRef {
    Arc::new(Schema::new(vec![
        id_field("id"),
        Field::new("value", DataType::Utf8, false),
    ]))
}

pub fn double_attribute_schema() -> SchemaRef {
    Arc::new(Schema::new(vec![
        id_field("id"),
        Field::new("value", DataType::Float64, false),
    ]))
}

pub fn double_tuple2_attribute_schema() -> SchemaRef {
    Arc::new(Schema::new(vec![
        id_field("id"),
        Field::new("value1", DataType::Float64, false),
        Field::new("value2", DataType::Float64, false),
    ]))
}

pub fn double_vector_attribute_schema() -> SchemaRef {
    Arc::new(Schema::new(vec![
        id_field("id"),
        Field::new(
            "value",
            DataType::List(Arc::new(Field::new("item", DataType::Float64, true))),
            false,
        ),
    ]))
}

fn external_id(vs: &VertexSet, index: usize) -> Result<i64, StorageError> {
    vs.mapping
        .get(index)
        .copied()
        .ok_or(StorageError::IndexOutOfRange {
            index,
            len: vs.mapping.len(),
        })
}

fn require<'v>(vs: Option<&'v VertexSet>, what: &str) -> Result<&'v VertexSet, StorageError> {
    vs.ok_or_else(|| StorageError::MissingVertexSet(what.to_string()))
}

/// Ordered indices of the defined rows, translated to external ids.
fn defined_ids(defined: &[bool], vs: &VertexSet) -> Result<(Vec<usize>, Vec<i64>), StorageError> {
    let rows: Vec<usize> = defined
        .iter()
        .enumerate()
        .filter(|&(_, &d)| d)
        .map(|(i, _)| i)
        .collect();
    let ids = rows
        .iter()
        .map(|&i| external_id(vs, i))
        .collect::<Result<Vec<_>, _>>()?;
    Ok((rows, ids))
}

/// Convert an entity into a record batch keyed by external ids.
///
/// Edge bundles translate `src` through `vs1` and `dst` through `vs2`;
/// attributes translate their row index through `vs1` and skip undefined rows.
pub fn entity_to_batch(
    entity: &Entity,
    vs1: Option<&VertexSet>,
    vs2: Option<&VertexSet>,
) -> Result<RecordBatch, StorageError> {
    let batch = match entity {
        Entity::VertexSet(vs) => RecordBatch::try_new(
            vertex_schema(),
            vec![Arc::new(Int64Array::from(vs.mapping.clone())) as ArrayRef],
        )?,
        Entity::EdgeBundle(es) => {
            let vs1 = require(vs1, "EdgeBundle source side")?;
            let vs2 = require(vs2, "EdgeBundle destination side")?;
            let mut ids = Vec::with_capacity(es.len());
            let mut srcs = Vec::with_capacity(es.len());
            let mut dsts = Vec::with_capacity(es.len());
            for i in 0..es.len() {
                ids.push(es.edge_mapping.get(i).copied().ok_or(
                    StorageError::IndexOutOfRange {
                        index: i,
                        len: es.edge_mapping.len(),
                    },
                )?);
                srcs.push(external_id(vs1, es.src[i])?);
                dsts.push(external_id(vs2, es.dst[i])?);
            }
            RecordBatch::try_new(
                edge_schema(),
                vec![
                    Arc::new(Int64Array::from(ids)) as ArrayRef,
                    Arc::new(Int64Array::from(srcs)),
                    Arc::new(Int64Array::from(dsts)),
                ],
            )?
        }
        Entity::StringAttribute(attr) => {
            let (rows, ids) = defined_ids(&attr.defined, require(vs1, "StringAttribute")?)?;
            let values: Vec<&str> = rows.iter().map(|&i| attr.values[i].as_str()).collect();
            RecordBatch::try_new(
                string_attribute_schema(),
                vec![
                    Arc::new(Int64Array::from(ids)) as ArrayRef,
                    Arc::new(StringArray::from(values)),
                ],
            )?
        }
        Entity::DoubleAttribute(attr) => {
            let (rows, ids) = defined_ids(&attr.defined, require(vs1, "DoubleAttribute")?)?;
            let values: Vec<f64> = rows.iter().map(|&i| attr.values[i]).collect();
            RecordBatch::try_new(
                double_attribute_schema(),
                vec![
                    Arc::new(Int64Array::from(ids)) as ArrayRef,
                    Arc::new(Float64Array::from(values)),
                ],
            )?
        }
        Entity::DoubleTuple2Attribute(attr) => {
            let (rows, ids) =
                defined_ids(&attr.defined, require(vs1, "DoubleTuple2Attribute")?)?;
            let values1: Vec<f64> = rows.iter().map(|&i| attr.values1[i]).collect();
            let values2: Vec<f64> = rows.iter().map(|&i| attr.values2[i]).collect();
            RecordBatch::try_new(
                double_tuple2_attribute_schema(),
                vec![
                    Arc::new(Int64Array::from(ids)) as ArrayRef,
                    Arc::new(Float64Array::from(values1)),
                    Arc::new(Float64Array::from(values2)),
                ],
            )?
        }
        Entity::DoubleVectorAttribute(attr) => {
            let (rows, ids) =
                defined_ids(&attr.defined, require(vs1, "DoubleVectorAttribute")?)?;
            let mut builder = ListBuilder::new(Float64Builder::new());
            for &i in &rows {
                builder.values().append_slice(&attr.values[i]);
                builder.append(true);
            }
            RecordBatch::try_new(
                double_vector_attribute_schema(),
                vec![
                    Arc::new(Int64Array::from(ids)) as ArrayRef,
                    Arc::new(builder.finish()),
                ],
            )?
        }
        Entity::Scalar(_) => return Err(StorageError::UnsupportedKind(entity.kind())),
    };
    Ok(batch)
}

#[cfg(test)]
mod tests {
    use super::*;
    use weave_core::{DoubleAttribute, EdgeBundle, Scalar};

    #[test]
    fn edge_batch_uses_external_ids() {
        let vs = VertexSet {
            mapping: vec![10, 20, 30],
        };
        let es = Entity::EdgeBundle(EdgeBundle {
            src: vec![0, 2],
            dst: vec![1, 0],
            edge_mapping: vec![500, 501],
        });
        let batch = entity_to_batch(&es, Some(&vs), Some(&vs)).unwrap();
        assert_eq!(batch.num_rows(), 2);

        let src = batch
            .column_by_name("src")
            .unwrap()
            .as_any()
            .downcast_ref::<Int64Array>()
            .unwrap();
        assert_eq!(src.values().to_vec(), vec![10, 30]);
    }

    #[test]
    fn attribute_batch_skips_undefined_rows() {
        let vs = VertexSet::with_len(3);
        let attr = Entity::DoubleAttribute(DoubleAttribute {
            values: vec![1.5, 0.0, 3.5],
            defined: vec![true, false, true],
        });
        let batch = entity_to_batch(&attr, Some(&vs), None).unwrap();
        assert_eq!(batch.num_rows(), 2);
    }

    #[test]
    fn edge_batch_needs_both_vertex_sets() {
        let es = Entity::EdgeBundle(EdgeBundle::default());
        let vs = VertexSet::with_len(1);
        assert!(matches!(
            entity_to_batch(&es, Some(&vs), None),
            Err(StorageError::MissingVertexSet(_))
        ));
    }

    #[test]
    fn scalars_are_rejected() {
        let scalar = Entity::Scalar(Scalar {
            value: serde_json::json!(1),
        });
        assert!(matches!(
            entity_to_batch(&scalar, None, None),
            Err(StorageError::UnsupportedKind(_))
        ));
    }
}
