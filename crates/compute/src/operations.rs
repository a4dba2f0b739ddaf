//! Dispatch of operation instances by class name.
//!
//! Execution is staged so callers can hold the store only while reading
//! inputs ([`prepare`]) and writing outputs ([`ComputedOperation::commit`]);
//! [`PreparedOperation::run`] does the work without touching the store.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::info;
use weave_core::{DoubleVectorAttribute, Entity, Guid, OperationInstance, WeaveError};
use weave_graph::example::example_graph_entities;
use weave_graph::{EdgeList, EntityStore, OperationContext, OperationOutputs};

use crate::error::ComputeError;
use crate::node2vec::{train, Node2VecParams};

pub const NODE2VEC: &str = "Node2Vec";
pub const EXAMPLE_GRAPH: &str = "ExampleGraph";

/// What an executed operation produced.
#[derive(Debug, Clone, Default, Serialize)]
pub struct OperationOutcome {
    pub outputs: BTreeMap<String, Guid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub epoch_losses: Option<Vec<f64>>,
}

/// An operation whose inputs have been read out of the store.
#[derive(Debug)]
pub enum PreparedOperation {
    Node2Vec {
        num_nodes: usize,
        edges: EdgeList,
        params: Node2VecParams,
        output: Guid,
    },
    ExampleGraph(OperationOutputs),
}

/// Results of a run, waiting to be written to the store.
#[derive(Debug)]
pub struct ComputedOperation {
    outputs: OperationOutputs,
    epoch_losses: Option<Vec<f64>>,
}

/// Read parameters and inputs of `instance` and resolve its output GUIDs.
pub fn prepare(
    store: &EntityStore,
    instance: &OperationInstance,
) -> Result<PreparedOperation, ComputeError> {
    let class = instance.operation.class.as_str();
    let ctx = OperationContext::new(store, instance);
    match class {
        NODE2VEC => {
            let params: Node2VecParams = ctx.params()?;
            params.validate()?;
            Ok(PreparedOperation::Node2Vec {
                num_nodes: ctx.input_vertex_count("vs")?,
                edges: ctx.input_edges("es")?,
                params,
                output: ctx.output_guid("embedding")?,
            })
        }
        EXAMPLE_GRAPH => {
            let mut outputs = OperationOutputs::new();
            for (name, entity) in example_graph_entities() {
                outputs.push(name, ctx.output_guid(name)?, entity);
            }
            Ok(PreparedOperation::ExampleGraph(outputs))
        }
        other => Err(WeaveError::UnknownOperation(other.to_string()).into()),
    }
}

impl PreparedOperation {
    pub fn run(self) -> Result<ComputedOperation, ComputeError> {
        match self {
            PreparedOperation::Node2Vec {
                num_nodes,
                edges,
                params,
                output,
            } => {
                let trained = train(num_nodes, &edges, &params)?;
                let mut outputs = OperationOutputs::new();
                outputs.push(
                    "embedding",
                    output,
                    Entity::DoubleVectorAttribute(DoubleVectorAttribute::dense(trained.embedding)),
                );
                Ok(ComputedOperation {
                    outputs,
                    epoch_losses: Some(trained.epoch_losses),
                })
            }
            PreparedOperation::ExampleGraph(outputs) => Ok(ComputedOperation {
                outputs,
                epoch_losses: None,
            }),
        }
    }
}

impl ComputedOperation {
    pub fn commit(self, store: &mut EntityStore) -> OperationOutcome {
        OperationOutcome {
            outputs: self.outputs.commit(store),
            epoch_losses: self.epoch_losses,
        }
    }
}

/// Run `instance` against `store`, writing its outputs under their declared GUIDs.
pub fn execute(
    store: &mut EntityStore,
    instance: &OperationInstance,
) -> Result<OperationOutcome, ComputeError> {
    info!(class = %instance.operation.class, guid = %instance.guid, "Executing operation");
    let computed = prepare(store, instance)?.run()?;
    Ok(computed.commit(store))
}
