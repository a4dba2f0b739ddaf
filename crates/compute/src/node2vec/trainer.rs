use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::Serialize;
use tracing::{debug, info};
use weave_graph::EdgeList;

use super::model::Embedding;
use super::optimizer::Adam;
use super::params::Node2VecParams;
use super::walks::{negative_walks, windows, RandomWalker};
use crate::error::Node2VecError;

/// Upper bound on the embedding table and on the vertices held by one batch
/// of walks.
pub const MAX_BUFFER_LEN: usize = 1 << 27;

/// Trained embedding plus the mean batch loss of every epoch.
#[derive(Debug, Clone, Serialize)]
pub struct TrainOutcome {
    pub embedding: Vec<Vec<f64>>,
    pub epoch_losses: Vec<f64>,
}

/// Train Node2Vec on a graph of `num_nodes` vertices.
///
/// Vertices without outgoing edges get a self-loop first. The returned
/// embedding has one row of `params.dimensions` values per vertex.
pub fn train(
    num_nodes: usize,
    edges: &EdgeList,
    params: &Node2VecParams,
) -> Result<TrainOutcome, Node2VecError> {
    params.validate()?;
    if num_nodes == 0 {
        return Err(Node2VecError::InvalidParameter(
            "cannot embed an empty vertex set".to_string(),
        ));
    }
    edges.validate(num_nodes)?;
    check_sizes(num_nodes, params)?;

    let mut edges = edges.clone();
    let patched = edges.patch_dead_ends(num_nodes);
    info!(
        num_nodes,
        edges = edges.len(),
        dead_ends = patched,
        "Node2Vec training started"
    );

    let mut rng = match params.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let walker = RandomWalker::new(num_nodes, &edges, params.p, params.q)?;
    let mut embedding = Embedding::random(num_nodes, params.dimensions, &mut rng);
    let mut optimizer = Adam::with_defaults(embedding.weights().len(), params.learning_rate);
    let mut grad = vec![0.0; embedding.weights().len()];

    let mut order: Vec<usize> = (0..num_nodes).collect();
    let mut epoch_losses = Vec::with_capacity(params.iterations);

    for epoch in 0..params.iterations {
        order.shuffle(&mut rng);
        let mut total_loss = 0.0;
        let mut batches = 0usize;

        for batch in order.chunks(params.batch_size) {
            grad.iter_mut().for_each(|g| *g = 0.0);

            let pos_starts = batch.repeat(params.walks_per_node);
            let pos = walker.sample(&pos_starts, params.walk_length, &mut rng)?;
            let neg_starts = batch.repeat(params.walks_per_node * params.num_negative_samples);
            let neg = negative_walks(&neg_starts, params.walk_length, num_nodes, &mut rng);

            let loss = embedding.window_loss(&windows(&pos, params.context_size), true, &mut grad)
                + embedding.window_loss(&windows(&neg, params.context_size), false, &mut grad);
            optimizer.update_params(&grad, embedding.weights_mut())?;

            total_loss += loss;
            batches += 1;
        }

        let mean_loss = total_loss / batches as f64;
        info!("epoch {} loss {:.6}", epoch, mean_loss);
        epoch_losses.push(mean_loss);
    }

    debug!(dimensions = embedding.dim(), "Node2Vec training finished");
    Ok(TrainOutcome {
        embedding: embedding.to_rows(),
        epoch_losses,
    })
}

fn check_sizes(num_nodes: usize, params: &Node2VecParams) -> Result<(), Node2VecError> {
    let bounded = |what: &str, len: Option<usize>| match len {
        Some(len) if len <= MAX_BUFFER_LEN => Ok(()),
        _ => Err(Node2VecError::InvalidParameter(format!(
            "{} would exceed {} values",
            what, MAX_BUFFER_LEN
        ))),
    };

    bounded(
        "embedding table (vertices x dimensions)",
        num_nodes.checked_mul(params.dimensions),
    )?;
    // Negative walks outnumber positive ones by numNegativeSamples.
    let batch = params.batch_size.min(num_nodes);
    bounded(
        "walks per batch",
        batch
            .checked_mul(params.walks_per_node)
            .and_then(|n| n.checked_mul(params.num_negative_samples))
            .and_then(|n| n.checked_mul(params.walk_length.checked_add(1)?)),
    )
}
