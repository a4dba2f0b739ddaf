use serde::{Deserialize, Serialize};

use crate::error::Node2VecError;

fn default_num_negative_samples() -> usize {
    1
}

fn default_bias() -> f64 {
    1.0
}

fn default_batch_size() -> usize {
    128
}

fn default_learning_rate() -> f64 {
    0.01
}

/// Training parameters, as sent by clients (camelCase keys).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node2VecParams {
    pub dimensions: usize,
    pub walk_length: usize,
    pub context_size: usize,
    pub walks_per_node: usize,
    pub iterations: usize,
    #[serde(default = "default_num_negative_samples")]
    pub num_negative_samples: usize,
    /// Return parameter.
    #[serde(default = "default_bias")]
    pub p: f64,
    /// In-out parameter.
    #[serde(default = "default_bias")]
    pub q: f64,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    #[serde(default = "default_learning_rate")]
    pub learning_rate: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Node2VecParams {
    /// Parameters with the optional knobs at their defaults.
    pub fn new(
        dimensions: usize,
        walk_length: usize,
        context_size: usize,
        walks_per_node: usize,
        iterations: usize,
    ) -> Self {
        Self {
            dimensions,
            walk_length,
            context_size,
            walks_per_node,
            iterations,
            num_negative_samples: default_num_negative_samples(),
            p: default_bias(),
            q: default_bias(),
            batch_size: default_batch_size(),
            learning_rate: default_learning_rate(),
            seed: None,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn validate(&self) -> Result<(), Node2VecError> {
        let sizes = [
            ("dimensions", self.dimensions),
            ("walkLength", self.walk_length),
            ("contextSize", self.context_size),
            ("walksPerNode", self.walks_per_node),
            ("iterations", self.iterations),
            ("numNegativeSamples", self.num_negative_samples),
            ("batchSize", self.batch_size),
        ];
        for (name, value) in sizes {
            if value == 0 {
                return Err(Node2VecError::InvalidParameter(format!(
                    "{} must be positive",
                    name
                )));
            }
        }
        if self.context_size > self.walk_length {
            return Err(Node2VecError::InvalidParameter(format!(
                "contextSize ({}) must not exceed walkLength ({})",
                self.context_size, self.walk_length
            )));
        }
        for (name, value) in [("p", self.p), ("q", self.q), ("learningRate", self.learning_rate)] {
            if !(value.is_finite() && value > 0.0) {
                return Err(Node2VecError::InvalidParameter(format!(
                    "{} must be a positive number, got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }
}
