//! Node2Vec vertex embeddings.
//!
//! Biased random walks are cut into context windows and fed to a skip-gram
//! model with negative sampling. Gradients are computed in closed form and
//! applied with Adam to a single embedding table.

mod model;
mod optimizer;
mod params;
mod trainer;
pub mod walks;

pub use model::Embedding;
pub use optimizer::Adam;
pub use params::Node2VecParams;
pub use trainer::{train, TrainOutcome};
