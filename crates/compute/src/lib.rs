pub mod error;
pub mod node2vec;
pub mod operations;

pub use error::{ComputeError, Node2VecError};
pub use node2vec::{train, Node2VecParams, TrainOutcome};
pub use operations::{execute, prepare, ComputedOperation, OperationOutcome, PreparedOperation};
