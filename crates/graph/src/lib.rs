pub mod context;
pub mod edges;
pub mod example;
pub mod project;
pub mod store;

pub use context::{OperationContext, OperationOutputs};
pub use edges::EdgeList;
pub use project::{Project, ProjectRegistry, ProjectSummary};
pub use store::{EntityStore, StoreStats};
