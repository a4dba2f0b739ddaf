//! Parquet exchange of entities keyed by external ids.
//!
//! Inside the service entities are addressed by ordered index; other
//! systems address the same rows by stable external ids. The "unordered
//! disk" layout writes one directory per entity GUID so those systems can
//! read it, and reads such directories back with the ids re-indexed.

pub mod error;
pub mod unordered;

pub use error::StorageError;
pub use unordered::UnorderedDisk;
