use thiserror::Error;
use weave_core::EntityKind;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("core error: {0}")]
    Core(#[from] weave_core::WeaveError),

    #[error("parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("walk error: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("missing or mistyped column: {0}")]
    MissingColumn(String),

    #[error("id {0} is not in the vertex set")]
    UnknownId(i64),

    #[error("index {index} out of range for length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("{0} requires a vertex set")]
    MissingVertexSet(String),

    #[error("no parquet parts under {0}")]
    NoParts(std::path::PathBuf),

    #[error("can't exchange {0} entities through unordered disk")]
    UnsupportedKind(EntityKind),
}
