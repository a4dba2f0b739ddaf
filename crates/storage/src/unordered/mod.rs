//! Read and write entities in the unordered disk layout:
//! `<dir>/<guid>/part-*.parquet` plus an empty `_SUCCESS` marker.

mod read;
pub mod schema;

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use arrow::record_batch::RecordBatch;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;
use tracing::{debug, info};
use walkdir::WalkDir;
use weave_core::config::StorageConfig;
use weave_core::{EntityKind, Guid, VertexSet};
use weave_graph::EntityStore;

use crate::error::StorageError;

pub use read::batches_to_entity;
pub use schema::entity_to_batch;

const PART_FILE: &str = "part-00000.parquet";
const SUCCESS_MARKER: &str = "_SUCCESS";

/// Root directory of the unordered disk.
#[derive(Debug, Clone)]
pub struct UnorderedDisk {
    dir: PathBuf,
}

impl UnorderedDisk {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn from_config(config: &StorageConfig) -> Self {
        Self::new(config.unordered_data_dir.clone())
    }

    pub fn entity_dir(&self, guid: &Guid) -> PathBuf {
        self.dir.join(guid.to_string())
    }

    /// Write the entity `guid` keyed by external ids. Returns the row count.
    ///
    /// `vs1` is the vertex set of an attribute or the source side of an edge
    /// bundle, `vs2` the destination side.
    pub fn write(
        &self,
        store: &EntityStore,
        guid: &Guid,
        vs1: Option<&Guid>,
        vs2: Option<&Guid>,
    ) -> Result<u64, StorageError> {
        let entity = store.get(guid)?;
        let vs1 = lookup_vertex_set(store, vs1)?;
        let vs2 = lookup_vertex_set(store, vs2)?;
        info!(%guid, kind = %entity.kind(), "Reindexing entity to use external ids");

        let batch = entity_to_batch(entity, vs1, vs2)?;
        let rows = batch.num_rows() as u64;

        let entity_dir = self.entity_dir(guid);
        fs::create_dir_all(&entity_dir)?;
        write_batch(&batch, &entity_dir.join(PART_FILE))?;
        File::create(entity_dir.join(SUCCESS_MARKER))?;

        debug!(path = %entity_dir.display(), rows, "Wrote unordered entity");
        Ok(rows)
    }

    /// Read every part under `<dir>/<guid>` as an entity of `kind` and store
    /// it under `guid`. Returns the row count.
    pub fn read(
        &self,
        store: &mut EntityStore,
        guid: Guid,
        kind: EntityKind,
        vs1: Option<&Guid>,
        vs2: Option<&Guid>,
    ) -> Result<u64, StorageError> {
        let entity_dir = self.entity_dir(&guid);
        info!(%guid, %kind, path = %entity_dir.display(), "Reindexing entity to use ordered ids");

        let parts = part_files(&entity_dir)?;
        if parts.is_empty() {
            return Err(StorageError::NoParts(entity_dir));
        }
        let mut batches = Vec::new();
        for part in parts {
            batches.extend(read_batches(&part)?);
        }
        let rows = batches.iter().map(|b| b.num_rows() as u64).sum();

        let entity = {
            let vs1 = lookup_vertex_set(store, vs1)?;
            let vs2 = lookup_vertex_set(store, vs2)?;
            batches_to_entity(kind, &batches, vs1, vs2)?
        };
        store.insert_with_guid(guid, entity);
        Ok(rows)
    }
}

fn lookup_vertex_set<'s>(
    store: &'s EntityStore,
    guid: Option<&Guid>,
) -> Result<Option<&'s VertexSet>, StorageError> {
    match guid {
        Some(g) => Ok(Some(store.vertex_set(g)?)),
        None => Ok(None),
    }
}

/// Parquet parts in an entity directory, sorted by file name.
fn part_files(entity_dir: &Path) -> Result<Vec<PathBuf>, StorageError> {
    let mut parts = Vec::new();
    for entry in WalkDir::new(entity_dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy();
        // Skip markers and hidden checksum files.
        if name.starts_with('_') || name.starts_with('.') || !entry.file_type().is_file() {
            continue;
        }
        parts.push(entry.into_path());
    }
    Ok(parts)
}

fn write_batch(batch: &RecordBatch, path: &Path) -> Result<(), StorageError> {
    let file = File::create(path)?;
    let props = WriterProperties::builder()
        .set_compression(Compression::ZSTD(Default::default()))
        .build();
    let mut writer = ArrowWriter::try_new(file, batch.schema(), Some(props))?;
    writer.write(batch)?;
    writer.close()?;
    Ok(())
}

fn read_batches(path: &Path) -> Result<Vec<RecordBatch>, StorageError> {
    let file = File::open(path)?;
    let reader = ParquetRecordBatchReaderBuilder::try_new(file)?.build()?;
    let mut batches = Vec::new();
    for batch in reader {
        batches.push(batch?);
    }
    Ok(batches)
}
