//! Parquet table file writing.

use std::fs;
use std::path::Path;

use arrow::record_batch::RecordBatch;
use chocan_result::{Error, Result};
use parquet::arrow::ArrowWriter;

use crate::config::WriterConfig;

/// Encode a RecordBatch as a complete in-memory Parquet file.
pub fn write_parquet_to_memory(batch: &RecordBatch, config: &WriterConfig) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();

    let mut writer = ArrowWriter::try_new(&mut buffer, batch.schema(), Some(config.properties()))
        .map_err(|e| Error::Internal(format!("failed to create Parquet writer: {}", e)))?;

    writer
        .write(batch)
        .map_err(|e| Error::Internal(format!("failed to write RecordBatch to Parquet: {}", e)))?;

    writer
        .close()
        .map_err(|e| Error::Internal(format!("failed to close Parquet writer: {}", e)))?;

    Ok(buffer)
}

/// Replace the file at `path` with `batch`.
///
/// The Parquet image is fully encoded before the file is touched, so an
/// encoding failure never truncates the previous contents.
pub fn write_table_file(path: &Path, batch: &RecordBatch, config: &WriterConfig) -> Result<()> {
    let bytes = write_parquet_to_memory(batch, config)?;
    fs::write(path, bytes).map_err(|err| Error::storage_io(path, err))
}
