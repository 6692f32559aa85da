//! Parquet table file reading.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use arrow::compute::concat_batches;
use arrow::record_batch::RecordBatch;
use bytes::Bytes;
use chocan_result::{Error, Result};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

/// Read a whole table file into one batch.
///
/// Returns `Ok(None)` when the file does not exist. Any other read failure and
/// any decoding failure is reported as [`Error::StorageIo`].
pub fn read_table_file(path: &Path) -> Result<Option<RecordBatch>> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(Error::storage_io(path, err)),
    };

    read_parquet_from_memory(Bytes::from(bytes))
        .map(Some)
        .map_err(|message| Error::storage_io(path, message))
}

fn read_parquet_from_memory(bytes: Bytes) -> std::result::Result<RecordBatch, String> {
    let builder = ParquetRecordBatchReaderBuilder::try_new(bytes)
        .map_err(|e| format!("failed to create Parquet reader: {e}"))?;
    let schema = builder.schema().clone();

    let reader = builder
        .build()
        .map_err(|e| format!("failed to build Parquet reader: {e}"))?;

    let mut batches = Vec::new();
    for batch_result in reader {
        let batch = batch_result.map_err(|e| format!("failed to read Parquet batch: {e}"))?;
        batches.push(batch);
    }

    concat_batches(&schema, &batches).map_err(|e| format!("failed to combine Parquet batches: {e}"))
}
