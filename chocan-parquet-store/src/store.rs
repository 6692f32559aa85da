//! The record store: whole-file load, filter, append, update and remove over
//! one Parquet file per table.
//!
//! Every mutating call follows the same path: load the full table, validate,
//! build the complete new batch in memory, then overwrite the file. A failed
//! validation returns before the write, so the file on disk is left exactly as
//! it was.

use std::path::PathBuf;

use arrow::compute::concat_batches;
use arrow::record_batch::RecordBatch;
use chocan_result::{Error, Result};
use chocan_schema::{IndexKey, Row, TableInfo, Value};
use rustc_hash::FxHashSet;

use crate::config::StoreConfig;
use crate::filter::{Filters, apply_filters};
use crate::reader::read_table_file;
use crate::writer::write_table_file;

#[derive(Debug, Clone, Default)]
pub struct RecordStore {
    config: StoreConfig,
}

impl RecordStore {
    pub fn new(config: StoreConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Location of `table`'s file under the storage directory.
    pub fn table_path(&self, table: &TableInfo) -> PathBuf {
        self.config.table_path(table.name())
    }

    /// Load every row of `table`.
    ///
    /// A missing file is an empty table. A file whose columns differ from the
    /// declaration fails with [`Error::ColumnMismatch`]; stored values are
    /// validated like freshly supplied ones.
    pub fn load_all(&self, table: &TableInfo) -> Result<RecordBatch> {
        let path = self.table_path(table);
        match read_table_file(&path)? {
            None => {
                tracing::debug!(
                    "[RECORD_STORE] no file for table '{}' at {:?}; treating as empty",
                    table.name(),
                    path
                );
                Ok(table.empty_batch())
            }
            Some(batch) => {
                tracing::trace!(
                    "[RECORD_STORE] loaded {} rows from {:?}",
                    batch.num_rows(),
                    path
                );
                table.conform(&batch)
            }
        }
    }

    /// Load the rows of `table` matching every filter.
    pub fn load_filtered(&self, table: &TableInfo, filters: &Filters) -> Result<RecordBatch> {
        let batch = self.load_all(table)?;
        apply_filters(table, batch, filters)
    }

    /// Append `batch` to `table`.
    ///
    /// The batch may list its columns in any order. The whole call fails, and
    /// the file is not written, if any row is invalid or if any index value
    /// already exists in the table or repeats within `batch`.
    pub fn append(&self, table: &TableInfo, batch: &RecordBatch) -> Result<()> {
        let existing = self.load_all(table)?;
        let incoming = table.conform(batch)?;

        let index = table.index_column();
        let existing_keys = index_keys(&existing, index)?;
        let incoming_keys = index_keys(&incoming, index)?;

        let mut seen: FxHashSet<IndexKey> =
            existing_keys.iter().map(|(key, _)| key.clone()).collect();
        let mut duplicates = Vec::new();
        for (key, value) in incoming_keys {
            if !seen.insert(key) {
                duplicates.push(value.render());
            }
        }
        if !duplicates.is_empty() {
            tracing::debug!(
                "[RECORD_STORE] rejected append to '{}': {} duplicate index value(s)",
                table.name(),
                duplicates.len()
            );
            return Err(Error::DuplicateKey {
                table: table.name().to_string(),
                keys: duplicates,
            });
        }

        let combined = concat_batches(&table.arrow_schema(), [&existing, &incoming])?;
        self.persist(table, &combined)?;
        tracing::debug!(
            "[RECORD_STORE] appended {} rows to '{}' ({} total)",
            incoming.num_rows(),
            table.name(),
            combined.num_rows()
        );
        Ok(())
    }

    /// Append row values, see [`RecordStore::append`].
    pub fn append_rows(&self, table: &TableInfo, rows: &[Row]) -> Result<()> {
        let batch = table.batch_from_rows(rows)?;
        self.append(table, &batch)
    }

    /// Change fields of the row whose index column equals `index`.
    ///
    /// Returns the row as stored after the update. Changing the index column
    /// itself is allowed as long as the new value is not held by another row.
    pub fn update(&self, table: &TableInfo, index: &Value, changes: &Row) -> Result<Row> {
        if changes.is_empty() {
            return Err(Error::InvalidArgumentError(format!(
                "update of table '{}' requires at least one field change",
                table.name()
            )));
        }

        let existing = self.load_all(table)?;
        let mut rows = table.rows_from_batch(&existing)?;
        let index_column = table.index_column();
        let target = index.index_key();

        let position = rows
            .iter()
            .position(|row| row.get(index_column).map(Value::index_key).as_ref() == Some(&target))
            .ok_or_else(|| Error::IndexNotFound {
                table: table.name().to_string(),
                index: index.render(),
            })?;

        for (column, value) in changes.iter() {
            table.check_field(value, column)?;
        }

        if let Some(new_index) = changes.get(index_column) {
            let new_key = new_index.index_key();
            let collides = rows.iter().enumerate().any(|(i, row)| {
                i != position && row.get(index_column).map(Value::index_key).as_ref() == Some(&new_key)
            });
            if collides {
                return Err(Error::DuplicateKey {
                    table: table.name().to_string(),
                    keys: vec![new_index.render()],
                });
            }
        }

        for (column, value) in changes.iter() {
            rows[position].set(column, value.clone());
        }

        let updated = table.batch_from_rows(&rows)?;
        self.persist(table, &updated)?;
        tracing::debug!(
            "[RECORD_STORE] updated {} field(s) of row {} in '{}'",
            changes.len(),
            index.render(),
            table.name()
        );
        // Read back from the written batch so values carry their column types.
        let mut stored = table.rows_from_batch(&updated.slice(position, 1))?;
        stored.pop().ok_or_else(|| {
            Error::Internal(format!("updated row {position} missing from batch"))
        })
    }

    /// Delete the row whose index column equals `index`.
    ///
    /// Returns `false`, without touching the file, when no row matches.
    pub fn remove(&self, table: &TableInfo, index: &Value) -> Result<bool> {
        let existing = self.load_all(table)?;
        let index_column = table.index_column();
        let target = index.index_key();

        let mut rows = table.rows_from_batch(&existing)?;
        let before = rows.len();
        rows.retain(|row| row.get(index_column).map(Value::index_key).as_ref() != Some(&target));
        if rows.len() == before {
            tracing::trace!(
                "[RECORD_STORE] remove of {} from '{}' matched nothing",
                index.render(),
                table.name()
            );
            return Ok(false);
        }

        let remaining = table.batch_from_rows(&rows)?;
        self.persist(table, &remaining)?;
        tracing::debug!(
            "[RECORD_STORE] removed row {} from '{}'",
            index.render(),
            table.name()
        );
        Ok(true)
    }

    /// Replace the whole content of `table` with `batch`.
    ///
    /// The batch is validated, but index uniqueness is not checked.
    pub fn overwrite_all(&self, table: &TableInfo, batch: &RecordBatch) -> Result<()> {
        let conformed = table.conform(batch)?;
        self.persist(table, &conformed)
    }

    fn persist(&self, table: &TableInfo, batch: &RecordBatch) -> Result<()> {
        let path = self.table_path(table);
        write_table_file(&path, batch, self.config.writer_config())
    }
}

fn index_keys(batch: &RecordBatch, column: &str) -> Result<Vec<(IndexKey, Value)>> {
    let array = batch
        .column_by_name(column)
        .ok_or_else(|| Error::Internal(format!("index column '{column}' missing from batch")))?;
    (0..batch.num_rows())
        .map(|idx| {
            let value = Value::from_array(array.as_ref(), idx).ok_or_else(|| {
                Error::Internal(format!("unreadable value in index column '{column}'"))
            })?;
            Ok((value.index_key(), value))
        })
        .collect()
}
