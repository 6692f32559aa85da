//! Bulk import of header-first CSV files into a table.

use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use arrow::compute::{cast, concat_batches};
use arrow::csv::reader::{Format, ReaderBuilder};
use arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use arrow::record_batch::RecordBatch;
use chocan_parquet_store::RecordStore;
use chocan_result::{Error, Result};
use chocan_schema::{ColumnType, TableInfo};

/// Append every row of the CSV file at `csv_path` to `table`.
///
/// Header names select the columns, in any order, and must match the table's
/// columns exactly. Cells are parsed as the declared column types, then the
/// rows go through [`RecordStore::append`], so a single bad or duplicate row
/// rejects the whole file. Returns the number of rows imported.
pub fn import_csv(store: &RecordStore, table: &TableInfo, csv_path: &Path) -> Result<usize> {
    tracing::trace!(
        "[CSV_IMPORT] importing {:?} into table '{}'",
        csv_path,
        table.name()
    );

    let format = Format::default().with_header(true);
    let header = read_header(csv_path, &format)?;
    table.check_columns(header.iter().map(String::as_str))?;

    let read_schema = reader_schema(table, &header)?;
    let raw = read_batches(csv_path, &format, read_schema)?;
    let batch = restore_binary_columns(table, &raw)?;

    let rows = batch.num_rows();
    store.append(table, &batch)?;
    tracing::debug!(
        "[CSV_IMPORT] imported {} rows from {:?} into '{}'",
        rows,
        csv_path,
        table.name()
    );
    Ok(rows)
}

fn open(path: &Path) -> Result<File> {
    File::open(path).map_err(|err| Error::storage_io(path, err))
}

fn read_header(path: &Path, format: &Format) -> Result<Vec<String>> {
    let (schema, _) = format
        .infer_schema(open(path)?, Some(0))
        .map_err(|err| Error::storage_io(path, format!("failed to read CSV header: {err}")))?;
    Ok(schema.fields().iter().map(|f| f.name().clone()).collect())
}

/// Reader schema in header order. Binary columns are read as text and
/// converted afterwards since the CSV reader cannot parse them directly.
fn reader_schema(table: &TableInfo, header: &[String]) -> Result<SchemaRef> {
    let fields = header
        .iter()
        .map(|name| {
            let column = table
                .column(name)
                .ok_or_else(|| Error::unknown_column(table.name(), name))?;
            let data_type = match column.column_type {
                ColumnType::Binary => DataType::Utf8,
                other => other.data_type(),
            };
            // Nullability is enforced by the table, not the parser.
            Ok(Field::new(name, data_type, true))
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(Arc::new(Schema::new(fields)))
}

fn read_batches(path: &Path, format: &Format, schema: SchemaRef) -> Result<RecordBatch> {
    let reader = ReaderBuilder::new(Arc::clone(&schema))
        .with_format(format.clone())
        .build(open(path)?)
        .map_err(|err| Error::storage_io(path, err))?;

    let mut batches = Vec::new();
    for batch in reader {
        let batch =
            batch.map_err(|err| Error::storage_io(path, format!("failed to parse CSV: {err}")))?;
        tracing::trace!("[CSV_IMPORT] parsed batch of {} rows", batch.num_rows());
        batches.push(batch);
    }
    Ok(concat_batches(&schema, &batches)?)
}

fn restore_binary_columns(table: &TableInfo, batch: &RecordBatch) -> Result<RecordBatch> {
    let schema = batch.schema();
    let mut fields = Vec::with_capacity(schema.fields().len());
    let mut columns = Vec::with_capacity(batch.num_columns());
    for (field, array) in schema.fields().iter().zip(batch.columns()) {
        let is_binary = table
            .column(field.name())
            .is_some_and(|c| c.column_type == ColumnType::Binary);
        if is_binary {
            fields.push(Field::new(field.name(), DataType::Binary, true));
            columns.push(cast(array, &DataType::Binary)?);
        } else {
            fields.push(field.as_ref().clone());
            columns.push(Arc::clone(array));
        }
    }
    Ok(RecordBatch::try_new(Arc::new(Schema::new(fields)), columns)?)
}
