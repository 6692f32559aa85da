//! CSV report files.
//!
//! [`ReportWriter`] renders a batch for people rather than machines: dates as
//! `MM-DD-YYYY`, timezone-aware timestamps as `MM-DD-YYYY HH:MM` in a display
//! timezone, and binary values as hex. No schema validation happens here.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use arrow::array::{Array, ArrayRef, StringArray};
use arrow::csv::WriterBuilder;
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use chocan_parquet_store::StoreConfig;
use chocan_result::{Error, Result};
use chocan_schema::Value;
use chrono::{DateTime, FixedOffset, Local, Utc};

/// Format of date cells.
pub const DATE_FORMAT: &str = "%m-%d-%Y";
/// Format of timezone-aware timestamp cells.
pub const DATETIME_FORMAT: &str = "%m-%d-%Y %H:%M";

/// Timezone timestamps are shown in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReportTimezone {
    #[default]
    Local,
    Fixed(FixedOffset),
}

impl ReportTimezone {
    fn format(self, instant: &DateTime<Utc>) -> String {
        match self {
            ReportTimezone::Local => instant
                .with_timezone(&Local)
                .format(DATETIME_FORMAT)
                .to_string(),
            ReportTimezone::Fixed(offset) => instant
                .with_timezone(&offset)
                .format(DATETIME_FORMAT)
                .to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ReportWriter {
    config: StoreConfig,
    timezone: ReportTimezone,
}

impl ReportWriter {
    /// Writer targeting the report directory of `config`.
    pub fn new(config: StoreConfig) -> Self {
        Self {
            config,
            timezone: ReportTimezone::default(),
        }
    }

    pub fn with_timezone(mut self, timezone: ReportTimezone) -> Self {
        self.timezone = timezone;
        self
    }

    pub fn report_dir(&self) -> &Path {
        self.config.report_dir()
    }

    /// Write `batch` to `<report_dir>/<name>.csv`, replacing any existing file.
    pub fn save(&self, batch: &RecordBatch, name: &str) -> Result<PathBuf> {
        let path = self.config.report_path(name);
        tracing::trace!(
            "[REPORT] saving {} rows x {} columns to {:?}",
            batch.num_rows(),
            batch.num_columns(),
            path
        );

        let rendered = self.render_batch(batch)?;
        let file = File::create(&path).map_err(|err| Error::storage_io(&path, err))?;

        let mut csv_writer = WriterBuilder::new()
            .with_header(true)
            .build(BufWriter::new(file));
        csv_writer
            .write(&rendered)
            .map_err(|err| Error::storage_io(&path, format!("failed to write CSV: {err}")))?;
        let mut inner = csv_writer.into_inner();
        inner
            .flush()
            .map_err(|err| Error::storage_io(&path, format!("failed to flush CSV: {err}")))?;

        tracing::debug!("[REPORT] wrote report '{}' to {:?}", name, path);
        Ok(path)
    }

    /// Replace date, timestamp and binary columns with their display strings.
    fn render_batch(&self, batch: &RecordBatch) -> Result<RecordBatch> {
        let schema = batch.schema();
        let mut fields = Vec::with_capacity(schema.fields().len());
        let mut columns = Vec::with_capacity(batch.num_columns());

        for (field, array) in schema.fields().iter().zip(batch.columns()) {
            match self.render_column(array)? {
                Some(rendered) => {
                    fields.push(Field::new(field.name(), DataType::Utf8, true));
                    columns.push(rendered);
                }
                None => {
                    fields.push(field.as_ref().clone());
                    columns.push(Arc::clone(array));
                }
            }
        }

        Ok(RecordBatch::try_new(Arc::new(Schema::new(fields)), columns)?)
    }

    /// `None` when the column is written as-is.
    fn render_column(&self, array: &ArrayRef) -> Result<Option<ArrayRef>> {
        let kind = match array.data_type() {
            DataType::Date32 | DataType::Date64 => CellKind::Date,
            DataType::Timestamp(_, Some(_)) => CellKind::Timestamp,
            DataType::Binary | DataType::LargeBinary => CellKind::Hex,
            _ => return Ok(None),
        };

        let cells = (0..array.len())
            .map(|idx| {
                let value = Value::from_array(array.as_ref(), idx).ok_or_else(|| {
                    Error::Internal(format!("cannot read {} report cell", array.data_type()))
                })?;
                Ok(self.render_cell(kind, &value))
            })
            .collect::<Result<Vec<Option<String>>>>()?;

        Ok(Some(Arc::new(StringArray::from(cells))))
    }

    fn render_cell(&self, kind: CellKind, value: &Value) -> Option<String> {
        match (kind, value) {
            (_, Value::Null) => None,
            (CellKind::Date, Value::Date(date)) => Some(date.format(DATE_FORMAT).to_string()),
            (CellKind::Timestamp, Value::DateTime(instant)) => Some(self.timezone.format(instant)),
            (_, other) => Some(other.render()),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum CellKind {
    Date,
    Timestamp,
    Hex,
}
