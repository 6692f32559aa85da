//! Table descriptors: column layout plus declarative value limits.
//!
//! A [`TableInfo`] is the only place table-specific rules live. The record
//! store never special-cases a table; it asks the descriptor to validate rows
//! and to conform batches to the declared Arrow schema.

use std::ops::RangeInclusive;
use std::sync::Arc;

use arrow::datatypes::{Field, Schema, SchemaRef};
use arrow::record_batch::{RecordBatch, RecordBatchOptions};
use chocan_result::{Error, Result};
use rustc_hash::{FxHashMap, FxHashSet};

use crate::column_type::ColumnType;
use crate::row::Row;
use crate::value::Value;

/// A single declared column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDef {
    pub name: String,
    pub column_type: ColumnType,
    pub nullable: bool,
}

/// Immutable schema descriptor for one table file.
///
/// The first declared column is the table's unique index.
#[derive(Debug, Clone)]
pub struct TableInfo {
    name: String,
    columns: Vec<ColumnDef>,
    character_limits: FxHashMap<String, RangeInclusive<usize>>,
    numeric_limits: FxHashMap<String, RangeInclusive<i64>>,
    schema: SchemaRef,
}

/// Builder for [`TableInfo`]. All consistency checks run in [`build`](Self::build).
#[derive(Debug, Clone)]
pub struct TableInfoBuilder {
    name: String,
    columns: Vec<ColumnDef>,
    character_limits: Vec<(String, RangeInclusive<usize>)>,
    numeric_limits: Vec<(String, RangeInclusive<i64>)>,
}

impl TableInfoBuilder {
    pub fn column(mut self, name: impl Into<String>, column_type: ColumnType) -> Self {
        self.columns.push(ColumnDef {
            name: name.into(),
            column_type,
            nullable: false,
        });
        self
    }

    pub fn nullable_column(mut self, name: impl Into<String>, column_type: ColumnType) -> Self {
        self.columns.push(ColumnDef {
            name: name.into(),
            column_type,
            nullable: true,
        });
        self
    }

    /// Inclusive bounds on the character count of a value's string form.
    pub fn character_limit(mut self, column: impl Into<String>, limit: RangeInclusive<usize>) -> Self {
        self.character_limits.push((column.into(), limit));
        self
    }

    /// Inclusive bounds on a numeric value.
    pub fn numeric_limit(mut self, column: impl Into<String>, limit: RangeInclusive<i64>) -> Self {
        self.numeric_limits.push((column.into(), limit));
        self
    }

    /// Validate the declaration and produce the descriptor.
    ///
    /// Fails with [`Error::UnknownColumn`] when a limit names a column that was
    /// never declared, and with [`Error::InvalidArgumentError`] for an empty
    /// column list, repeated column names or an empty limit range.
    pub fn build(self) -> Result<TableInfo> {
        if self.columns.is_empty() {
            return Err(Error::InvalidArgumentError(format!(
                "table '{}' must declare at least one column",
                self.name
            )));
        }

        let mut seen = FxHashSet::default();
        for column in &self.columns {
            if !seen.insert(column.name.as_str()) {
                return Err(Error::InvalidArgumentError(format!(
                    "column '{}' is declared twice in table '{}'",
                    column.name, self.name
                )));
            }
        }

        for (column, limit) in &self.character_limits {
            if !seen.contains(column.as_str()) {
                return Err(Error::unknown_column(&self.name, column));
            }
            if limit.is_empty() {
                return Err(Error::InvalidArgumentError(format!(
                    "character limit for '{column}' in table '{}' is empty",
                    self.name
                )));
            }
        }
        for (column, limit) in &self.numeric_limits {
            if !seen.contains(column.as_str()) {
                return Err(Error::unknown_column(&self.name, column));
            }
            if limit.is_empty() {
                return Err(Error::InvalidArgumentError(format!(
                    "numeric limit for '{column}' in table '{}' is empty",
                    self.name
                )));
            }
        }

        let fields: Vec<Field> = self
            .columns
            .iter()
            .map(|c| Field::new(&c.name, c.column_type.data_type(), c.nullable))
            .collect();
        let schema = Arc::new(Schema::new(fields));

        tracing::trace!(
            "[SCHEMA] built table '{}' with {} columns",
            self.name,
            self.columns.len()
        );

        Ok(TableInfo {
            name: self.name,
            columns: self.columns,
            character_limits: self.character_limits.into_iter().collect(),
            numeric_limits: self.numeric_limits.into_iter().collect(),
            schema,
        })
    }
}

impl TableInfo {
    pub fn builder(name: impl Into<String>) -> TableInfoBuilder {
        TableInfoBuilder {
            name: name.into(),
            columns: Vec::new(),
            character_limits: Vec::new(),
            numeric_limits: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn columns(&self) -> &[ColumnDef] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    /// Name of the index column (always the first declared column).
    pub fn index_column(&self) -> &str {
        // `build` guarantees at least one column.
        &self.columns[0].name
    }

    pub fn character_limit(&self, column: &str) -> Option<&RangeInclusive<usize>> {
        self.character_limits.get(column)
    }

    pub fn numeric_limit(&self, column: &str) -> Option<&RangeInclusive<i64>> {
        self.numeric_limits.get(column)
    }

    /// Arrow schema matching the declared columns, in declared order.
    pub fn arrow_schema(&self) -> SchemaRef {
        Arc::clone(&self.schema)
    }

    /// Zero-row batch with the declared schema.
    pub fn empty_batch(&self) -> RecordBatch {
        RecordBatch::new_empty(self.arrow_schema())
    }

    /// True when every name in `columns` is a declared column.
    pub fn includes_columns(&self, columns: &[&str]) -> bool {
        columns.iter().all(|name| self.column(name).is_some())
    }

    /// Require `found` to be exactly the declared column set, in any order.
    pub fn check_columns<I, S>(&self, found: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let found: Vec<String> = found.into_iter().map(|s| s.as_ref().to_string()).collect();
        let matches = {
            let found_set: FxHashSet<&str> = found.iter().map(String::as_str).collect();
            let expected_set: FxHashSet<&str> = self.column_names().collect();
            found.len() == self.columns.len() && found_set == expected_set
        };

        if !matches {
            return Err(Error::column_mismatch(&self.name, self.column_names(), found));
        }
        Ok(())
    }

    /// Validate one value against one column's type and limits.
    pub fn check_field(&self, value: &Value, field_name: &str) -> Result<()> {
        let column = self
            .column(field_name)
            .ok_or_else(|| Error::unknown_column(&self.name, field_name))?;

        if value.is_null() {
            if column.nullable {
                return Ok(());
            }
            return Err(Error::TypeMismatch {
                column: field_name.to_string(),
                expected: format!("non-null {}", column.column_type),
                value: value.to_string(),
            });
        }

        if !column.column_type.admits(value) {
            return Err(Error::TypeMismatch {
                column: field_name.to_string(),
                expected: column.column_type.to_string(),
                value: value.to_string(),
            });
        }

        if let Some(limit) = self.character_limits.get(field_name) {
            let len = value.char_len();
            if !limit.contains(&len) {
                return Err(Error::RangeError {
                    column: field_name.to_string(),
                    value: value.to_string(),
                    limit: format!("character limit [{}, {}]", limit.start(), limit.end()),
                });
            }
        }

        if let Some(limit) = self.numeric_limits.get(field_name) {
            let within = match value {
                Value::Integer(i) => {
                    (i128::from(*limit.start())..=i128::from(*limit.end())).contains(i)
                }
                Value::Float(f) => *f >= *limit.start() as f64 && *f <= *limit.end() as f64,
                other => {
                    return Err(Error::TypeMismatch {
                        column: field_name.to_string(),
                        expected: "numeric".to_string(),
                        value: other.to_string(),
                    });
                }
            };
            if !within {
                return Err(Error::RangeError {
                    column: field_name.to_string(),
                    value: value.to_string(),
                    limit: format!("numeric limit [{}, {}]", limit.start(), limit.end()),
                });
            }
        }

        Ok(())
    }

    /// Validate a single record: exact column set, then every field.
    pub fn check_row(&self, row: &Row) -> Result<()> {
        self.check_columns(row.columns())?;
        for (column, value) in row.iter() {
            self.check_field(value, column)?;
        }
        Ok(())
    }

    /// Validate every row of `batch`.
    pub fn check_table(&self, batch: &RecordBatch) -> Result<()> {
        self.conform(batch).map(|_| ())
    }

    /// Validate `batch` and rebuild it with the declared column order and types.
    ///
    /// Input columns may arrive in any order and as any Arrow type whose values
    /// the declared column admits (e.g. `Int64` data for a `UInt32` column).
    pub fn conform(&self, batch: &RecordBatch) -> Result<RecordBatch> {
        let batch_schema = batch.schema();
        self.check_columns(batch_schema.fields().iter().map(|f| f.name()))?;

        let num_rows = batch.num_rows();
        let mut arrays = Vec::with_capacity(self.columns.len());
        for column in &self.columns {
            let array = batch.column_by_name(&column.name).ok_or_else(|| {
                Error::Internal(format!("column '{}' vanished from batch", column.name))
            })?;

            let mut values = Vec::with_capacity(num_rows);
            for idx in 0..num_rows {
                let value = Value::from_array(array.as_ref(), idx).ok_or_else(|| {
                    Error::TypeMismatch {
                        column: column.name.clone(),
                        expected: column.column_type.to_string(),
                        value: format!("<{}>", array.data_type()),
                    }
                })?;
                self.check_field(&value, &column.name)?;
                values.push(value);
            }
            arrays.push(column.column_type.build_array(&column.name, &values)?);
        }

        let options = RecordBatchOptions::new().with_row_count(Some(num_rows));
        Ok(RecordBatch::try_new_with_options(
            self.arrow_schema(),
            arrays,
            &options,
        )?)
    }

    /// Validate `rows` and assemble them into a batch with the declared schema.
    pub fn batch_from_rows(&self, rows: &[Row]) -> Result<RecordBatch> {
        for row in rows {
            self.check_row(row)?;
        }

        let mut arrays = Vec::with_capacity(self.columns.len());
        for column in &self.columns {
            let values = rows
                .iter()
                .map(|row| {
                    row.get(&column.name).ok_or_else(|| {
                        Error::Internal(format!("validated row lacks column '{}'", column.name))
                    })
                })
                .collect::<Result<Vec<&Value>>>()?;
            arrays.push(column.column_type.build_array(&column.name, values)?);
        }

        let options = RecordBatchOptions::new().with_row_count(Some(rows.len()));
        Ok(RecordBatch::try_new_with_options(
            self.arrow_schema(),
            arrays,
            &options,
        )?)
    }

    /// Split a batch into rows, keeping the batch's column order.
    pub fn rows_from_batch(&self, batch: &RecordBatch) -> Result<Vec<Row>> {
        let schema = batch.schema();
        let mut rows = Vec::with_capacity(batch.num_rows());
        for idx in 0..batch.num_rows() {
            let mut row = Row::new();
            for (field, array) in schema.fields().iter().zip(batch.columns()) {
                let value = Value::from_array(array.as_ref(), idx).ok_or_else(|| {
                    Error::TypeMismatch {
                        column: field.name().clone(),
                        expected: "a supported column type".to_string(),
                        value: format!("<{}>", array.data_type()),
                    }
                })?;
                row.set(field.name().as_str(), value);
            }
            rows.push(row);
        }
        Ok(rows)
    }
}
