//! Closed set of column types a table may declare.
//!
//! Every [`ColumnType`] maps onto exactly one Arrow [`DataType`], which is the
//! type the column carries in memory and on disk. Whether a [`Value`] can be
//! stored in a column is decided here so that validation and array
//! construction always agree.

use std::fmt;
use std::sync::Arc;

use arrow::array::{
    ArrayRef, BinaryArray, BooleanArray, Date32Array, Float64Array, Int64Array, StringArray,
    TimestampMicrosecondArray, UInt32Array,
};
use arrow::datatypes::{DataType, Date32Type, TimeUnit};
use chocan_result::{Error, Result};

use crate::value::Value;

/// Timezone tag attached to every [`ColumnType::TimestampUtc`] column.
pub const UTC_TIMEZONE: &str = "UTC";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnType {
    UInt32,
    Int64,
    Float64,
    Utf8,
    Boolean,
    /// Calendar date without a time of day.
    Date32,
    /// Timezone-aware instant, stored as microseconds since the epoch in UTC.
    TimestampUtc,
    /// Opaque bytes, such as password hashes.
    Binary,
}

impl ColumnType {
    /// The Arrow type this column is stored as.
    pub fn data_type(self) -> DataType {
        match self {
            ColumnType::UInt32 => DataType::UInt32,
            ColumnType::Int64 => DataType::Int64,
            ColumnType::Float64 => DataType::Float64,
            ColumnType::Utf8 => DataType::Utf8,
            ColumnType::Boolean => DataType::Boolean,
            ColumnType::Date32 => DataType::Date32,
            ColumnType::TimestampUtc => {
                DataType::Timestamp(TimeUnit::Microsecond, Some(UTC_TIMEZONE.into()))
            }
            ColumnType::Binary => DataType::Binary,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ColumnType::UInt32 => "uint32",
            ColumnType::Int64 => "int64",
            ColumnType::Float64 => "float64",
            ColumnType::Utf8 => "string",
            ColumnType::Boolean => "bool",
            ColumnType::Date32 => "date32",
            ColumnType::TimestampUtc => "timestamp[us, tz=UTC]",
            ColumnType::Binary => "binary",
        }
    }

    pub fn is_numeric(self) -> bool {
        matches!(
            self,
            ColumnType::UInt32 | ColumnType::Int64 | ColumnType::Float64
        )
    }

    /// Whether a non-null `value` can be represented in this column.
    ///
    /// `Null` is never admitted here; nullability is a property of the column
    /// definition, not of its type.
    pub fn admits(self, value: &Value) -> bool {
        match self {
            ColumnType::UInt32 => value.to_u32().is_some(),
            ColumnType::Int64 => value.to_i64().is_some(),
            ColumnType::Float64 => value.to_f64().is_some(),
            ColumnType::Utf8 => matches!(value, Value::Text(_)),
            ColumnType::Boolean => matches!(value, Value::Boolean(_)),
            ColumnType::Date32 => matches!(value, Value::Date(_)),
            ColumnType::TimestampUtc => matches!(value, Value::DateTime(_)),
            ColumnType::Binary => value.as_bytes().is_some(),
        }
    }

    /// Build an array of this type from `values`.
    ///
    /// `Null` becomes an Arrow null. Any other value the type does not admit is
    /// reported as a [`Error::TypeMismatch`] against `column`.
    pub fn build_array<'a, I>(self, column: &str, values: I) -> Result<ArrayRef>
    where
        I: IntoIterator<Item = &'a Value>,
    {
        let values: Vec<&Value> = values.into_iter().collect();
        let array: ArrayRef = match self {
            ColumnType::UInt32 => Arc::new(UInt32Array::from(
                self.convert_all(column, &values, Value::to_u32)?,
            )),
            ColumnType::Int64 => Arc::new(Int64Array::from(
                self.convert_all(column, &values, Value::to_i64)?,
            )),
            ColumnType::Float64 => Arc::new(Float64Array::from(
                self.convert_all(column, &values, Value::to_f64)?,
            )),
            ColumnType::Utf8 => Arc::new(StringArray::from(self.convert_all(
                column,
                &values,
                |v| match v {
                    Value::Text(s) => Some(s.clone()),
                    _ => None,
                },
            )?)),
            ColumnType::Boolean => Arc::new(BooleanArray::from(self.convert_all(
                column,
                &values,
                |v| match v {
                    Value::Boolean(b) => Some(*b),
                    _ => None,
                },
            )?)),
            ColumnType::Date32 => Arc::new(Date32Array::from(self.convert_all(
                column,
                &values,
                |v| match v {
                    Value::Date(d) => Some(Date32Type::from_naive_date(*d)),
                    _ => None,
                },
            )?)),
            ColumnType::TimestampUtc => Arc::new(
                TimestampMicrosecondArray::from(self.convert_all(column, &values, |v| {
                    match v {
                        Value::DateTime(dt) => Some(dt.timestamp_micros()),
                        _ => None,
                    }
                })?)
                .with_timezone(UTC_TIMEZONE),
            ),
            ColumnType::Binary => {
                let bytes = self.convert_all(column, &values, |v| v.as_bytes())?;
                Arc::new(BinaryArray::from(bytes))
            }
        };
        Ok(array)
    }

    fn convert_all<'a, T, F>(
        self,
        column: &str,
        values: &[&'a Value],
        convert: F,
    ) -> Result<Vec<Option<T>>>
    where
        F: Fn(&'a Value) -> Option<T>,
    {
        values
            .iter()
            .map(|value| {
                if value.is_null() {
                    return Ok(None);
                }
                convert(*value)
                    .map(Some)
                    .ok_or_else(|| Error::TypeMismatch {
                        column: column.to_string(),
                        expected: self.name().to_string(),
                        value: value.to_string(),
                    })
            })
            .collect()
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
