//! Column comparison filters for [`RecordStore::load_filtered`](crate::RecordStore::load_filtered).
//!
//! A [`Filters`] value is an AND of `(column, op, value)` triples. Filters are
//! evaluated with Arrow comparison kernels against a one-element scalar built
//! from the filter value in the column's own type.

use std::fmt;
use std::sync::Arc;

use arrow::array::{
    ArrayRef, BinaryArray, BooleanArray, Date32Array, Float64Array, Int64Array, Scalar,
    StringArray, TimestampMicrosecondArray,
};
use arrow::compute::kernels::cmp;
use arrow::compute::{and, cast, filter_record_batch};
use arrow::datatypes::{DataType, Date32Type};
use arrow::record_batch::RecordBatch;
use chocan_result::{Error, Result};
use chocan_schema::{ColumnType, TableInfo, UTC_TIMEZONE, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompareOp {
    Eq,
    Lt,
    Gt,
}

impl CompareOp {
    /// Order in which filter columns are validated.
    const VALIDATION_ORDER: [CompareOp; 3] = [CompareOp::Eq, CompareOp::Lt, CompareOp::Gt];

    pub fn symbol(self) -> &'static str {
        match self {
            CompareOp::Eq => "=",
            CompareOp::Lt => "<",
            CompareOp::Gt => ">",
        }
    }
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Single comparison between a column and a value.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub column: String,
    pub op: CompareOp,
    pub value: Value,
}

impl Filter {
    pub fn new(column: impl Into<String>, op: CompareOp, value: impl Into<Value>) -> Self {
        Self {
            column: column.into(),
            op,
            value: value.into(),
        }
    }

    pub fn eq(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(column, CompareOp::Eq, value)
    }

    pub fn lt(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(column, CompareOp::Lt, value)
    }

    pub fn gt(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(column, CompareOp::Gt, value)
    }

    fn unsupported(&self) -> Error {
        Error::UnsupportedComparison {
            column: self.column.clone(),
            op: self.op.to_string(),
            value: self.value.to_string(),
        }
    }
}

/// Conjunction of filters. An empty set selects every row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filters {
    filters: Vec<Filter>,
}

impl Filters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn eq(self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.with(Filter::eq(column, value))
    }

    pub fn lt(self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.with(Filter::lt(column, value))
    }

    pub fn gt(self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.with(Filter::gt(column, value))
    }

    pub fn with(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn push(&mut self, filter: Filter) {
        self.filters.push(filter);
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Filter> {
        self.filters.iter()
    }

    /// Filters grouped by operator (Eq, then Lt, then Gt), insertion order within a group.
    fn in_validation_order(&self) -> impl Iterator<Item = &Filter> {
        CompareOp::VALIDATION_ORDER
            .into_iter()
            .flat_map(move |op| self.filters.iter().filter(move |f| f.op == op))
    }
}

impl From<Vec<Filter>> for Filters {
    fn from(filters: Vec<Filter>) -> Self {
        Self { filters }
    }
}

impl FromIterator<Filter> for Filters {
    fn from_iter<I: IntoIterator<Item = Filter>>(iter: I) -> Self {
        Self {
            filters: iter.into_iter().collect(),
        }
    }
}

/// Keep the rows of `batch` that satisfy every filter.
///
/// Every filter column is checked against `table` before any comparison runs.
/// `batch` must already conform to `table`.
pub(crate) fn apply_filters(
    table: &TableInfo,
    batch: RecordBatch,
    filters: &Filters,
) -> Result<RecordBatch> {
    if filters.is_empty() {
        return Ok(batch);
    }

    let mut resolved = Vec::with_capacity(filters.len());
    for filter in filters.in_validation_order() {
        let column = table
            .column(&filter.column)
            .ok_or_else(|| Error::unknown_column(table.name(), &filter.column))?;
        resolved.push((filter, column.column_type));
    }

    let mut mask: Option<BooleanArray> = None;
    for (filter, column_type) in resolved {
        let array = batch.column_by_name(&filter.column).ok_or_else(|| {
            Error::Internal(format!("column '{}' missing from loaded batch", filter.column))
        })?;
        let matches = compare(array, column_type, filter)?;
        mask = Some(match mask {
            Some(prev) => and(&prev, &matches)?,
            None => matches,
        });
    }

    match mask {
        Some(mask) => {
            let filtered = filter_record_batch(&batch, &mask)?;
            tracing::trace!(
                "[RECORD_STORE] {} filter(s) kept {} of {} rows",
                filters.len(),
                filtered.num_rows(),
                batch.num_rows()
            );
            Ok(filtered)
        }
        None => Ok(batch),
    }
}

fn compare(array: &ArrayRef, column_type: ColumnType, filter: &Filter) -> Result<BooleanArray> {
    let (lhs, rhs) = comparison_operands(array, column_type, filter)?;
    let rhs = Scalar::new(rhs);
    let result = match filter.op {
        CompareOp::Eq => cmp::eq(&lhs, &rhs),
        CompareOp::Lt => cmp::lt(&lhs, &rhs),
        CompareOp::Gt => cmp::gt(&lhs, &rhs),
    };
    result.map_err(|_| filter.unsupported())
}

/// Pair the column with a single-element array holding the filter value in a
/// comparable type. Numeric columns widen to `Int64` or `Float64` as needed.
fn comparison_operands(
    array: &ArrayRef,
    column_type: ColumnType,
    filter: &Filter,
) -> Result<(ArrayRef, ArrayRef)> {
    let value = &filter.value;
    let operands: (ArrayRef, ArrayRef) = match column_type {
        ColumnType::UInt32 | ColumnType::Int64 | ColumnType::Float64 => {
            let as_int = match (column_type, value) {
                (ColumnType::UInt32 | ColumnType::Int64, Value::Integer(i)) => {
                    i64::try_from(*i).ok()
                }
                _ => None,
            };
            match as_int {
                Some(v) => (
                    cast(array, &DataType::Int64)?,
                    Arc::new(Int64Array::from(vec![v])),
                ),
                None => {
                    let v = value.to_f64().ok_or_else(|| filter.unsupported())?;
                    (
                        cast(array, &DataType::Float64)?,
                        Arc::new(Float64Array::from(vec![v])),
                    )
                }
            }
        }
        ColumnType::Utf8 => match value {
            Value::Text(s) => (
                Arc::clone(array),
                Arc::new(StringArray::from(vec![s.as_str()])),
            ),
            _ => return Err(filter.unsupported()),
        },
        ColumnType::Boolean => match value {
            Value::Boolean(b) => (Arc::clone(array), Arc::new(BooleanArray::from(vec![*b]))),
            _ => return Err(filter.unsupported()),
        },
        ColumnType::Date32 => match value {
            Value::Date(d) => (
                Arc::clone(array),
                Arc::new(Date32Array::from(vec![Date32Type::from_naive_date(*d)])),
            ),
            _ => return Err(filter.unsupported()),
        },
        ColumnType::TimestampUtc => match value {
            Value::DateTime(dt) => (
                Arc::clone(array),
                Arc::new(
                    TimestampMicrosecondArray::from(vec![dt.timestamp_micros()])
                        .with_timezone(UTC_TIMEZONE),
                ),
            ),
            _ => return Err(filter.unsupported()),
        },
        ColumnType::Binary => {
            let bytes = value.as_bytes().ok_or_else(|| filter.unsupported())?;
            (Arc::clone(array), Arc::new(BinaryArray::from(vec![bytes])))
        }
    };
    Ok(operands)
}
