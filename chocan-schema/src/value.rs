//! Dynamically typed cell values.
//!
//! A [`Value`] is what callers hand to the record store (update changes, filter
//! operands) and what the store hands back for single rows. Values are checked
//! against a column's [`ColumnType`](crate::ColumnType) before they reach an
//! Arrow array.

use std::fmt;

use arrow::array::{Array, AsArray};
use arrow::datatypes::{
    DataType, Date32Type, Date64Type, Float32Type, Float64Type, Int8Type, Int16Type, Int32Type,
    Int64Type, TimeUnit, TimestampMicrosecondType, TimestampMillisecondType,
    TimestampNanosecondType, TimestampSecondType, UInt8Type, UInt16Type, UInt32Type, UInt64Type,
};
use chrono::{DateTime, NaiveDate, TimeDelta, Utc};

/// A single cell value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Integer(i128),
    Float(f64),
    Text(String),
    Boolean(bool),
    Date(NaiveDate),
    DateTime(DateTime<Utc>),
    Binary(Vec<u8>),
}

macro_rules! impl_from_for_value {
    ($variant:ident, $($t:ty),*) => {
        $(
            impl From<$t> for Value {
                fn from(v: $t) -> Self {
                    Value::$variant(v.into())
                }
            }
        )*
    };
}

impl_from_for_value!(Integer, i8, i16, i32, i64, i128, u8, u16, u32, u64);
impl_from_for_value!(Float, f32, f64);
impl_from_for_value!(Text, String);
impl_from_for_value!(Boolean, bool);
impl_from_for_value!(Date, NaiveDate);
impl_from_for_value!(DateTime, DateTime<Utc>);
impl_from_for_value!(Binary, Vec<u8>);

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<&[u8]> for Value {
    fn from(v: &[u8]) -> Self {
        Value::Binary(v.to_vec())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

/// Hashable identity of an index column value, used for uniqueness checks.
///
/// Integral floats collapse onto the matching integer so `1` and `1.0` collide.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IndexKey {
    Null,
    Int(i128),
    Float(u64),
    Str(String),
    Bool(bool),
    Date(NaiveDate),
    DateTime(DateTime<Utc>),
    Bytes(Vec<u8>),
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Integer(_) => "integer",
            Value::Float(_) => "float",
            Value::Text(_) => "string",
            Value::Boolean(_) => "boolean",
            Value::Date(_) => "date",
            Value::DateTime(_) => "datetime",
            Value::Binary(_) => "binary",
        }
    }

    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Value::Integer(_) | Value::Float(_))
    }

    pub fn to_i128(&self) -> Option<i128> {
        match self {
            Value::Integer(i) => Some(*i),
            Value::Float(f) if f.is_finite() && f.fract() == 0.0 => {
                // Integral floats beyond i128 are not representable anyway.
                let truncated = *f as i128;
                (truncated as f64 == *f).then_some(truncated)
            }
            _ => None,
        }
    }

    pub fn to_u32(&self) -> Option<u32> {
        self.to_i128().and_then(|i| u32::try_from(i).ok())
    }

    pub fn to_i64(&self) -> Option<i64> {
        self.to_i128().and_then(|i| i64::try_from(i).ok())
    }

    pub fn to_f64(&self) -> Option<f64> {
        match self {
            Value::Integer(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Byte view for binary columns. Text is stored as its UTF-8 bytes.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Binary(b) => Some(b),
            Value::Text(s) => Some(s.as_bytes()),
            _ => None,
        }
    }

    /// Plain string form of the value, the text character limits are measured on.
    pub fn render(&self) -> String {
        match self {
            Value::Null => "null".to_string(),
            Value::Integer(i) => i.to_string(),
            Value::Float(f) => {
                if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e16 {
                    format!("{f:.1}")
                } else {
                    f.to_string()
                }
            }
            Value::Text(s) => s.clone(),
            Value::Boolean(b) => b.to_string(),
            Value::Date(d) => d.format("%Y-%m-%d").to_string(),
            Value::DateTime(dt) => dt.format("%Y-%m-%d %H:%M:%S%:z").to_string(),
            Value::Binary(bytes) => hex_string(bytes),
        }
    }

    /// Length checked by character limits. Binary values count bytes.
    pub fn char_len(&self) -> usize {
        match self {
            Value::Binary(bytes) => bytes.len(),
            Value::Text(s) => s.chars().count(),
            other => other.render().chars().count(),
        }
    }

    pub fn index_key(&self) -> IndexKey {
        match self {
            Value::Null => IndexKey::Null,
            Value::Integer(i) => IndexKey::Int(*i),
            Value::Float(f) => match self.to_i128() {
                Some(i) => IndexKey::Int(i),
                None => IndexKey::Float(f.to_bits()),
            },
            Value::Text(s) => IndexKey::Str(s.clone()),
            Value::Boolean(b) => IndexKey::Bool(*b),
            Value::Date(d) => IndexKey::Date(*d),
            Value::DateTime(dt) => IndexKey::DateTime(*dt),
            Value::Binary(b) => IndexKey::Bytes(b.clone()),
        }
    }

    /// Read the value at `index` of an Arrow array.
    ///
    /// Returns `None` when the array's type has no [`Value`] counterpart
    /// (lists, structs, decimals and similar) or when a date or timestamp
    /// lies outside the representable calendar range.
    pub fn from_array(array: &dyn Array, index: usize) -> Option<Value> {
        if array.is_null(index) {
            return Some(Value::Null);
        }

        let value = match array.data_type() {
            DataType::Null => Value::Null,
            DataType::Int8 => Value::Integer(array.as_primitive::<Int8Type>().value(index).into()),
            DataType::Int16 => {
                Value::Integer(array.as_primitive::<Int16Type>().value(index).into())
            }
            DataType::Int32 => {
                Value::Integer(array.as_primitive::<Int32Type>().value(index).into())
            }
            DataType::Int64 => {
                Value::Integer(array.as_primitive::<Int64Type>().value(index).into())
            }
            DataType::UInt8 => {
                Value::Integer(array.as_primitive::<UInt8Type>().value(index).into())
            }
            DataType::UInt16 => {
                Value::Integer(array.as_primitive::<UInt16Type>().value(index).into())
            }
            DataType::UInt32 => {
                Value::Integer(array.as_primitive::<UInt32Type>().value(index).into())
            }
            DataType::UInt64 => {
                Value::Integer(array.as_primitive::<UInt64Type>().value(index).into())
            }
            DataType::Float32 => {
                Value::Float(array.as_primitive::<Float32Type>().value(index).into())
            }
            DataType::Float64 => Value::Float(array.as_primitive::<Float64Type>().value(index)),
            DataType::Utf8 => Value::Text(array.as_string::<i32>().value(index).to_string()),
            DataType::LargeUtf8 => Value::Text(array.as_string::<i64>().value(index).to_string()),
            DataType::Boolean => Value::Boolean(array.as_boolean().value(index)),
            DataType::Date32 => {
                let days = array.as_primitive::<Date32Type>().value(index);
                let offset = TimeDelta::try_days(days.into())?;
                Value::Date(DateTime::UNIX_EPOCH.date_naive().checked_add_signed(offset)?)
            }
            DataType::Date64 => {
                let millis = array.as_primitive::<Date64Type>().value(index);
                Value::Date(DateTime::from_timestamp_millis(millis)?.date_naive())
            }
            DataType::Timestamp(unit, _) => {
                let micros = match unit {
                    TimeUnit::Second => array
                        .as_primitive::<TimestampSecondType>()
                        .value(index)
                        .checked_mul(1_000_000)?,
                    TimeUnit::Millisecond => array
                        .as_primitive::<TimestampMillisecondType>()
                        .value(index)
                        .checked_mul(1_000)?,
                    TimeUnit::Microsecond => array
                        .as_primitive::<TimestampMicrosecondType>()
                        .value(index),
                    TimeUnit::Nanosecond => {
                        array.as_primitive::<TimestampNanosecondType>().value(index) / 1_000
                    }
                };
                Value::DateTime(DateTime::from_timestamp_micros(micros)?)
            }
            DataType::Binary => Value::Binary(array.as_binary::<i32>().value(index).to_vec()),
            DataType::LargeBinary => {
                Value::Binary(array.as_binary::<i64>().value(index).to_vec())
            }
            _ => return None,
        };
        Some(value)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Text(s) => write!(f, "\"{}\"", s.escape_default()),
            other => f.write_str(&other.render()),
        }
    }
}

pub(crate) fn hex_string(bytes: &[u8]) -> String {
    use fmt::Write;

    let mut out = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        let _ = write!(out, "{byte:02x}");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::{
        ArrayRef, Date32Array, Date64Array, Int64Array, StringArray, TimestampMillisecondArray,
    };
    use std::sync::Arc;

    #[test]
    fn render_matches_plain_string_form() {
        assert_eq!(Value::from(123456789u32).render(), "123456789");
        assert_eq!(Value::from(2.0).render(), "2.0");
        assert_eq!(Value::from(1.1).render(), "1.1");
        assert_eq!(Value::from("abc").render(), "abc");
        assert_eq!(Value::from(vec![0xde_u8, 0xad]).render(), "dead");
        let day = NaiveDate::from_ymd_opt(2023, 11, 5).unwrap();
        assert_eq!(Value::from(day).render(), "2023-11-05");
    }

    #[test]
    fn char_len_counts_characters_not_bytes() {
        assert_eq!(Value::from("née").char_len(), 3);
        assert_eq!(Value::from(vec![1u8, 2, 3, 4]).char_len(), 4);
        assert_eq!(Value::from(12345u32).char_len(), 5);
    }

    #[test]
    fn integral_floats_share_integer_keys() {
        assert_eq!(Value::from(1).index_key(), Value::from(1.0).index_key());
        assert_ne!(Value::from(1).index_key(), Value::from(1.5).index_key());
    }

    #[test]
    fn option_maps_to_null() {
        assert_eq!(Value::from(None::<&str>), Value::Null);
        assert_eq!(Value::from(Some("x")), Value::Text("x".into()));
    }

    #[test]
    fn from_array_reads_supported_types() {
        let ints: ArrayRef = Arc::new(Int64Array::from(vec![Some(5), None]));
        assert_eq!(Value::from_array(ints.as_ref(), 0), Some(Value::Integer(5)));
        assert_eq!(Value::from_array(ints.as_ref(), 1), Some(Value::Null));

        let text: ArrayRef = Arc::new(StringArray::from(vec!["hi"]));
        assert_eq!(Value::from_array(text.as_ref(), 0), Some(Value::from("hi")));

        let days: ArrayRef = Arc::new(Date32Array::from(vec![19_723]));
        assert_eq!(
            Value::from_array(days.as_ref(), 0),
            Some(Value::Date(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()))
        );

        let ts: ArrayRef = Arc::new(TimestampMillisecondArray::from(vec![1_000]));
        let expected = DateTime::from_timestamp(1, 0).unwrap();
        assert_eq!(
            Value::from_array(ts.as_ref(), 0),
            Some(Value::DateTime(expected))
        );
    }

    #[test]
    fn out_of_range_dates_are_unreadable() {
        let days: ArrayRef = Arc::new(Date32Array::from(vec![i32::MAX, i32::MIN]));
        assert_eq!(Value::from_array(days.as_ref(), 0), None);
        assert_eq!(Value::from_array(days.as_ref(), 1), None);

        let millis: ArrayRef = Arc::new(Date64Array::from(vec![i64::MAX]));
        assert_eq!(Value::from_array(millis.as_ref(), 0), None);
    }
}
