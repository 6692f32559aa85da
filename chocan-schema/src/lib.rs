//! Declarative table schemas for the ChocAn record store.
//!
//! A [`TableInfo`] describes one table file: its ordered columns (the first is
//! the unique index), each column's [`ColumnType`], and optional inclusive
//! character-length and numeric limits. Validation of single values, rows and
//! whole Arrow batches is centralized here, so table-specific business rules
//! (9-digit ids, cents capped at 99) are pure data.
//!
//! ```
//! use chocan_schema::{ColumnType, Row, TableInfo};
//!
//! # fn main() -> chocan_result::Result<()> {
//! let table = TableInfo::builder("test")
//!     .column("ID", ColumnType::Int64)
//!     .column("text", ColumnType::Utf8)
//!     .character_limit("text", 3..=10)
//!     .build()?;
//!
//! table.check_row(&Row::new().with("ID", 1).with("text", "abc"))?;
//! assert!(table.check_field(&"ab".into(), "text").is_err());
//! # Ok(())
//! # }
//! ```

pub mod column_type;
pub mod row;
pub mod table_info;
pub mod tables;
pub mod value;

pub use column_type::{ColumnType, UTC_TIMEZONE};
pub use row::Row;
pub use table_info::{ColumnDef, TableInfo, TableInfoBuilder};
pub use tables::{
    MEMBER_INFO, PROVIDER_DIRECTORY_INFO, SERVICE_LOG_INFO, USER_INFO, UserRole,
};
pub use value::{IndexKey, Value};

// Re-export common types for convenience
pub use arrow::datatypes::SchemaRef;
pub use arrow::record_batch::RecordBatch;
