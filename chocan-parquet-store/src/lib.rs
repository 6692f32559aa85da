//! Whole-file Parquet persistence for ChocAn tables.
//!
//! Each table lives in a single `<storage_dir>/<table>.pkt` file that is
//! rewritten in full on every mutation. [`RecordStore`] validates all input
//! against the table's [`TableInfo`](chocan_schema::TableInfo) before anything
//! reaches disk.
//!
//! ```no_run
//! use chocan_parquet_store::{Filters, RecordStore, StoreConfig};
//! use chocan_schema::MEMBER_INFO;
//!
//! # fn main() -> chocan_result::Result<()> {
//! let store = RecordStore::new(StoreConfig::from_env());
//! let active = store.load_filtered(&MEMBER_INFO, &Filters::new().eq("suspended", false))?;
//! println!("{} active members", active.num_rows());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod filter;
pub mod reader;
pub mod store;
pub mod writer;

pub use config::{
    REPORT_DIR_ENV, REPORT_FILE_EXTENSION, STORAGE_DIR_ENV, StoreConfig, TABLE_FILE_EXTENSION,
    WriterConfig,
};
pub use filter::{CompareOp, Filter, Filters};
pub use reader::read_table_file;
pub use store::RecordStore;
pub use writer::{write_parquet_to_memory, write_table_file};
