//! Store configuration and the table/report path resolver.
//!
//! Both root directories are explicit values handed to the store at
//! construction. Tests isolate themselves by building a config over a
//! temporary directory.

use std::env;
use std::path::{Path, PathBuf};

use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;

/// File extension of persisted table files.
pub const TABLE_FILE_EXTENSION: &str = "pkt";
/// File extension of generated reports.
pub const REPORT_FILE_EXTENSION: &str = "csv";

/// Environment variable overriding the table storage directory.
pub const STORAGE_DIR_ENV: &str = "CHOCAN_STORAGE_DIR";
/// Environment variable overriding the report directory.
pub const REPORT_DIR_ENV: &str = "CHOCAN_REPORT_DIR";

const DEFAULT_STORAGE_DIR: &str = "storage";
const DEFAULT_REPORT_DIR: &str = "reports";

/// Parquet encoding options applied to every table write.
#[derive(Debug, Clone)]
pub struct WriterConfig {
    pub compression: Compression,
    pub max_row_group_size: usize,
}

impl Default for WriterConfig {
    fn default() -> Self {
        Self {
            compression: Compression::SNAPPY,
            max_row_group_size: 8192,
        }
    }
}

impl WriterConfig {
    pub(crate) fn properties(&self) -> WriterProperties {
        WriterProperties::builder()
            .set_compression(self.compression)
            .set_max_row_group_size(self.max_row_group_size)
            .build()
    }
}

#[derive(Debug, Clone)]
pub struct StoreConfig {
    storage_dir: PathBuf,
    report_dir: PathBuf,
    writer: WriterConfig,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::new(DEFAULT_STORAGE_DIR, DEFAULT_REPORT_DIR)
    }
}

impl StoreConfig {
    pub fn new(storage_dir: impl Into<PathBuf>, report_dir: impl Into<PathBuf>) -> Self {
        Self {
            storage_dir: storage_dir.into(),
            report_dir: report_dir.into(),
            writer: WriterConfig::default(),
        }
    }

    /// Read [`STORAGE_DIR_ENV`] and [`REPORT_DIR_ENV`], falling back to
    /// `storage/` and `reports/` relative to the working directory.
    pub fn from_env() -> Self {
        let storage_dir = env::var_os(STORAGE_DIR_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STORAGE_DIR));
        let report_dir = env::var_os(REPORT_DIR_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_REPORT_DIR));
        tracing::debug!(
            "[CONFIG] storage_dir={} report_dir={}",
            storage_dir.display(),
            report_dir.display()
        );
        Self::new(storage_dir, report_dir)
    }

    pub fn with_storage_dir(mut self, storage_dir: impl Into<PathBuf>) -> Self {
        self.storage_dir = storage_dir.into();
        self
    }

    pub fn with_report_dir(mut self, report_dir: impl Into<PathBuf>) -> Self {
        self.report_dir = report_dir.into();
        self
    }

    pub fn with_writer_config(mut self, writer: WriterConfig) -> Self {
        self.writer = writer;
        self
    }

    pub fn storage_dir(&self) -> &Path {
        &self.storage_dir
    }

    pub fn report_dir(&self) -> &Path {
        &self.report_dir
    }

    pub fn writer_config(&self) -> &WriterConfig {
        &self.writer
    }

    /// `<storage_dir>/<name>.pkt`
    pub fn table_path(&self, name: &str) -> PathBuf {
        self.storage_dir
            .join(format!("{name}.{TABLE_FILE_EXTENSION}"))
    }

    /// `<report_dir>/<name>.csv`
    pub fn report_path(&self, name: &str) -> PathBuf {
        self.report_dir
            .join(format!("{name}.{REPORT_FILE_EXTENSION}"))
    }
}
