//! CSV boundary of the record store: human-readable reports out, developer
//! seed data in.

pub mod ingest;
pub mod report;

pub use ingest::import_csv;
pub use report::{DATE_FORMAT, DATETIME_FORMAT, ReportTimezone, ReportWriter};
