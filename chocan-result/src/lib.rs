//! Error types and result definitions for the ChocAn record store.
//!
//! Every crate in the workspace returns [`Result<T>`], whose error variant is the
//! single [`Error`] enum defined here. Each failure kind the record store can
//! raise is its own variant so callers can match on it instead of on message
//! text.
//!
//! # Error Categories
//!
//! - **Storage errors** ([`Error::StorageIo`]): a table or report file could not
//!   be read, decoded or written
//! - **Schema errors** ([`Error::ColumnMismatch`], [`Error::UnknownColumn`],
//!   [`Error::TypeMismatch`], [`Error::RangeError`]): data does not conform to a
//!   table's declared layout or limits
//! - **Query errors** ([`Error::UnsupportedComparison`]): a filter value cannot be
//!   compared against its column
//! - **Key errors** ([`Error::DuplicateKey`], [`Error::IndexNotFound`]): index
//!   column uniqueness or lookup failures
//! - **Caller errors** ([`Error::InvalidArgumentError`]): a call contract was
//!   violated
//! - **Internal errors** ([`Error::Arrow`], [`Error::Internal`]): bugs or
//!   unexpected states

pub mod error;
pub mod result;

pub use error::Error;
pub use result::Result;
