//! Sequential CSV record source
//!
//! This crate opens a CSV file, captures the first line as the header, and
//! hands out the remaining records one at a time in file order.

mod error;
mod stream;

pub use error::{CsvSourceError, ReadFailure};
pub use stream::CsvStream;
