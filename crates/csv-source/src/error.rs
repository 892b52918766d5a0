//! Error types for the CSV record source.

use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

/// Why a read from the stream produced no record.
///
/// Cloneable so that an exhausted stream can hand the same failure to every
/// later caller.
#[derive(Error, Debug, Clone)]
pub enum ReadFailure {
    /// The input has no more records.
    #[error("end of CSV input")]
    EndOfInput,

    /// The underlying reader or the CSV parser failed.
    #[error("{0}")]
    Csv(Arc<csv::Error>),
}

impl ReadFailure {
    /// Returns true when the stream ended normally rather than failing.
    pub fn is_end_of_input(&self) -> bool {
        matches!(self, ReadFailure::EndOfInput)
    }
}

impl From<csv::Error> for ReadFailure {
    fn from(err: csv::Error) -> Self {
        ReadFailure::Csv(Arc::new(err))
    }
}

/// Errors that can occur while opening a CSV record source.
#[derive(Error, Debug)]
pub enum CsvSourceError {
    /// The file could not be opened.
    #[error("Failed to open CSV file '{}': {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The first line could not be read as a header.
    #[error("Failed to read CSV header from '{name}': {source}")]
    Header {
        name: String,
        #[source]
        source: ReadFailure,
    },
}
