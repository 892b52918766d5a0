//! Error types for query parameter providers.

use reqparams_csv_source::{CsvSourceError, ReadFailure};
use std::path::PathBuf;
use thiserror::Error;

/// Errors returned by query parameter providers.
#[derive(Error, Debug)]
pub enum ProviderError {
    /// The parameter file could not be opened.
    #[error("Failed to open query parameter file '{}': {source}", path.display())]
    FileOpen {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The header line of the parameter file could not be read.
    #[error("Failed to read query parameter header from '{name}': {source}")]
    HeaderRead {
        name: String,
        #[source]
        source: ReadFailure,
    },

    /// No record could be read. Also returned once the input is exhausted.
    #[error("Failed to read query parameter record: {0}")]
    RecordRead(#[source] ReadFailure),

    /// A record did not have one value per header column.
    #[error("Malformed CSV line found, expected {expected} values but found {}: {values:?}", .values.len())]
    MalformedRecord { expected: usize, values: Vec<String> },

    /// The provider was closed.
    #[error("Query parameter provider is closed")]
    Closed,
}

impl ProviderError {
    /// Returns true when the provider has no more records to hand out.
    pub fn is_exhausted(&self) -> bool {
        matches!(self, ProviderError::RecordRead(_))
    }
}

impl From<CsvSourceError> for ProviderError {
    fn from(err: CsvSourceError) -> Self {
        match err {
            CsvSourceError::Open { path, source } => ProviderError::FileOpen { path, source },
            CsvSourceError::Header { name, source } => ProviderError::HeaderRead { name, source },
        }
    }
}
