//! CSV-backed query parameter provider
//!
//! Each call to [`QueryParamProvider::parameters`] consumes the next record
//! of the file and appends one `(column, value)` pair per header column.
//! The read cursor is shared by every caller, so concurrent callers each get
//! a different record. Once the file runs out (or a read fails) the provider
//! keeps returning that same failure.

use crate::error::ProviderError;
use crate::params::ParameterSet;
use crate::provider::{ProviderInit, QueryParamProvider};
use reqparams_csv_source::{CsvStream, ReadFailure};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::debug;

#[derive(Debug)]
enum StreamState<R> {
    Open(CsvStream<R>),
    Exhausted(ReadFailure),
    Closed,
}

/// Hands out one CSV record per request.
#[derive(Debug)]
pub struct CsvQueryParamProvider<R = File> {
    header: Vec<String>,
    state: Mutex<StreamState<R>>,
}

impl CsvQueryParamProvider<File> {
    /// Build a provider for the CSV file at `path`.
    ///
    /// An empty path means no parameter file was configured and yields
    /// [`ProviderInit::Disabled`] without touching the filesystem.
    pub fn init(path: impl AsRef<Path>) -> Result<ProviderInit<Self>, ProviderError> {
        let path = path.as_ref();
        if path.as_os_str().is_empty() {
            debug!("No query parameter CSV configured");
            return Ok(ProviderInit::Disabled);
        }

        let stream = CsvStream::open(path)?;
        Ok(ProviderInit::Enabled(Self::from_stream(stream)))
    }
}

impl<R: Read> CsvQueryParamProvider<R> {
    /// Build a provider over an arbitrary reader whose first line is the header.
    pub fn from_reader(reader: R) -> Result<Self, ProviderError> {
        let stream =
            CsvStream::from_reader(reader).map_err(|source| ProviderError::HeaderRead {
                name: "<reader>".to_string(),
                source,
            })?;
        Ok(Self::from_stream(stream))
    }

    fn from_stream(stream: CsvStream<R>) -> Self {
        Self {
            header: stream.header().to_vec(),
            state: Mutex::new(StreamState::Open(stream)),
        }
    }

    /// Column names that become parameter keys, in declared order.
    pub fn header(&self) -> &[String] {
        &self.header
    }

    fn lock_state(&self) -> MutexGuard<'_, StreamState<R>> {
        // A panic while holding the lock cannot leave the state half-updated,
        // so a poisoned lock is still usable.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Take the next record off the shared cursor.
    ///
    /// The lock covers only the read itself and is released on every return.
    fn next_record(&self) -> Result<Vec<String>, ProviderError> {
        let mut state = self.lock_state();
        let result = match &mut *state {
            StreamState::Open(stream) => {
                let result = stream.next_record();
                if let Err(failure) = &result {
                    debug!(
                        "Query parameter CSV exhausted after {} records: {failure}",
                        stream.records_read()
                    );
                }
                result
            }
            StreamState::Exhausted(failure) => {
                return Err(ProviderError::RecordRead(failure.clone()))
            }
            StreamState::Closed => return Err(ProviderError::Closed),
        };

        if let Err(failure) = &result {
            *state = StreamState::Exhausted(failure.clone());
        }

        result.map_err(ProviderError::RecordRead)
    }
}

impl<R: Read + Send> QueryParamProvider for CsvQueryParamProvider<R> {
    fn parameters(&self, mut params: ParameterSet) -> Result<ParameterSet, ProviderError> {
        let values = self.next_record()?;

        if values.len() != self.header.len() {
            return Err(ProviderError::MalformedRecord {
                expected: self.header.len(),
                values,
            });
        }

        for (key, value) in self.header.iter().zip(values) {
            params.add(key.as_str(), value);
        }
        Ok(params)
    }

    fn close(&self) {
        let mut state = self.lock_state();
        if !matches!(*state, StreamState::Closed) {
            debug!("Closing query parameter CSV");
            *state = StreamState::Closed;
        }
    }
}
