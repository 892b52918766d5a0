//! Forward-only CSV record stream
//!
//! The first line of the input is captured as the header when the stream is
//! opened. Every later read returns the next record as positional string
//! values; there is no rewind.

use crate::error::{CsvSourceError, ReadFailure};
use csv::StringRecord;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::debug;

/// Sequential reader over the records of one CSV input.
#[derive(Debug)]
pub struct CsvStream<R = File> {
    reader: csv::Reader<R>,
    header: Vec<String>,
    record: StringRecord,
    records_read: u64,
}

impl CsvStream<File> {
    /// Open a CSV file and capture its header line.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, CsvSourceError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| CsvSourceError::Open {
            path: path.to_path_buf(),
            source,
        })?;

        let stream = Self::from_reader(file).map_err(|source| CsvSourceError::Header {
            name: path.display().to_string(),
            source,
        })?;

        debug!(
            "Opened CSV source {} with {} columns: {:?}",
            path.display(),
            stream.header.len(),
            stream.header
        );

        Ok(stream)
    }
}

impl<R: Read> CsvStream<R> {
    /// Wrap an arbitrary reader, consuming its first line as the header.
    ///
    /// An input with no header line at all fails with
    /// [`ReadFailure::EndOfInput`].
    pub fn from_reader(reader: R) -> Result<Self, ReadFailure> {
        // Flexible so that a row of the wrong width is handed back to the
        // caller instead of poisoning the parser.
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let header: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
        if header.is_empty() {
            return Err(ReadFailure::EndOfInput);
        }

        Ok(Self {
            reader,
            header,
            record: StringRecord::new(),
            records_read: 0,
        })
    }

    /// Field names from the first line, in declared order.
    pub fn header(&self) -> &[String] {
        &self.header
    }

    /// Number of records returned so far.
    pub fn records_read(&self) -> u64 {
        self.records_read
    }

    /// Read the next record.
    ///
    /// The record is returned as-is; its width is not checked against the
    /// header.
    pub fn next_record(&mut self) -> Result<Vec<String>, ReadFailure> {
        if !self.reader.read_record(&mut self.record)? {
            return Err(ReadFailure::EndOfInput);
        }
        self.records_read += 1;
        Ok(self.record.iter().map(str::to_string).collect())
    }
}
