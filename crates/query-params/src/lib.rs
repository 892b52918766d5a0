//! Per-request query parameter providers
//!
//! A [`QueryParamProvider`] is asked once per outgoing request for the
//! parameters to attach to it. The CSV-backed provider hands out one record
//! of a CSV file per request, keyed by the file's header line.
//!
//! # Example
//!
//! ```ignore
//! use reqparams_query_params::{CsvQueryParamProvider, ParameterSet, QueryParamProvider};
//!
//! if let Some(provider) = CsvQueryParamProvider::init("params.csv")?.into_option() {
//!     let params = provider.parameters(ParameterSet::new())?;
//!     println!("?{}", params.to_query_string());
//!     provider.close();
//! }
//! ```

mod csv_provider;
mod error;
mod params;
mod provider;

pub use csv_provider::CsvQueryParamProvider;
pub use error::ProviderError;
pub use params::ParameterSet;
pub use provider::{ProviderInit, QueryParamProvider};

// Re-export read failure details for callers matching on `ProviderError::RecordRead`
pub use reqparams_csv_source::ReadFailure;
