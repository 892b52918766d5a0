//! reqparams Library
//!
//! Supplies per-request query parameters to HTTP load generation and request
//! replay tools, read one record at a time from a CSV file.
//!
//! # Crates
//!
//! - `reqparams_csv_source` - sequential CSV record source with header capture
//! - `reqparams_query_params` - the provider abstraction, the CSV-backed
//!   provider, and the multi-valued [`ParameterSet`]
//!
//! # CLI Usage
//!
//! ```bash
//! # Render one request per CSV row against a base URL
//! reqparams replay --url http://localhost:8080/search --query-param-csv users.csv
//!
//! # Eight workers, at most 1000 requests, JSON lines out
//! reqparams replay --url http://localhost:8080/search --query-param-csv users.csv \
//!   --workers 8 --requests 1000 --format json
//! ```

use anyhow::Context;
use clap::Args;
use std::sync::Arc;
use url::Url;

pub mod replay;

pub use replay::{run_replay, OutputFormat, ReplayConfig, ReplaySummary};

// Re-export provider types for convenience
pub use reqparams_query_params::{
    CsvQueryParamProvider, ParameterSet, ProviderError, ProviderInit, QueryParamProvider,
};

#[derive(Args, Clone, Debug)]
pub struct ReplayOpts {
    /// Base URL for every request
    #[arg(long, env = "REQPARAMS_URL")]
    pub url: String,

    /// CSV file supplying query parameters, one row per request (empty disables)
    #[arg(long, default_value = "", env = "REQPARAMS_QUERY_PARAM_CSV")]
    pub query_param_csv: String,

    /// Maximum number of requests (required without a query parameter CSV)
    #[arg(long, env = "REQPARAMS_REQUESTS")]
    pub requests: Option<u64>,

    /// Number of concurrent workers
    #[arg(long, default_value = "4", env = "REQPARAMS_WORKERS")]
    pub workers: usize,

    /// Output format for replayed requests
    #[arg(long, value_enum, default_value = "url", env = "REQPARAMS_FORMAT")]
    pub format: OutputFormat,
}

impl ReplayOpts {
    /// Build the replay configuration, validating the base URL.
    pub fn to_config(&self) -> anyhow::Result<ReplayConfig> {
        let base_url =
            Url::parse(&self.url).with_context(|| format!("Invalid base URL: {}", self.url))?;
        Ok(ReplayConfig {
            base_url,
            requests: self.requests,
            workers: self.workers,
            format: self.format,
        })
    }

    /// Open the configured query parameter provider, if any.
    pub fn open_provider(&self) -> anyhow::Result<Option<Arc<dyn QueryParamProvider>>> {
        let init = CsvQueryParamProvider::init(&self.query_param_csv)
            .context("Failed to initialize query parameter CSV provider")?;
        Ok(init.into_shared())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        opts: ReplayOpts,
    }

    #[test]
    fn test_replay_opts_defaults() {
        let cli = TestCli::try_parse_from(["test", "--url", "http://localhost/"]).unwrap();
        assert_eq!(cli.opts.query_param_csv, "");
        assert_eq!(cli.opts.workers, 4);
        assert_eq!(cli.opts.format, OutputFormat::Url);
        assert!(cli.opts.requests.is_none());

        let config = cli.opts.to_config().unwrap();
        assert_eq!(config.base_url.as_str(), "http://localhost/");
        assert!(cli.opts.open_provider().unwrap().is_none());
    }

    #[test]
    fn test_replay_opts_invalid_url() {
        let cli = TestCli::try_parse_from(["test", "--url", "not a url"]).unwrap();
        assert!(cli.opts.to_config().is_err());
    }

    #[test]
    fn test_replay_opts_missing_csv() {
        let cli = TestCli::try_parse_from([
            "test",
            "--url",
            "http://localhost/",
            "--query-param-csv",
            "/nonexistent/params.csv",
        ])
        .unwrap();
        let err = cli
            .opts
            .open_provider()
            .err()
            .expect("missing CSV must fail to open");
        assert!(format!("{err:#}").contains("Failed to open query parameter file"));
    }
}
