//! Dry-run request replay
//!
//! Drives a query parameter provider the way a load generator would: a pool
//! of workers each claims request slots, asks the provider for that request's
//! parameters, and renders the resulting request URL. Nothing is sent over
//! the network; the rendered requests are written out line by line.

use anyhow::{Context, Result};
use clap::ValueEnum;
use reqparams_query_params::{ParameterSet, ProviderError, QueryParamProvider};
use serde::Serialize;
use std::io::Write;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use url::Url;

/// How each replayed request is written out.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// The full request URL
    #[default]
    #[value(name = "url")]
    Url,
    /// A JSON object with the request number, URL and parameters
    #[value(name = "json")]
    Json,
}

/// Configuration for a replay run
#[derive(Clone, Debug)]
pub struct ReplayConfig {
    /// URL every request starts from
    pub base_url: Url,

    /// Maximum number of requests to issue. When unset, the run lasts until
    /// the provider runs out of parameters.
    pub requests: Option<u64>,

    /// Number of concurrent workers
    pub workers: usize,

    /// Output line format
    pub format: OutputFormat,
}

impl ReplayConfig {
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            requests: None,
            workers: 4,
            format: OutputFormat::Url,
        }
    }
}

/// Counters from a replay run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplaySummary {
    /// Requests rendered and written out
    pub issued: u64,
    /// Requests skipped because their parameter record was malformed
    pub malformed: u64,
    /// Whether the provider ran out of parameters
    pub exhausted: bool,
}

impl ReplaySummary {
    fn merge(&mut self, other: ReplaySummary) {
        self.issued += other.issued;
        self.malformed += other.malformed;
        self.exhausted |= other.exhausted;
    }
}

/// One JSON output line.
#[derive(Serialize)]
struct ReplayedRequest<'a> {
    request: u64,
    url: &'a str,
    params: &'a ParameterSet,
}

/// Hands out request numbers to workers, up to an optional limit.
struct RequestSlots {
    next: AtomicU64,
    limit: Option<u64>,
}

impl RequestSlots {
    fn claim(&self) -> Option<u64> {
        let n = self.next.fetch_add(1, Ordering::Relaxed);
        match self.limit {
            Some(limit) if n >= limit => None,
            _ => Some(n),
        }
    }
}

/// Replay requests against `provider`, writing one line per request to `out`.
///
/// With no provider every request carries only the base URL's own query, so a
/// request limit is required. The provider is closed once every worker has
/// stopped.
pub async fn run_replay<W: Write>(
    provider: Option<Arc<dyn QueryParamProvider>>,
    config: ReplayConfig,
    out: &mut W,
) -> Result<ReplaySummary> {
    if config.workers == 0 {
        anyhow::bail!("At least one worker is required");
    }
    if provider.is_none() && config.requests.is_none() {
        anyhow::bail!("A request limit is required when no query parameter CSV is configured");
    }

    info!(
        "Replaying requests to {} with {} workers (limit: {:?})",
        config.base_url, config.workers, config.requests
    );

    let slots = Arc::new(RequestSlots {
        next: AtomicU64::new(0),
        limit: config.requests,
    });
    let (tx, mut rx) = mpsc::channel::<String>(config.workers * 64);

    let mut handles = Vec::with_capacity(config.workers);
    for worker_id in 0..config.workers {
        let provider = provider.clone();
        let slots = Arc::clone(&slots);
        let base_url = config.base_url.clone();
        let tx = tx.clone();
        let format = config.format;
        // Providers do blocking file I/O, so workers live on the blocking pool.
        handles.push(tokio::task::spawn_blocking(move || {
            replay_worker(worker_id, provider.as_deref(), &slots, &base_url, format, &tx)
        }));
    }
    drop(tx);

    let result = collect_output(&mut rx, handles, out).await;

    // Workers still running after a failed write stop on their next send.
    drop(rx);
    if let Some(provider) = provider {
        provider.close();
    }
    let summary = result?;

    info!(
        "Replay finished: {} requests issued, {} skipped as malformed",
        summary.issued, summary.malformed
    );
    Ok(summary)
}

async fn collect_output<W: Write>(
    rx: &mut mpsc::Receiver<String>,
    handles: Vec<JoinHandle<Result<ReplaySummary>>>,
    out: &mut W,
) -> Result<ReplaySummary> {
    while let Some(line) = rx.recv().await {
        writeln!(out, "{line}").context("Failed to write replayed request")?;
    }
    out.flush().context("Failed to flush replay output")?;

    let mut summary = ReplaySummary::default();
    for handle in handles {
        summary.merge(handle.await.context("Replay worker panicked")??);
    }
    Ok(summary)
}

fn replay_worker(
    worker_id: usize,
    provider: Option<&dyn QueryParamProvider>,
    slots: &RequestSlots,
    base_url: &Url,
    format: OutputFormat,
    tx: &mpsc::Sender<String>,
) -> Result<ReplaySummary> {
    let mut summary = ReplaySummary::default();

    while let Some(request) = slots.claim() {
        let params = match provider {
            None => ParameterSet::new(),
            Some(provider) => match provider.parameters(ParameterSet::new()) {
                Ok(params) => params,
                Err(e @ ProviderError::MalformedRecord { .. }) => {
                    warn!("Worker {worker_id}: skipping request {request}: {e}");
                    summary.malformed += 1;
                    continue;
                }
                Err(ProviderError::RecordRead(failure)) if failure.is_end_of_input() => {
                    debug!("Worker {worker_id}: query parameters exhausted");
                    summary.exhausted = true;
                    break;
                }
                Err(e) => {
                    warn!("Worker {worker_id}: stopping: {e}");
                    summary.exhausted = e.is_exhausted();
                    break;
                }
            },
        };

        let line = render_request(request, base_url, &params, format)?;
        if tx.blocking_send(line).is_err() {
            // Output side has gone away.
            break;
        }
        summary.issued += 1;
    }

    Ok(summary)
}

fn render_request(
    request: u64,
    base_url: &Url,
    params: &ParameterSet,
    format: OutputFormat,
) -> Result<String> {
    let mut url = base_url.clone();
    params.append_to_url(&mut url);

    match format {
        OutputFormat::Url => Ok(url.into()),
        OutputFormat::Json => {
            let line = ReplayedRequest {
                request,
                url: url.as_str(),
                params,
            };
            serde_json::to_string(&line).context("Failed to serialize replayed request")
        }
    }
}
