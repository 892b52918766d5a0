//! Command-line interface for reqparams
//!
//! # Usage Examples
//!
//! ```bash
//! # One request per row of users.csv, rendered as URLs
//! reqparams replay \
//!   --url http://localhost:8080/search \
//!   --query-param-csv users.csv
//!
//! # JSON lines from eight workers, stopping after 1000 requests
//! reqparams replay \
//!   --url http://localhost:8080/search \
//!   --query-param-csv users.csv \
//!   --workers 8 --requests 1000 --format json
//!
//! # No parameter file: repeat the bare URL
//! reqparams replay --url http://localhost:8080/health --requests 10
//! ```
//!
//! Set `RUST_LOG=debug` to see provider open and exhaustion events on stderr.

use clap::{Parser, Subcommand};
use reqparams::{run_replay, ReplayOpts};

#[derive(Parser)]
#[command(name = "reqparams")]
#[command(about = "Per-request query parameters from CSV files for HTTP request replay")]
#[command(long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render one request per query parameter record without sending it
    Replay {
        #[command(flatten)]
        opts: ReplayOpts,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = run().await {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}

async fn run() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Replay { opts } => {
            let config = opts.to_config()?;
            let provider = opts.open_provider()?;

            let stdout = std::io::stdout();
            let mut out = stdout.lock();
            let summary = run_replay(provider, config, &mut out).await?;

            tracing::info!(
                "Issued {} requests ({} malformed records skipped, exhausted: {})",
                summary.issued,
                summary.malformed,
                summary.exhausted
            );
        }
    }

    Ok(())
}
