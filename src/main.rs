//! vimeo-extract — pulls every video on a Vimeo account and emits the flat
//! records the VidApp media catalog ingests.
//!
//! Pages of `GET /me/videos` are fetched strictly in sequence. Throttled
//! requests wait until the server's `X-RateLimit-Reset` time and retry the
//! same page, with a retry budget shared across the whole pull. Any other
//! failure aborts the run and nothing is written.

#![warn(clippy::all)]

mod catalog;
mod cli;
mod config;
mod extract;
pub mod retry;
mod types;
mod vimeo;

use std::path::Path;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use catalog::OutputRecord;

/// Write the batch as pretty JSON to `output`, or stdout when unset.
async fn write_output(records: &[OutputRecord], output: Option<&Path>) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(records)?;
    match output {
        Some(path) => {
            tokio::fs::write(path, json.as_bytes()).await.map_err(|e| {
                anyhow::anyhow!("Failed to write output to {}: {}", path.display(), e)
            })?;
            tracing::info!("Wrote {} records to {}", records.len(), path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(cli.log_level.as_filter())),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = config::Config::from_cli(cli)?;
    tracing::debug!(?config, "Starting vimeo-extract");

    let client = vimeo::build_client(config.timeout_secs)?;
    let fetcher = vimeo::VideoFetcher::new(
        Box::new(client),
        config.api_base.as_str(),
        &config.api_key,
        config.retry.clone(),
    );

    let records = extract::extract_videos(&fetcher, &config.request).await?;

    write_output(&records, config.output.as_deref()).await
}
