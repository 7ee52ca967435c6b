//! One extraction: pull the account's videos, then map them to catalog
//! records. Either the whole batch is produced or nothing is.

use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::catalog::{self, OutputRecord, TransformContext};
use crate::config::parse_date_or_interval;
use crate::vimeo::{VideoFetcher, VimeoError};

/// Inbound invocation. Both fields are optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ExtractRequest {
    /// Only videos modified strictly after this timestamp are returned.
    #[serde(default)]
    pub modified_since: Option<String>,
    #[serde(default)]
    pub app_id: Option<String>,
}

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Invalid modified_since cutoff: {0}")]
    InvalidCutoff(String),
    #[error(transparent)]
    Fetch(#[from] VimeoError),
}

pub async fn extract_videos(
    fetcher: &VideoFetcher,
    request: &ExtractRequest,
) -> Result<Vec<OutputRecord>, ExtractError> {
    let cutoff = request
        .modified_since
        .as_deref()
        .map(parse_date_or_interval)
        .transpose()
        .map_err(|e| ExtractError::InvalidCutoff(e.to_string()))?;
    if let Some(cutoff) = cutoff {
        info!("Pulling videos modified after {}", cutoff.to_rfc3339());
    } else {
        info!("Pulling all videos");
    }

    let videos = fetcher.fetch(cutoff).await?;
    info!(count = videos.len(), "Pulled videos");

    let ctx = TransformContext {
        app_id: request.app_id.clone(),
    };
    let records = catalog::transform(videos, &ctx);
    info!(count = records.len(), "Transformed videos into catalog records");
    debug!(
        "{}",
        serde_json::to_string_pretty(&records).unwrap_or_default()
    );
    Ok(records)
}
