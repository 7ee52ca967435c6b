use thiserror::Error;

/// Failures that abort a catalog pull.
///
/// Throttling is not represented here: a 429 is recovered inside the fetch
/// loop and only surfaces as `RetriesExhausted` once the budget is spent.
#[derive(Error, Debug)]
pub enum VimeoError {
    #[error("Task failed after retrying {retries} times")]
    RetriesExhausted { retries: u32 },
    #[error("Fatal error requesting {url}. Response code {status}")]
    UnexpectedStatus { url: String, status: u16 },
    #[error("Malformed video page from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}
