use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};

use super::error::VimeoError;
use crate::retry::RATE_LIMIT_RESET_HEADER;

/// Versioned media type recommended by the Vimeo API docs.
const VIMEO_ACCEPT: &str = "application/vnd.vimeo.*+json;version=3.4";

/// The parts of an HTTP response the fetch loop acts on.
#[derive(Debug, Clone)]
pub struct PageResponse {
    pub status: u16,
    pub rate_limit_reset: Option<String>,
    pub body: String,
}

/// Minimal async session used by the fetcher.
///
/// Implemented for `reqwest::Client`; tests substitute a scripted session.
#[async_trait::async_trait]
pub trait VideoSession: Send + Sync {
    async fn get(&self, url: &str, headers: &[(&str, &str)]) -> Result<PageResponse, VimeoError>;
}

#[async_trait::async_trait]
impl VideoSession for reqwest::Client {
    async fn get(&self, url: &str, headers: &[(&str, &str)]) -> Result<PageResponse, VimeoError> {
        let mut builder = reqwest::Client::get(self, url);
        for &(k, v) in headers {
            builder = builder.header(k, v);
        }
        let resp = builder.send().await?;
        let status = resp.status().as_u16();
        let rate_limit_reset = resp
            .headers()
            .get(RATE_LIMIT_RESET_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);
        let body = resp.text().await?;
        Ok(PageResponse {
            status,
            rate_limit_reset,
            body,
        })
    }
}

/// Build the single client reused for every page of one pull, so requests
/// share a pooled connection.
pub fn build_client(timeout_secs: u64) -> Result<reqwest::Client, VimeoError> {
    let mut default_headers = HeaderMap::new();
    default_headers.insert(ACCEPT, HeaderValue::from_static(VIMEO_ACCEPT));

    let client = reqwest::Client::builder()
        .default_headers(default_headers)
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .timeout(Duration::from_secs(timeout_secs))
        .build()?;
    Ok(client)
}

/// Value of the `Authorization` header for a personal access token.
pub fn bearer(api_key: &str) -> String {
    format!("bearer {api_key}")
}
