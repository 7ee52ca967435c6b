use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use super::error::VimeoError;
use super::session::{bearer, PageResponse, VideoSession};
use super::types::{RawVideo, VideoPage};
use crate::retry::{RetryAction, RetryBudget, RetryConfig};

/// Videos per request. 100 is the most `/me/videos` allows, which keeps the
/// request count (and so the rate-limit exposure) as low as possible.
pub const PAGE_SIZE: u32 = 100;

/// How a page response is handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PageStatus {
    Success,
    RateLimited,
    Fatal,
}

impl PageStatus {
    fn of(response: &PageResponse) -> Self {
        match response.status {
            200 => PageStatus::Success,
            429 => PageStatus::RateLimited,
            _ => PageStatus::Fatal,
        }
    }
}

/// Working state of one pull: what has been collected so far, the retry
/// budget shared by every page, and the optional modification cutoff.
#[derive(Debug)]
pub struct FetchState {
    videos: Vec<RawVideo>,
    budget: RetryBudget,
    cutoff: Option<DateTime<Utc>>,
}

impl FetchState {
    pub fn new(budget: RetryBudget, cutoff: Option<DateTime<Utc>>) -> Self {
        Self {
            videos: Vec::new(),
            budget,
            cutoff,
        }
    }

    /// Append the videos of a successful page that pass the cutoff, keeping
    /// page order. Returns how many were kept.
    fn accept_page(&mut self, data: Vec<RawVideo>) -> usize {
        let before = self.videos.len();
        match self.cutoff {
            None => self.videos.extend(data),
            Some(cutoff) => {
                for video in data {
                    match video.modified_at() {
                        Some(modified) if modified > cutoff => self.videos.push(video),
                        Some(_) => {}
                        None => warn!(
                            uri = %video.uri,
                            modified_time = %video.modified_time,
                            "Unparsable modified_time, excluding video from filtered pull"
                        ),
                    }
                }
            }
        }
        self.videos.len() - before
    }

    pub fn videos(&self) -> &[RawVideo] {
        &self.videos
    }

    pub fn retries_used(&self) -> u32 {
        self.budget.used()
    }

    fn into_videos(self) -> Vec<RawVideo> {
        self.videos
    }
}

/// Walks the paginated `/me/videos` listing to completion.
pub struct VideoFetcher {
    session: Box<dyn VideoSession>,
    api_base: String,
    authorization: String,
    retry: RetryConfig,
}

impl std::fmt::Debug for VideoFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VideoFetcher")
            .field("api_base", &self.api_base)
            .field("authorization", &"<redacted>")
            .field("retry", &self.retry)
            .finish_non_exhaustive()
    }
}

impl VideoFetcher {
    pub fn new(
        session: Box<dyn VideoSession>,
        api_base: &str,
        api_key: &str,
        retry: RetryConfig,
    ) -> Self {
        Self {
            session,
            api_base: api_base.trim_end_matches('/').to_string(),
            authorization: bearer(api_key),
            retry,
        }
    }

    pub fn first_page_url(&self) -> String {
        format!("{}/me/videos?per_page={PAGE_SIZE}&page=1", self.api_base)
    }

    /// Resolve the server's `paging.next`, which is a path relative to the
    /// API base.
    fn next_page_url(&self, next: &str) -> String {
        if next.starts_with("http://") || next.starts_with("https://") {
            next.to_string()
        } else {
            format!("{}{}", self.api_base, next)
        }
    }

    /// Pull every page, keeping videos modified strictly after `cutoff`
    /// when one is given.
    ///
    /// Pages are requested one after another. A 429 waits until the
    /// server's reset time and re-requests the same page; the retry budget
    /// is shared across the whole pull. Any other non-200 status aborts.
    pub async fn fetch(
        &self,
        cutoff: Option<DateTime<Utc>>,
    ) -> Result<Vec<RawVideo>, VimeoError> {
        let mut state = FetchState::new(self.retry.budget(), cutoff);
        let mut url = self.first_page_url();

        loop {
            debug!("requesting {}", url);
            let response = self
                .session
                .get(&url, &[("Authorization", self.authorization.as_str())])
                .await?;
            debug!("response with code {}", response.status);

            match PageStatus::of(&response) {
                PageStatus::Success => {
                    let page: VideoPage =
                        serde_json::from_str(&response.body).map_err(|source| {
                            VimeoError::Decode {
                                url: url.clone(),
                                source,
                            }
                        })?;
                    let received = page.data.len();
                    let kept = state.accept_page(page.data);
                    debug!(received, kept, total = state.videos().len(), "retrieved videos");

                    match page.paging.next.filter(|next| !next.is_empty()) {
                        Some(next) => url = self.next_page_url(&next),
                        None => break,
                    }
                }
                PageStatus::RateLimited => {
                    if state.budget.consume() == RetryAction::Abort {
                        return Err(VimeoError::RetriesExhausted {
                            retries: state.retries_used(),
                        });
                    }
                    let delay = self
                        .retry
                        .delay_until_reset(response.rate_limit_reset.as_deref(), Utc::now());
                    warn!(
                        "Rate limit occurred {} times (max {}), retrying {} in {:.1}s",
                        state.retries_used(),
                        state.budget.max(),
                        url,
                        delay.as_secs_f64()
                    );
                    tokio::time::sleep(delay).await;
                }
                PageStatus::Fatal => {
                    return Err(VimeoError::UnexpectedStatus {
                        url,
                        status: response.status,
                    });
                }
            }
        }

        Ok(state.into_videos())
    }
}
