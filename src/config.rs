use std::path::PathBuf;

use anyhow::Context;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use url::Url;

use crate::extract::ExtractRequest;
use crate::retry::RetryConfig;

/// Application configuration.
pub struct Config {
    pub api_key: String,
    pub api_base: Url,
    pub output: Option<PathBuf>,
    pub request: ExtractRequest,
    pub timeout_secs: u64,
    pub retry: RetryConfig,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &"<redacted>")
            .field("api_base", &self.api_base.as_str())
            .field("output", &self.output)
            .field("request", &self.request)
            .field("timeout_secs", &self.timeout_secs)
            .field("retry", &self.retry)
            .finish()
    }
}

fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}

impl Config {
    pub fn from_cli(cli: crate::cli::Cli) -> anyhow::Result<Self> {
        let api_key = cli.api_key.trim().to_string();
        if api_key.is_empty() {
            anyhow::bail!("VIMEO_API_KEY is empty");
        }

        let api_base = Url::parse(&cli.api_base)
            .with_context(|| format!("Invalid --api-base '{}'", cli.api_base))?;

        let mut request = match cli.event.as_deref() {
            Some(path) => load_event(&expand_tilde(path))?,
            None => ExtractRequest::default(),
        };
        if cli.modified_since.is_some() {
            request.modified_since = cli.modified_since;
        }
        if cli.app_id.is_some() {
            request.app_id = cli.app_id;
        }

        // Fail before any network traffic rather than after the first page.
        if let Some(since) = request.modified_since.as_deref() {
            parse_date_or_interval(since)?;
        }

        Ok(Self {
            api_key,
            api_base,
            output: cli.output.as_deref().map(expand_tilde),
            request,
            timeout_secs: cli.timeout,
            retry: RetryConfig {
                max_retries: cli.max_retries,
                ..RetryConfig::default()
            },
        })
    }
}

fn load_event(path: &std::path::Path) -> anyhow::Result<ExtractRequest> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read event file {}", path.display()))?;
    serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse event file {}", path.display()))
}

/// Parse a modification cutoff into a UTC timestamp.
///
/// Accepted forms:
/// - RFC 3339 with offset: `"2025-01-02T14:30:00+02:00"` (fractional seconds ok)
/// - ISO datetime without offset: `"2025-01-02T14:30:00"` (taken as UTC)
/// - ISO date: `"2025-01-02"` (midnight UTC)
/// - Relative interval: `"20d"` (20 days ago from now)
pub(crate) fn parse_date_or_interval(s: &str) -> anyhow::Result<DateTime<Utc>> {
    let s = s.trim();
    if let Some(days_str) = s.strip_suffix('d') {
        if let Ok(days) = days_str.parse::<i64>() {
            return chrono::Duration::try_days(days)
                .and_then(|interval| Utc::now().checked_sub_signed(interval))
                .with_context(|| format!("Interval '{s}' is out of range"));
        }
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        return Ok(dt.and_utc());
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        if let Some(naive_dt) = date.and_hms_opt(0, 0, 0) {
            return Ok(naive_dt.and_utc());
        }
    }
    anyhow::bail!(
        "Cannot parse '{}' as a timestamp. Expected RFC 3339 (2025-01-02T14:30:00+00:00), \
         datetime (2025-01-02T14:30:00), date (2025-01-02), or interval (20d)",
        s
    )
}
