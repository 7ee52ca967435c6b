use std::time::Duration;

use chrono::{DateTime, Utc};

/// Header carrying the instant at which a throttled client may resume.
pub const RATE_LIMIT_RESET_HEADER: &str = "X-RateLimit-Reset";

/// Retry decision returned after recording a transient failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryAction {
    Retry,
    Abort,
}

/// Rate-limit recovery settings.
///
/// The wait is directed by the server's reset timestamp rather than by an
/// exponential schedule; `fallback_delay_secs` only applies when that
/// header is missing or malformed.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    pub max_retries: u32,
    pub fallback_delay_secs: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 5,
            fallback_delay_secs: 5,
        }
    }
}

impl RetryConfig {
    /// How long to wait before re-requesting a throttled page.
    ///
    /// A reset time already in the past yields a zero wait.
    pub fn delay_until_reset(&self, reset_header: Option<&str>, now: DateTime<Utc>) -> Duration {
        match reset_header.and_then(parse_reset_time) {
            Some(reset_at) => (reset_at - now).to_std().unwrap_or(Duration::ZERO),
            None => Duration::from_secs(self.fallback_delay_secs),
        }
    }

    pub fn budget(&self) -> RetryBudget {
        RetryBudget::new(self.max_retries)
    }
}

/// Parse an `X-RateLimit-Reset` value such as `2024-03-01T12:00:03+00:00`.
///
/// Accepts RFC 3339 and the colon-less offset form (`+0000`).
pub fn parse_reset_time(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    DateTime::parse_from_rfc3339(value)
        .or_else(|_| DateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%z"))
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Transient-failure counter for a whole invocation.
///
/// Never reset between pages: `max` throttled responses across the entire
/// pull exhaust it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryBudget {
    used: u32,
    max: u32,
}

impl RetryBudget {
    pub fn new(max: u32) -> Self {
        Self { used: 0, max }
    }

    /// Record one transient failure.
    pub fn consume(&mut self) -> RetryAction {
        self.used = self.used.saturating_add(1);
        if self.used >= self.max {
            RetryAction::Abort
        } else {
            RetryAction::Retry
        }
    }

    pub fn used(&self) -> u32 {
        self.used
    }

    pub fn max(&self) -> u32 {
        self.max
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_default_config() {
        let config = RetryConfig::default();
        assert_eq!(config.max_retries, 5);
        assert_eq!(config.fallback_delay_secs, 5);
    }

    #[test]
    fn test_delay_from_reset_header() {
        let config = RetryConfig::default();
        let d = config.delay_until_reset(Some("2024-03-01T12:00:03+00:00"), now());
        assert_eq!(d, Duration::from_secs(3));
    }

    #[test]
    fn test_delay_honours_offset() {
        let config = RetryConfig::default();
        // 13:00:03 at +01:00 is 12:00:03 UTC
        let d = config.delay_until_reset(Some("2024-03-01T13:00:03+0100"), now());
        assert_eq!(d, Duration::from_secs(3));
    }

    #[test]
    fn test_delay_past_reset_is_zero() {
        let config = RetryConfig::default();
        let d = config.delay_until_reset(Some("2024-03-01T11:59:00+00:00"), now());
        assert_eq!(d, Duration::ZERO);
    }

    #[test]
    fn test_delay_missing_header_falls_back() {
        let config = RetryConfig::default();
        assert_eq!(config.delay_until_reset(None, now()), Duration::from_secs(5));
    }

    #[test]
    fn test_delay_garbage_header_falls_back() {
        let config = RetryConfig::default();
        assert_eq!(
            config.delay_until_reset(Some("soon"), now()),
            Duration::from_secs(5)
        );
        assert_eq!(
            config.delay_until_reset(Some("2024-03-01 12:00:03"), now()),
            Duration::from_secs(5)
        );
    }

    #[test]
    fn test_parse_reset_time_fractional_seconds() {
        let parsed = parse_reset_time("2024-03-01T12:00:03.250Z").unwrap();
        assert_eq!(parsed.timestamp_millis(), now().timestamp_millis() + 3250);
    }

    #[test]
    fn test_budget_aborts_at_max() {
        let mut budget = RetryBudget::new(3);
        assert_eq!(budget.consume(), RetryAction::Retry);
        assert_eq!(budget.consume(), RetryAction::Retry);
        assert_eq!(budget.consume(), RetryAction::Abort);
        assert_eq!(budget.used(), 3);
        assert_eq!(budget.max(), 3);
    }

    #[test]
    fn test_budget_from_config() {
        let budget = RetryConfig::default().budget();
        assert_eq!(budget.used(), 0);
        assert_eq!(budget.max(), 5);
    }
}
