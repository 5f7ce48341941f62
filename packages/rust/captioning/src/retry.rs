//! Rate-limit retry policy for the captioning call.

use std::time::Duration;

use reqwest::header::HeaderMap;

/// Header carrying the provider's suggested wait in milliseconds.
pub const RETRY_AFTER_MS_HEADER: &str = "retry-after-ms";

/// How the client reacts to HTTP 429.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Wait used when the provider's hint is missing, unparsable, or zero.
    pub default_delay: Duration,
    /// Maximum number of retries after a 429. `None` retries forever.
    pub max_retries: Option<u32>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            default_delay: Duration::from_millis(2000),
            max_retries: None,
        }
    }
}

impl RetryPolicy {
    /// Delay to sleep before reissuing a rate-limited request.
    pub fn delay_for(&self, headers: &HeaderMap) -> Duration {
        headers
            .get(RETRY_AFTER_MS_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(parse_retry_after_ms)
            .map(Duration::from_millis)
            .unwrap_or(self.default_delay)
    }

    /// Whether another retry is allowed after `retries_so_far` retries.
    pub fn allows_retry(&self, retries_so_far: u32) -> bool {
        self.max_retries.is_none_or(|max| retries_so_far < max)
    }
}

/// Parse the leading integer of a `retry-after-ms` value.
///
/// Fractional values are truncated (`"512.7"` → 512). Zero and anything
/// without leading digits yield `None`.
pub fn parse_retry_after_ms(raw: &str) -> Option<u64> {
    let digits: String = raw
        .trim()
        .chars()
        .take_while(char::is_ascii_digit)
        .collect();
    digits.parse::<u64>().ok().filter(|ms| *ms > 0)
}
