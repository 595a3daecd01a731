//! Retry policy and failure classification for media downloads.
//!
//! This module provides the [`RetryPolicy`] and [`FailureKind`] types.
//!
//! # Overview
//!
//! Every failed attempt is retried until the policy's attempt budget is spent;
//! the fetcher's error text says little about whether a later attempt would
//! succeed, so no failure short-circuits the loop. Between attempts the runner
//! sleeps for the [`Backoff`] delay.
//!
//! The last error of an exhausted entry is classified into a [`FailureKind`],
//! which is what the run history records as the entry's status code.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use queue_dl_core::download::{Backoff, RetryDecision, RetryPolicy};
//!
//! let policy = RetryPolicy::new(3, Backoff::Fixed(Duration::from_secs(5)));
//!
//! match policy.should_retry(1) {
//!     RetryDecision::Retry { delay, attempt } => {
//!         assert_eq!(delay, Duration::from_secs(5));
//!         assert_eq!(attempt, 2);
//!     }
//!     RetryDecision::DoNotRetry { reason } => panic!("unexpected: {reason}"),
//! }
//! ```

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use rand::Rng;
use tracing::{debug, instrument};

/// Default maximum attempts per URL.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Default base delay between attempts (5 seconds).
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(5);

/// Default maximum delay cap for exponential backoff (60 seconds).
const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(60);

/// Default backoff multiplier (doubles each attempt).
const DEFAULT_BACKOFF_MULTIPLIER: f32 = 2.0;

/// Maximum jitter added to exponential delays (500ms).
const MAX_JITTER: Duration = Duration::from_millis(500);

/// Classification of a terminal download failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FailureKind {
    /// The site throttled us (HTTP 429, "too many requests").
    RateLimited,
    /// The media requires age verification / sign-in.
    AgeRestricted,
    /// The media is private, removed, or does not exist.
    Unavailable,
    /// Anything else.
    Unknown,
}

impl FailureKind {
    /// Returns the status code label stored in the run history.
    #[must_use]
    pub fn status_code(self) -> &'static str {
        match self {
            Self::RateLimited => "RATE_LIMIT",
            Self::AgeRestricted => "AGE_LIMIT",
            Self::Unavailable => "UNAVAILABLE",
            Self::Unknown => "UNKNOWN_ERROR",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.status_code())
    }
}

/// How long to wait between attempts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Backoff {
    /// The same delay after every failed attempt.
    Fixed(Duration),
    /// `min(base * multiplier^(attempt-1), max)`, plus the policy's jitter.
    Exponential {
        /// Delay after the first failed attempt.
        base: Duration,
        /// Maximum delay cap.
        max: Duration,
        /// Multiplier applied each attempt (typically 2.0 for doubling).
        multiplier: f32,
    },
}

impl Backoff {
    /// Exponential backoff from `base`, doubling, capped at 60 seconds.
    #[must_use]
    pub fn exponential(base: Duration) -> Self {
        Self::Exponential {
            base,
            max: DEFAULT_MAX_DELAY.max(base),
            multiplier: DEFAULT_BACKOFF_MULTIPLIER,
        }
    }

    /// Builds the backoff of the given kind around `base`.
    #[must_use]
    pub fn from_kind(kind: BackoffKind, base: Duration) -> Self {
        match kind {
            BackoffKind::Fixed => Self::Fixed(base),
            BackoffKind::Exponential => Self::exponential(base),
        }
    }

    /// Delay after failed attempt number `attempt` (1-indexed), without jitter.
    #[must_use]
    pub fn base_delay(&self, attempt: u32) -> Duration {
        match *self {
            Self::Fixed(delay) => delay,
            Self::Exponential {
                base,
                max,
                multiplier,
            } => {
                let exponent = f64::from(attempt.saturating_sub(1));
                let delay_ms = base.as_millis() as f64 * f64::from(multiplier).powf(exponent);
                let capped_ms = delay_ms.min(max.as_millis() as f64);
                Duration::from_millis(capped_ms as u64)
            }
        }
    }
}

/// Configuration-level choice of backoff shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackoffKind {
    /// See [`Backoff::Fixed`].
    Fixed,
    /// See [`Backoff::Exponential`].
    #[default]
    Exponential,
}

impl BackoffKind {
    /// Returns the stable string label.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Fixed => "fixed",
            Self::Exponential => "exponential",
        }
    }
}

impl fmt::Display for BackoffKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for BackoffKind {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "fixed" => Ok(Self::Fixed),
            "exponential" => Ok(Self::Exponential),
            other => Err(format!(
                "invalid backoff '{other}': expected 'fixed' or 'exponential'"
            )),
        }
    }
}

/// Decision on whether to retry a failed download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryDecision {
    /// Retry the download after the specified delay.
    Retry {
        /// How long to wait before retrying.
        delay: Duration,
        /// Which attempt number this will be (1-indexed, so first retry is attempt 2).
        attempt: u32,
    },

    /// Do not retry the download.
    DoNotRetry {
        /// Human-readable reason why retry is not attempted.
        reason: String,
    },
}

/// Attempt budget and backoff between attempts.
///
/// # Default Values
///
/// - `max_attempts`: 3
/// - `backoff`: exponential from 5 seconds, doubling, capped at 60 seconds
/// - `jitter`: up to 500ms, exponential backoff only
///
/// With defaults, delays are approximately: 5s, 10s.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum number of attempts (including the initial attempt).
    max_attempts: u32,

    /// Delay shape between attempts.
    backoff: Backoff,

    /// Upper bound of random jitter added to exponential delays.
    jitter: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_RETRIES,
            backoff: Backoff::exponential(DEFAULT_RETRY_DELAY),
            jitter: MAX_JITTER,
        }
    }
}

impl RetryPolicy {
    /// Creates a policy with the given attempt budget (minimum 1) and backoff.
    ///
    /// Exponential backoff gets the default jitter; fixed backoff gets none.
    #[must_use]
    pub fn new(max_attempts: u32, backoff: Backoff) -> Self {
        let jitter = match backoff {
            Backoff::Fixed(_) => Duration::ZERO,
            Backoff::Exponential { .. } => MAX_JITTER,
        };
        Self {
            max_attempts: max_attempts.max(1),
            backoff,
            jitter,
        }
    }

    /// Creates a policy with a custom max_attempts, using defaults for other settings.
    #[must_use]
    pub fn with_max_attempts(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            ..Self::default()
        }
    }

    /// Creates a policy that retries immediately. Useful for tests and dry runs.
    #[must_use]
    pub fn immediate(max_attempts: u32) -> Self {
        Self::new(max_attempts, Backoff::Fixed(Duration::ZERO))
    }

    /// Overrides the jitter upper bound.
    #[must_use]
    pub fn with_jitter(mut self, jitter: Duration) -> Self {
        self.jitter = jitter;
        self
    }

    /// Returns the maximum number of attempts configured.
    #[must_use]
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Returns the configured backoff.
    #[must_use]
    pub fn backoff(&self) -> Backoff {
        self.backoff
    }

    /// Determines whether to retry after attempt number `attempt` (1-indexed) failed.
    #[instrument(skip(self), fields(max_attempts = self.max_attempts))]
    pub fn should_retry(&self, attempt: u32) -> RetryDecision {
        if attempt >= self.max_attempts {
            debug!(attempt, max = self.max_attempts, "max attempts reached");
            return RetryDecision::DoNotRetry {
                reason: format!("max attempts ({}) exhausted", self.max_attempts),
            };
        }

        let delay = self.calculate_delay(attempt);

        debug!(
            attempt,
            next_attempt = attempt + 1,
            delay_ms = delay.as_millis(),
            "will retry"
        );

        RetryDecision::Retry {
            delay,
            attempt: attempt + 1,
        }
    }

    /// Calculates the delay after a failed attempt, including jitter.
    fn calculate_delay(&self, attempt: u32) -> Duration {
        self.backoff.base_delay(attempt) + self.calculate_jitter()
    }

    /// Generates random jitter between 0 and the configured bound.
    fn calculate_jitter(&self) -> Duration {
        if self.jitter.is_zero() {
            return Duration::ZERO;
        }
        let mut rng = rand::thread_rng();
        let jitter_ms = rng.gen_range(0..=self.jitter.as_millis() as u64);
        Duration::from_millis(jitter_ms)
    }
}

/// Classifies a fetcher error message into a [`FailureKind`].
///
/// | Message contains | Kind |
/// |------------------|------|
/// | `429`, `too many requests`, `rate limit`, `rate-limit` | RateLimited |
/// | `age` together with `restrict`, `confirm your age`, `sign in to confirm` | AgeRestricted |
/// | `video unavailable`, `private video`, `has been removed`, `not available`, `http error 404`, `http error 410` | Unavailable |
/// | anything else | Unknown |
#[must_use]
pub fn classify_error(message: &str) -> FailureKind {
    let msg = message.to_lowercase();

    if msg.contains("429")
        || msg.contains("too many requests")
        || msg.contains("rate limit")
        || msg.contains("rate-limit")
    {
        return FailureKind::RateLimited;
    }

    if (msg.contains("age") && msg.contains("restrict"))
        || msg.contains("confirm your age")
        || msg.contains("sign in to confirm")
    {
        return FailureKind::AgeRestricted;
    }

    if msg.contains("video unavailable")
        || msg.contains("private video")
        || msg.contains("has been removed")
        || msg.contains("not available")
        || msg.contains("http error 404")
        || msg.contains("http error 410")
    {
        return FailureKind::Unavailable;
    }

    FailureKind::Unknown
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    // ==================== RetryPolicy Tests ====================

    #[test]
    fn test_retry_policy_default_values() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts, 3);
        assert_eq!(policy.backoff, Backoff::exponential(Duration::from_secs(5)));
        assert_eq!(policy.jitter, Duration::from_millis(500));
    }

    #[test]
    fn test_retry_policy_with_max_attempts() {
        let policy = RetryPolicy::with_max_attempts(5);
        assert_eq!(policy.max_attempts(), 5);
        assert_eq!(policy.backoff(), RetryPolicy::default().backoff());
    }

    #[test]
    fn test_retry_policy_max_attempts_minimum_is_one() {
        assert_eq!(RetryPolicy::with_max_attempts(0).max_attempts(), 1);
        assert_eq!(RetryPolicy::immediate(0).max_attempts(), 1);
    }

    #[test]
    fn test_fixed_backoff_has_no_jitter() {
        let policy = RetryPolicy::new(4, Backoff::Fixed(Duration::from_secs(5)));
        for attempt in 1..4 {
            assert_eq!(policy.calculate_delay(attempt), Duration::from_secs(5));
        }
    }

    // ==================== Delay Calculation Tests ====================

    #[test]
    fn test_exponential_delay_doubles() {
        let backoff = Backoff::exponential(Duration::from_secs(1));
        assert_eq!(backoff.base_delay(1), Duration::from_secs(1));
        assert_eq!(backoff.base_delay(2), Duration::from_secs(2));
        assert_eq!(backoff.base_delay(3), Duration::from_secs(4));
    }

    #[test]
    fn test_exponential_delay_respects_max() {
        let backoff = Backoff::Exponential {
            base: Duration::from_secs(1),
            max: Duration::from_secs(5),
            multiplier: 2.0,
        };
        // 6th attempt would be 1 * 2^5 = 32s, but capped at 5s
        assert_eq!(backoff.base_delay(6), Duration::from_secs(5));
    }

    #[test]
    fn test_exponential_max_never_below_base() {
        let backoff = Backoff::exponential(Duration::from_secs(120));
        assert_eq!(backoff.base_delay(1), Duration::from_secs(120));
    }

    #[test]
    fn test_delay_with_jitter_within_bounds() {
        let policy = RetryPolicy::new(5, Backoff::exponential(Duration::from_secs(1)));
        for _ in 0..100 {
            let delay = policy.calculate_delay(2);
            assert!(delay >= Duration::from_secs(2));
            assert!(delay <= Duration::from_millis(2500));
        }
    }

    #[test]
    fn test_zero_jitter_override() {
        let policy = RetryPolicy::default().with_jitter(Duration::ZERO);
        assert_eq!(policy.calculate_delay(1), Duration::from_secs(5));
    }

    #[test]
    fn test_backoff_from_kind() {
        let base = Duration::from_secs(3);
        assert_eq!(
            Backoff::from_kind(BackoffKind::Fixed, base),
            Backoff::Fixed(base)
        );
        assert_eq!(
            Backoff::from_kind(BackoffKind::Exponential, base),
            Backoff::exponential(base)
        );
    }

    #[test]
    fn test_backoff_kind_parse() {
        assert_eq!("fixed".parse::<BackoffKind>().unwrap(), BackoffKind::Fixed);
        assert_eq!(
            " Exponential ".parse::<BackoffKind>().unwrap(),
            BackoffKind::Exponential
        );
        assert!("linear".parse::<BackoffKind>().is_err());
        assert_eq!(BackoffKind::default().to_string(), "exponential");
    }

    // ==================== Should Retry Decision Tests ====================

    #[test]
    fn test_should_retry_respects_max_attempts() {
        let policy = RetryPolicy::immediate(3);

        assert!(matches!(
            policy.should_retry(1),
            RetryDecision::Retry { attempt: 2, .. }
        ));
        assert!(matches!(
            policy.should_retry(2),
            RetryDecision::Retry { attempt: 3, .. }
        ));

        let decision = policy.should_retry(3);
        if let RetryDecision::DoNotRetry { reason } = decision {
            assert!(reason.contains("exhausted"));
        } else {
            panic!("expected DoNotRetry, got {decision:?}");
        }
    }

    #[test]
    fn test_single_attempt_policy_never_retries() {
        let policy = RetryPolicy::immediate(1);
        assert!(matches!(
            policy.should_retry(1),
            RetryDecision::DoNotRetry { .. }
        ));
    }

    // ==================== Error Classification Tests ====================

    #[test]
    fn test_classify_rate_limited() {
        assert_eq!(
            classify_error("ERROR: unable to download webpage: HTTP Error 429: Too Many Requests"),
            FailureKind::RateLimited
        );
        assert_eq!(
            classify_error("Rate limit reached, try again later"),
            FailureKind::RateLimited
        );
    }

    #[test]
    fn test_classify_age_restricted() {
        assert_eq!(
            classify_error("ERROR: [youtube] x: Sign in to confirm your age. This video may be inappropriate"),
            FailureKind::AgeRestricted
        );
        assert_eq!(
            classify_error("This video is age-restricted"),
            FailureKind::AgeRestricted
        );
    }

    #[test]
    fn test_classify_unavailable() {
        assert_eq!(
            classify_error("ERROR: [youtube] abc: Video unavailable"),
            FailureKind::Unavailable
        );
        assert_eq!(
            classify_error("ERROR: [youtube] abc: Private video"),
            FailureKind::Unavailable
        );
        assert_eq!(
            classify_error("HTTP Error 404: Not Found"),
            FailureKind::Unavailable
        );
    }

    #[test]
    fn test_classify_unknown() {
        assert_eq!(classify_error("something odd"), FailureKind::Unknown);
        assert_eq!(classify_error(""), FailureKind::Unknown);
    }

    #[test]
    fn test_failure_kind_status_codes() {
        assert_eq!(FailureKind::RateLimited.status_code(), "RATE_LIMIT");
        assert_eq!(FailureKind::AgeRestricted.status_code(), "AGE_LIMIT");
        assert_eq!(FailureKind::Unavailable.status_code(), "UNAVAILABLE");
        assert_eq!(FailureKind::Unknown.to_string(), "UNKNOWN_ERROR");
    }

    // ==================== Constants Tests ====================

    #[test]
    fn test_default_max_retries_constant() {
        assert_eq!(DEFAULT_MAX_RETRIES, 3);
    }
}
