use std::fmt::Debug;
use std::time::Duration;

use futures::future::BoxFuture;

use super::constants::DEFAULT_MAX_RETRIES;

/// Specifies the backoff strategy for retrying failed requests.
#[derive(Clone, Debug, PartialEq)]
pub enum Backoff {
    /// Uses a fixed delay between retries.
    Fixed(Duration),
    /// Uses an exponential delay between retries.
    /// The delay after attempt `n` (1-based) is `base * factor^n`, capped at `max`.
    Exponential {
        /// The unit the exponential term is multiplied with.
        base: Duration,
        /// The multiplicative factor for each subsequent retry.
        factor: f64,
        /// The maximum duration to wait between retries.
        max: Duration,
    },
}

impl Default for Backoff {
    /// `min(2^attempt, 60)` seconds.
    fn default() -> Self {
        Self::Exponential {
            base: Duration::from_secs(1),
            factor: 2.0,
            max: Duration::from_secs(60),
        }
    }
}

impl Backoff {
    /// Delay to wait after the failed attempt number `attempt` (1-based).
    #[must_use]
    pub fn delay(&self, attempt: u32) -> Duration {
        match self {
            Self::Fixed(d) => *d,
            Self::Exponential { base, factor, max } => {
                let exp = i32::try_from(attempt).unwrap_or(i32::MAX);
                let secs = base.as_secs_f64() * factor.powi(exp);
                if !secs.is_finite() || secs >= max.as_secs_f64() {
                    *max
                } else {
                    Duration::from_secs_f64(secs.max(0.0))
                }
            }
        }
    }
}

/// Configuration for the automatic retry mechanism.
#[derive(Clone, Debug, PartialEq)]
pub struct RetryConfig {
    /// Total number of attempts per request, including the first one.
    pub max_retries: u32,
    /// The backoff strategy to use between attempts.
    pub backoff: Backoff,
    /// Whether connection failures are retried like timeouts.
    pub retry_on_connect: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            backoff: Backoff::default(),
            retry_on_connect: false,
        }
    }
}

impl RetryConfig {
    pub(crate) fn retries_transport(&self, e: &reqwest::Error) -> bool {
        e.is_timeout() || (self.retry_on_connect && e.is_connect())
    }
}

/// How a response status is handled by the executor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum StatusClass {
    Success,
    /// 429 and 5xx.
    Retryable,
    /// Everything else; returned to the caller at once.
    Permanent,
}

impl StatusClass {
    pub(crate) const fn of(status: u16) -> Self {
        match status {
            200..=299 => Self::Success,
            429 | 500..=599 => Self::Retryable,
            _ => Self::Permanent,
        }
    }
}

/// Waits out a backoff delay.
///
/// The client calls [`sleep`](Sleeper::sleep) in async mode and
/// [`sleep_blocking`](Sleeper::sleep_blocking) in blocking mode. Swap in your
/// own implementation to observe or shorten delays.
pub trait Sleeper: Send + Sync + Debug {
    /// Suspend the current task for `delay`.
    fn sleep(&self, delay: Duration) -> BoxFuture<'static, ()>;

    /// Block the current thread for `delay`.
    fn sleep_blocking(&self, delay: Duration);
}

/// Real sleeping: `tokio::time::sleep` and `std::thread::sleep`.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemSleeper;

impl Sleeper for SystemSleeper {
    fn sleep(&self, delay: Duration) -> BoxFuture<'static, ()> {
        Box::pin(tokio::time::sleep(delay))
    }

    fn sleep_blocking(&self, delay: Duration) {
        std::thread::sleep(delay);
    }
}
