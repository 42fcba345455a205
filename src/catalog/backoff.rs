//! Capped exponential backoff for transient catalog failures.

use crate::config::ClientConfig;
use rand::Rng;
use std::time::Duration;

/// Suspends the calling thread between attempts.
pub trait Sleeper: Send + Sync {
    fn sleep(&self, duration: Duration);
}

/// Sleeps on the current thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Retry budget and delay schedule.
#[derive(Debug, Clone)]
pub struct BackoffPolicy {
    /// Attempts before giving up, including the first
    pub max_attempts: u32,
    /// Cap on one computed delay
    pub max_delay: Duration,
    /// Cap on the sum of all delays within one request
    pub max_elapsed: Duration,
    /// Add uniform jitter in `[0, 1)` seconds to computed delays
    pub jitter: bool,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self::from_config(&ClientConfig::default())
    }
}

impl BackoffPolicy {
    #[must_use]
    pub const fn from_config(config: &ClientConfig) -> Self {
        Self {
            max_attempts: config.max_attempts,
            max_delay: Duration::from_secs(config.max_backoff_secs),
            max_elapsed: Duration::from_secs(config.max_elapsed_secs),
            jitter: config.jitter,
        }
    }

    /// Delay after the `failures`-th consecutive transient failure (1-based).
    ///
    /// `min(2^(failures-1), max_delay)` plus jitter, or the upstream
    /// `Retry-After` value unchanged when one was sent.
    #[must_use]
    pub fn delay(&self, failures: u32, retry_after: Option<Duration>) -> Duration {
        if let Some(requested) = retry_after {
            return requested;
        }
        let exponent = failures.saturating_sub(1).min(16);
        let base = Duration::from_secs(1u64 << exponent).min(self.max_delay);
        if self.jitter {
            base + Duration::from_secs_f64(rand::thread_rng().gen_range(0.0..1.0))
        } else {
            base
        }
    }
}
