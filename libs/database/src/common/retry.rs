//! Startup retry for database connections.

use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

/// Doubling delays between attempts, capped at `max_delay`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backoff {
    /// Attempts after the first one
    pub retries: u32,
    pub first_delay: Duration,
    pub max_delay: Duration,
}

impl Default for Backoff {
    /// 5 retries from 200 ms up to 5 s; about 6 s before giving up.
    fn default() -> Self {
        Self {
            retries: 5,
            first_delay: Duration::from_millis(200),
            max_delay: Duration::from_secs(5),
        }
    }
}

impl Backoff {
    pub fn new(retries: u32, first_delay: Duration) -> Self {
        Self {
            retries,
            first_delay,
            ..Self::default()
        }
    }

    /// Delay before retry `n` (1-based).
    pub fn delay(&self, n: u32) -> Duration {
        let factor = 1u32.checked_shl(n.saturating_sub(1)).unwrap_or(u32::MAX);
        self.first_delay
            .checked_mul(factor)
            .map_or(self.max_delay, |d| d.min(self.max_delay))
    }

    /// Runs `attempt` until it succeeds or the retries run out; the last
    /// error is returned unchanged.
    pub async fn run<F, Fut, T, E>(&self, mut attempt: F) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: std::fmt::Display,
    {
        let mut n = 0;
        loop {
            match attempt().await {
                Ok(value) => return Ok(value),
                Err(e) if n >= self.retries => {
                    warn!(attempts = n + 1, error = %e, "Giving up");
                    return Err(e);
                }
                Err(e) => {
                    n += 1;
                    let delay = self.delay(n);
                    debug!(retry = n, delay_ms = delay.as_millis() as u64, error = %e, "Retrying");
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }
}
