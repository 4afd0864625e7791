//! Bounded retry with randomized exponential backoff

use super::ResolveFailure;
use crate::config::RetryConfig;
use rand::Rng;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

/// Retries transient resolver failures
///
/// Only `ResolveFailure::Transient` is retried. After `max_attempts`
/// the last transient failure is returned to the caller.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    config: RetryConfig,
}

impl RetryPolicy {
    pub fn new(config: RetryConfig) -> Self {
        Self { config }
    }

    /// Policy that makes exactly one attempt
    pub fn no_retry() -> Self {
        Self::new(RetryConfig {
            max_attempts: 1,
            base_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
        })
    }

    /// Upper bound of the delay before retry number `retry` (1-based)
    pub fn delay_ceiling(&self, retry: u32) -> Duration {
        let exponent = retry.saturating_sub(1).min(31);
        self.config
            .base_delay
            .saturating_mul(1u32 << exponent)
            .min(self.config.max_delay)
    }

    /// Randomized delay before retry number `retry`
    pub fn delay_for(&self, retry: u32) -> Duration {
        let ceiling = self.delay_ceiling(retry);
        let floor = self.config.base_delay.min(ceiling);
        if ceiling <= floor {
            return ceiling;
        }

        let millis = rand::thread_rng().gen_range(floor.as_millis()..=ceiling.as_millis());
        Duration::from_millis(u64::try_from(millis).unwrap_or(u64::MAX))
    }

    /// Run `op` until it succeeds, fails permanently, or attempts run out
    pub async fn run<T, F, Fut>(&self, what: &str, mut op: F) -> Result<T, ResolveFailure>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ResolveFailure>>,
    {
        let max_attempts = self.config.max_attempts.max(1);
        let mut attempt = 1;

        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(failure) if failure.is_transient() && attempt < max_attempts => {
                    let delay = self.delay_for(attempt);
                    warn!(
                        mention = what,
                        attempt,
                        max_attempts,
                        next_retry_ms = delay.as_millis() as u64,
                        error = %failure,
                        "Resolution attempt failed, backing off"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(failure) => {
                    if failure.is_transient() {
                        warn!(mention = what, attempts = attempt, "Retries exhausted");
                    } else {
                        debug!(mention = what, error = %failure, "Resolution failed permanently");
                    }
                    return Err(failure);
                }
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(RetryConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn instant_policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy::new(RetryConfig {
            max_attempts,
            base_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
        })
    }

    #[test]
    fn test_delay_ceiling_grows_and_caps() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_ceiling(1), Duration::from_secs(1));
        assert_eq!(policy.delay_ceiling(2), Duration::from_secs(2));
        assert_eq!(policy.delay_ceiling(3), Duration::from_secs(4));
        assert_eq!(policy.delay_ceiling(4), Duration::from_secs(8));
        assert_eq!(policy.delay_ceiling(5), Duration::from_secs(10));
        assert_eq!(policy.delay_ceiling(60), Duration::from_secs(10));
    }

    #[test]
    fn test_delay_stays_within_bounds() {
        let policy = RetryPolicy::default();
        for retry in 1..=6 {
            let delay = policy.delay_for(retry);
            assert!(delay >= Duration::from_secs(1));
            assert!(delay <= policy.delay_ceiling(retry));
        }
    }

    #[tokio::test]
    async fn test_retries_transient_until_success() {
        let calls = AtomicU32::new(0);
        let counter = &calls;
        let result = instant_policy(5)
            .run("Gutenberg", move || async move {
                let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
                if n < 3 {
                    Err(ResolveFailure::Transient("503".into()))
                } else {
                    Ok(n)
                }
            })
            .await;

        assert_eq!(result, Ok(3));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_stops_after_max_attempts() {
        let calls = AtomicU32::new(0);
        let counter = &calls;
        let result: Result<(), _> = instant_policy(4)
            .run("Gutenberg", move || async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err(ResolveFailure::Transient("timeout".into()))
            })
            .await;

        assert_eq!(result, Err(ResolveFailure::Transient("timeout".into())));
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_permanent_failures_are_not_retried() {
        for failure in [ResolveFailure::NotFound, ResolveFailure::Malformed("bad".into())] {
            let calls = AtomicU32::new(0);
            let counter = &calls;
            let returned = failure.clone();
            let result: Result<(), _> = instant_policy(5)
                .run("x", move || {
                    let returned = returned.clone();
                    async move {
                        counter.fetch_add(1, Ordering::SeqCst);
                        Err(returned)
                    }
                })
                .await;

            assert_eq!(result, Err(failure));
            assert_eq!(calls.load(Ordering::SeqCst), 1);
        }
    }
}
