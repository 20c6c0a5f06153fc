//! Bounded exponential backoff
//!
//! A pure retry combinator: the caller classifies each failure as transient
//! or permanent, the combinator owns timing. All waiting happens on the
//! calling task via `tokio::time::sleep`, so dropping the returned future
//! (timeout, `select!`) cancels the loop before the next attempt.

use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;
use tokio::time::{sleep, Instant};

/// Exponential backoff parameters
///
/// The interval starts at `initial_interval`, grows by `multiplier` after
/// every transient failure, and is capped at `max_interval`. The whole loop
/// stops once sleeping again would push total elapsed time past
/// `max_elapsed`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackoffPolicy {
    /// Delay before the second attempt
    pub initial_interval: Duration,
    /// Growth factor applied after each transient failure
    pub multiplier: f64,
    /// Upper bound on a single sleep
    pub max_interval: Duration,
    /// Cumulative budget across all attempts and sleeps
    pub max_elapsed: Duration,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            initial_interval: Duration::from_millis(500),
            multiplier: 2.0,
            max_interval: Duration::from_secs(2),
            max_elapsed: Duration::from_secs(5),
        }
    }
}

impl BackoffPolicy {
    fn next_interval(&self, current: Duration) -> Duration {
        current.mul_f64(self.multiplier).min(self.max_interval)
    }
}

/// Caller-side classification of a failed attempt
#[derive(Debug)]
pub enum RetryClass<E> {
    /// Worth retrying within the backoff budget
    Transient(E),
    /// Abort immediately, no further attempts
    Permanent(E),
}

/// Terminal outcome of an exhausted or aborted retry loop
#[derive(Debug, thiserror::Error)]
pub enum RetryError<E>
where
    E: std::fmt::Debug + std::fmt::Display,
{
    /// The attempt failed with an error classified as permanent
    #[error("{0}")]
    Permanent(E),
    /// Transient failures persisted past the backoff budget; carries the
    /// error from the final attempt
    #[error("{0}")]
    Exhausted(E),
}

impl<E: std::fmt::Debug + std::fmt::Display> RetryError<E> {
    /// Unwrap the underlying attempt error
    pub fn into_inner(self) -> E {
        match self {
            Self::Permanent(err) | Self::Exhausted(err) => err,
        }
    }
}

/// Run `op` until it succeeds, fails permanently, or the budget runs out.
///
/// `op` is re-invoked for every attempt; the first attempt happens
/// immediately with no initial delay.
pub async fn retry_with_backoff<T, E, F, Fut>(
    policy: &BackoffPolicy,
    mut op: F,
) -> std::result::Result<T, RetryError<E>>
where
    E: std::fmt::Debug + std::fmt::Display,
    F: FnMut() -> Fut,
    Fut: Future<Output = std::result::Result<T, RetryClass<E>>>,
{
    let started = Instant::now();
    let mut interval = policy.initial_interval;

    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(RetryClass::Permanent(err)) => return Err(RetryError::Permanent(err)),
            Err(RetryClass::Transient(err)) => {
                if started.elapsed() + interval > policy.max_elapsed {
                    return Err(RetryError::Exhausted(err));
                }
                sleep(interval).await;
                interval = policy.next_interval(interval);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn fast_policy() -> BackoffPolicy {
        BackoffPolicy {
            initial_interval: Duration::from_millis(5),
            multiplier: 2.0,
            max_interval: Duration::from_millis(20),
            max_elapsed: Duration::from_millis(100),
        }
    }

    #[tokio::test]
    async fn first_success_returns_immediately() {
        let attempts = AtomicU32::new(0);
        let counter = &attempts;
        let result: Result<u32, RetryError<String>> =
            retry_with_backoff(&fast_policy(), move || async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(7)
            })
            .await;
        assert_eq!(result.unwrap(), 7);
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn transient_failures_are_retried_until_success() {
        let attempts = AtomicU32::new(0);
        let counter = &attempts;
        let result: Result<u32, RetryError<String>> =
            retry_with_backoff(&fast_policy(), move || async move {
                let n = counter.fetch_add(1, Ordering::SeqCst);
                if n < 2 {
                    Err(RetryClass::Transient("index not ready".to_string()))
                } else {
                    Ok(42)
                }
            })
            .await;
        assert_eq!(result.unwrap(), 42);
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn permanent_failure_aborts_after_one_attempt() {
        let attempts = AtomicU32::new(0);
        let counter = &attempts;
        let result: Result<u32, RetryError<String>> =
            retry_with_backoff(&fast_policy(), move || async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err(RetryClass::Permanent("bad request".to_string()))
            })
            .await;
        assert!(matches!(result, Err(RetryError::Permanent(_))));
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn budget_exhaustion_returns_last_error() {
        let attempts = AtomicU32::new(0);
        let counter = &attempts;
        let result: Result<u32, RetryError<String>> =
            retry_with_backoff(&fast_policy(), move || async move {
                let n = counter.fetch_add(1, Ordering::SeqCst);
                Err(RetryClass::Transient(format!("attempt {n}")))
            })
            .await;
        match result {
            Err(RetryError::Exhausted(message)) => {
                let total = attempts.load(Ordering::SeqCst);
                assert!(total > 1, "expected more than one attempt, got {total}");
                assert_eq!(message, format!("attempt {}", total - 1));
            }
            other => panic!("expected exhaustion, got {other:?}"),
        }
    }

    #[test]
    fn interval_growth_is_capped() {
        let policy = fast_policy();
        let mut interval = policy.initial_interval;
        for _ in 0..10 {
            interval = policy.next_interval(interval);
        }
        assert_eq!(interval, policy.max_interval);
    }
}
