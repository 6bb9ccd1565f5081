//! Retry policy shared by the page walker and the content fetcher
//!
//! # Decision Table
//!
//! | Condition | Action | Contributes |
//! |-----------|--------|-------------|
//! | Transfer interrupted | wait, retry exactly once | real value on retry success, placeholder otherwise |
//! | HTTP 429 | abort the run | nothing further this run |
//! | Anything else | no retry | placeholder, run continues |
//!
//! There is no backoff growth and no budget beyond the single retry.

use crate::clock::Clock;
use crate::FetchError;
use std::future::Future;
use std::time::Duration;
use tracing::warn;

/// What to do about a failed request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryAction {
    /// Wait `delay`, then try the same request one more time
    RetryOnce { delay: Duration },

    /// Stop the current run, keeping what has been collected
    Abort,

    /// Give up on this request and substitute a placeholder
    Skip,
}

/// Classifies request failures
pub trait RetryPolicy: Send + Sync {
    fn classify(&self, error: &FetchError) -> RetryAction;
}

/// The fixed single-retry policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedRetryPolicy {
    retry_delay: Duration,
}

impl FixedRetryPolicy {
    /// Default wait before retrying an interrupted transfer
    pub const DEFAULT_DELAY: Duration = Duration::from_secs(15);

    pub fn new(retry_delay: Duration) -> Self {
        Self { retry_delay }
    }
}

impl Default for FixedRetryPolicy {
    fn default() -> Self {
        Self::new(Self::DEFAULT_DELAY)
    }
}

impl RetryPolicy for FixedRetryPolicy {
    fn classify(&self, error: &FetchError) -> RetryAction {
        match error {
            FetchError::Interrupted { .. } => RetryAction::RetryOnce {
                delay: self.retry_delay,
            },
            FetchError::RateLimited { .. } => RetryAction::Abort,
            FetchError::Status { .. } | FetchError::Request { .. } | FetchError::Malformed { .. } => {
                RetryAction::Skip
            }
        }
    }
}

/// Which try of a request is being made
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attempt {
    First,
    Retry,
}

/// Final result of one request under a retry policy
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution<T> {
    /// Succeeded on the first try
    Fresh(T),

    /// Succeeded on the single retry
    Retried(T),

    /// The single retry failed too
    RetryFailed(FetchError),

    /// Failed without a retry
    Skipped(FetchError),

    /// The policy asked to abort the run
    Aborted(FetchError),
}

/// Runs one request under `policy`
///
/// `op` is called with [`Attempt::First`] and, if the policy allows a retry,
/// once more with [`Attempt::Retry`] after sleeping on `clock`. Whatever the
/// retry fails with, including a rate limit, degrades to
/// [`Resolution::RetryFailed`].
pub async fn resolve<T, F, Fut>(policy: &dyn RetryPolicy, clock: &dyn Clock, mut op: F) -> Resolution<T>
where
    F: FnMut(Attempt) -> Fut,
    Fut: Future<Output = Result<T, FetchError>>,
{
    let error = match op(Attempt::First).await {
        Ok(value) => return Resolution::Fresh(value),
        Err(error) => error,
    };

    match policy.classify(&error) {
        RetryAction::Abort => Resolution::Aborted(error),
        RetryAction::Skip => Resolution::Skipped(error),
        RetryAction::RetryOnce { delay } => {
            warn!("{}; retrying after {}s", error, delay.as_secs_f64());
            clock.sleep(delay).await;

            match op(Attempt::Retry).await {
                Ok(value) => Resolution::Retried(value),
                Err(retry_error) => Resolution::RetryFailed(retry_error),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use std::cell::RefCell;
    use std::collections::VecDeque;

    fn interrupted() -> FetchError {
        FetchError::Interrupted {
            url: "u".to_string(),
            message: "connection closed before message completed".to_string(),
        }
    }

    fn limited() -> FetchError {
        FetchError::RateLimited {
            url: "u".to_string(),
        }
    }

    fn status(code: u16) -> FetchError {
        FetchError::Status {
            url: "u".to_string(),
            status: code,
        }
    }

    /// Replays a fixed sequence of results and records the attempts made
    async fn run(script: Vec<Result<u32, FetchError>>) -> (Resolution<u32>, Vec<Attempt>, ManualClock) {
        let clock = ManualClock::new();
        let script = RefCell::new(VecDeque::from(script));
        let attempts = RefCell::new(Vec::new());
        let policy = FixedRetryPolicy::default();

        let resolution = resolve(&policy, &clock, |attempt| {
            attempts.borrow_mut().push(attempt);
            let next = script.borrow_mut().pop_front().expect("script exhausted");
            async move { next }
        })
        .await;

        (resolution, attempts.into_inner(), clock)
    }

    #[test]
    fn test_decision_table() {
        let policy = FixedRetryPolicy::new(Duration::from_secs(15));

        assert_eq!(
            policy.classify(&interrupted()),
            RetryAction::RetryOnce {
                delay: Duration::from_secs(15)
            }
        );
        assert_eq!(policy.classify(&limited()), RetryAction::Abort);
        assert_eq!(policy.classify(&status(404)), RetryAction::Skip);
        assert_eq!(policy.classify(&status(500)), RetryAction::Skip);
        assert_eq!(
            policy.classify(&FetchError::Malformed {
                url: "u".to_string(),
                message: "eof".to_string()
            }),
            RetryAction::Skip
        );
        assert_eq!(
            policy.classify(&FetchError::Request {
                url: "u".to_string(),
                message: "timeout".to_string()
            }),
            RetryAction::Skip
        );
    }

    #[tokio::test]
    async fn test_first_try_success() {
        let (resolution, attempts, clock) = run(vec![Ok(7)]).await;
        assert_eq!(resolution, Resolution::Fresh(7));
        assert_eq!(attempts, vec![Attempt::First]);
        assert_eq!(clock.total_slept(), Duration::ZERO);
    }

    #[tokio::test]
    async fn test_interrupted_then_success() {
        let (resolution, attempts, clock) = run(vec![Err(interrupted()), Ok(9)]).await;
        assert_eq!(resolution, Resolution::Retried(9));
        assert_eq!(attempts, vec![Attempt::First, Attempt::Retry]);
        assert_eq!(clock.sleeps(), vec![Duration::from_secs(15)]);
    }

    #[tokio::test]
    async fn test_interrupted_twice_degrades() {
        let (resolution, attempts, _) = run(vec![Err(interrupted()), Err(interrupted())]).await;
        assert!(matches!(resolution, Resolution::RetryFailed(FetchError::Interrupted { .. })));
        assert_eq!(attempts.len(), 2);
    }

    #[tokio::test]
    async fn test_rate_limit_on_retry_degrades_instead_of_aborting() {
        let (resolution, _, _) = run(vec![Err(interrupted()), Err(limited())]).await;
        assert!(matches!(resolution, Resolution::RetryFailed(FetchError::RateLimited { .. })));
    }

    #[tokio::test]
    async fn test_rate_limit_aborts_without_retry() {
        let (resolution, attempts, clock) = run(vec![Err(limited())]).await;
        assert!(matches!(resolution, Resolution::Aborted(_)));
        assert_eq!(attempts, vec![Attempt::First]);
        assert_eq!(clock.total_slept(), Duration::ZERO);
    }

    #[tokio::test]
    async fn test_other_errors_skip_without_retry() {
        let (resolution, attempts, _) = run(vec![Err(status(500))]).await;
        assert_eq!(resolution, Resolution::Skipped(status(500)));
        assert_eq!(attempts, vec![Attempt::First]);
    }
}
