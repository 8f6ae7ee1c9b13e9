use std::time::Duration;
use tokio_retry::strategy::{ExponentialBackoff, jitter};

/// Bounded retry policy for device-facing network calls. The delays between
/// attempts follow a jittered exponential backoff, capped at `max_delay`.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    initial_delay: Duration,
    max_delay: Duration,
    max_attempts: usize,
}

impl RetryPolicy {
    pub fn new(initial_delay: Duration, max_delay: Duration, max_attempts: usize) -> Self {
        RetryPolicy {
            initial_delay,
            max_delay,
            max_attempts,
        }
    }

    pub fn max_attempts(&self) -> usize {
        self.max_attempts
    }

    /// One delay per retry, so the total number of attempts is `max_attempts`.
    pub fn strategy(&self) -> impl Iterator<Item = Duration> {
        ExponentialBackoff::from_millis(self.initial_delay.as_millis() as u64)
            .factor(2)
            .max_delay(self.max_delay)
            .map(jitter)
            .take(self.max_attempts.saturating_sub(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio_retry::Retry;

    fn quick_policy(max_attempts: usize) -> RetryPolicy {
        RetryPolicy::new(Duration::from_millis(1), Duration::from_millis(2), max_attempts)
    }

    #[test]
    fn strategy_yields_one_delay_per_retry() {
        let delays = quick_policy(5).strategy().collect::<Vec<_>>();

        assert_eq!(delays.len(), 4);
        assert!(delays.iter().all(|delay| *delay <= Duration::from_millis(2)));
    }

    #[tokio::test]
    async fn returns_the_first_success_within_the_attempt_budget() {
        let attempts = AtomicUsize::new(0);

        let result = Retry::spawn(quick_policy(5).strategy(), || async {
            if attempts.fetch_add(1, Ordering::SeqCst) + 1 < 5 {
                Err("transport failure")
            } else {
                Ok("status")
            }
        })
        .await;

        assert_eq!(result, Ok("status"));
        assert_eq!(attempts.load(Ordering::SeqCst), 5);
    }

    #[tokio::test]
    async fn gives_up_after_the_configured_number_of_attempts() {
        let attempts = AtomicUsize::new(0);

        let result: Result<(), &str> = Retry::spawn(quick_policy(5).strategy(), || async {
            attempts.fetch_add(1, Ordering::SeqCst);
            Err("transport failure")
        })
        .await;

        assert_eq!(result, Err("transport failure"));
        assert_eq!(attempts.load(Ordering::SeqCst), 5);
    }
}
