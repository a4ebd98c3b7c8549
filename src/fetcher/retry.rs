use std::time::Duration;
use tokio_retry::strategy::ExponentialBackoff;

/// How many times to call the provider, and how long to wait between calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one. Always at least 1.
    pub max_attempts: u32,
    /// Wait after the first failure; doubles after every further failure.
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
    pub const DEFAULT_BASE_DELAY: Duration = Duration::from_secs(2);

    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
        }
    }

    /// Delays between attempts, ready for `tokio_retry::Retry`.
    ///
    /// Yields `base_delay * 2^(n-1)` after failure `n`, and one delay fewer than
    /// `max_attempts`, so nothing is slept after the last failure.
    pub fn backoff(&self) -> impl Iterator<Item = Duration> {
        let base_ms = u64::try_from(self.base_delay.as_millis()).unwrap_or(u64::MAX);
        // from_millis(2) yields 2, 4, 8.. times the factor; halve to start at base_ms.
        ExponentialBackoff::from_millis(2)
            .factor(base_ms)
            .map(|delay| delay / 2)
            .take(self.max_attempts.saturating_sub(1) as usize)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(Self::DEFAULT_MAX_ATTEMPTS, Self::DEFAULT_BASE_DELAY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_default_schedule_is_two_then_four_seconds() {
        let delays: Vec<Duration> = RetryPolicy::default().backoff().collect();
        assert_eq!(delays, vec![Duration::from_secs(2), Duration::from_secs(4)]);
    }

    #[rstest]
    #[case(1, vec![])]
    #[case(2, vec![10])]
    #[case(4, vec![10, 20, 40])]
    fn test_schedule_length_follows_max_attempts(
        #[case] max_attempts: u32,
        #[case] millis: Vec<u64>,
    ) {
        let policy = RetryPolicy::new(max_attempts, Duration::from_millis(10));
        let expected: Vec<Duration> = millis.into_iter().map(Duration::from_millis).collect();
        assert_eq!(policy.backoff().collect::<Vec<_>>(), expected);
    }

    #[test]
    fn test_huge_delays_saturate() {
        let policy = RetryPolicy::new(100, Duration::from_secs(u64::MAX / 1000));
        let last = policy.backoff().last().unwrap();
        assert_eq!(last, Duration::from_millis(u64::MAX) / 2);
    }

    #[test]
    fn test_zero_attempts_is_clamped_to_one() {
        let policy = RetryPolicy::new(0, Duration::ZERO);
        assert_eq!(policy.max_attempts, 1);
        assert_eq!(policy.backoff().count(), 0);
    }
}
