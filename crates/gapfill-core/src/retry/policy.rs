use std::time::Duration;

/// High-level classification of an error for retry purposes.
///
/// Callers map curl errors and connector answers into these kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Operation timed out (connect/read).
    Timeout,
    /// Network-level failure (connection refused/reset, DNS, short read).
    Connection,
    /// Login or permission rejected by the remote.
    Auth,
    /// Remote directory or file does not exist.
    NotFound,
    /// Listing answered "no files": an empty result, not a failure.
    NoMatchingFiles,
    /// Any other error (not retried).
    Other,
}

impl ErrorKind {
    /// Transient kinds are worth another attempt.
    pub fn is_transient(self) -> bool {
        matches!(self, ErrorKind::Timeout | ErrorKind::Connection)
    }
}

/// Decision returned by the retry policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Do not retry this error.
    NoRetry,
    /// Retry after the given delay.
    RetryAfter(Duration),
}

/// Exponential backoff policy: `base_delay * multiplier^(attempt-1)`, capped at `max_delay`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Maximum number of attempts (including the first).
    pub max_attempts: u32,
    /// Delay before the second attempt.
    pub base_delay: Duration,
    /// Factor applied to the delay after every further failure.
    pub multiplier: u32,
    /// Upper bound on backoff delay.
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
            multiplier: 2,
            max_delay: Duration::from_secs(60),
        }
    }
}

impl RetryPolicy {
    /// Policy that never sleeps; used where a retry loop must not block (tests, dry runs).
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            base_delay: Duration::ZERO,
            multiplier: 1,
            max_delay: Duration::ZERO,
        }
    }

    /// Backoff delay after failed attempt `attempt` (1-based), before the cap.
    fn backoff(&self, attempt: u32) -> Duration {
        let steps = attempt.saturating_sub(1).min(16);
        let factor = self.multiplier.max(1).saturating_pow(steps);
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }

    /// Compute the next backoff delay for a given attempt and error kind.
    ///
    /// `attempt` is 1-based (1 = first attempt). Returns `RetryDecision::NoRetry`
    /// when we should stop retrying.
    pub fn decide(&self, attempt: u32, kind: ErrorKind) -> RetryDecision {
        if attempt >= self.max_attempts || !kind.is_transient() {
            return RetryDecision::NoRetry;
        }
        RetryDecision::RetryAfter(self.backoff(attempt))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_retry_for_permanent_kinds() {
        let p = RetryPolicy::default();
        for kind in [
            ErrorKind::Auth,
            ErrorKind::NotFound,
            ErrorKind::NoMatchingFiles,
            ErrorKind::Other,
        ] {
            assert_eq!(p.decide(1, kind), RetryDecision::NoRetry, "{:?}", kind);
        }
    }

    #[test]
    fn exponential_backoff_doubles_and_is_capped() {
        let mut p = RetryPolicy::default();
        p.max_attempts = 20;
        p.max_delay = Duration::from_secs(10);
        let delay = |attempt| match p.decide(attempt, ErrorKind::Timeout) {
            RetryDecision::RetryAfter(d) => d,
            RetryDecision::NoRetry => panic!("expected retry"),
        };
        assert_eq!(delay(1), Duration::from_secs(1));
        assert_eq!(delay(2), Duration::from_secs(2));
        assert_eq!(delay(3), Duration::from_secs(4));
        assert_eq!(delay(4), Duration::from_secs(8));
        assert_eq!(delay(5), Duration::from_secs(10));
        assert_eq!(delay(19), Duration::from_secs(10));
    }

    #[test]
    fn respects_max_attempts() {
        let p = RetryPolicy::default();
        assert!(matches!(
            p.decide(1, ErrorKind::Connection),
            RetryDecision::RetryAfter(_)
        ));
        assert!(matches!(
            p.decide(2, ErrorKind::Connection),
            RetryDecision::RetryAfter(_)
        ));
        assert_eq!(p.decide(3, ErrorKind::Connection), RetryDecision::NoRetry);
    }

    #[test]
    fn immediate_policy_has_zero_delay() {
        let p = RetryPolicy::immediate(2);
        assert_eq!(
            p.decide(1, ErrorKind::Timeout),
            RetryDecision::RetryAfter(Duration::ZERO)
        );
        assert_eq!(p.decide(2, ErrorKind::Timeout), RetryDecision::NoRetry);
    }
}
