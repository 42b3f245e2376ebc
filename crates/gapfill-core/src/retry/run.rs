//! Retry loop: run a closure until success or policy says stop.

use std::time::Duration;

use super::classify;
use super::policy::{RetryDecision, RetryPolicy};
use crate::connector::ConnectorError;

/// Runs a closure until it succeeds or the retry policy says to stop.
/// On retryable failure, sleeps for the backoff duration then tries again.
pub fn run_with_retry<T, F>(policy: &RetryPolicy, f: F) -> Result<T, ConnectorError>
where
    F: FnMut() -> Result<T, ConnectorError>,
{
    run_with_retry_using(policy, std::thread::sleep, f)
}

/// Same as [`run_with_retry`] with an injectable sleep, so callers can observe backoff.
pub fn run_with_retry_using<T, F, S>(
    policy: &RetryPolicy,
    mut sleep: S,
    mut f: F,
) -> Result<T, ConnectorError>
where
    F: FnMut() -> Result<T, ConnectorError>,
    S: FnMut(Duration),
{
    let mut attempt = 1u32;
    loop {
        match f() {
            Ok(v) => return Ok(v),
            Err(e) => {
                let kind = classify::classify(&e);
                match policy.decide(attempt, kind) {
                    RetryDecision::NoRetry => return Err(e),
                    RetryDecision::RetryAfter(d) => {
                        tracing::debug!(attempt, ?kind, delay_ms = d.as_millis() as u64, "retrying after: {}", e);
                        sleep(d);
                        attempt += 1;
                    }
                }
            }
        }
    }
}
