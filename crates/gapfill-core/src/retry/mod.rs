//! Retry and backoff policy.
//!
//! This module encapsulates error classification (timeouts, connection
//! failures, authentication and not-found answers) and exponential backoff
//! decisions so that every call to a remote site shares one policy. Connectors
//! return typed errors; only this layer decides whether to try again.

mod classify;
mod policy;
mod run;

pub use classify::{classify, classify_curl_error};
pub use policy::{ErrorKind, RetryDecision, RetryPolicy};
pub use run::{run_with_retry, run_with_retry_using};
