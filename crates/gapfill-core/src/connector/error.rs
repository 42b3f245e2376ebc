//! Connector error type for retry classification.

/// Error returned by a single listing or download call.
///
/// Connectors never swallow failures: they return one of these and the retry
/// layer decides what happens next.
#[derive(Debug, thiserror::Error)]
pub enum ConnectorError {
    /// Curl reported an error (timeout, connection, login, etc.).
    #[error("{0}")]
    Curl(#[from] curl::Error),
    /// Timed out without a curl error code (e.g. from a non-curl transport).
    #[error("timed out: {0}")]
    Timeout(String),
    /// Connection dropped or could not be established.
    #[error("connection failed: {0}")]
    Connection(String),
    /// Login or permission rejected.
    #[error("authentication failed: {0}")]
    Auth(String),
    /// Remote directory or file does not exist.
    #[error("not found: {0}")]
    NotFound(String),
    /// The server answered a listing with "no files"; an empty result, not a failure.
    #[error("no matching files")]
    NoMatchingFiles,
    /// The linked libcurl was built without this protocol.
    #[error("libcurl {version} has no {protocol} support; link gapfill against a system libcurl built with {protocol}")]
    Unsupported {
        protocol: &'static str,
        version: String,
    },
    /// Site host/path do not form a valid URL.
    #[error("invalid remote URL: {0}")]
    InvalidUrl(String),
    /// Local write failed (disk full, permission denied). Not retried.
    #[error("storage: {0}")]
    Storage(#[source] std::io::Error),
}
