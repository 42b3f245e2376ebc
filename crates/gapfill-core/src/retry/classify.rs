//! Classify curl errors and connector answers into retry policy error kinds.

use crate::connector::ConnectorError;
use crate::retry::policy::ErrorKind;

/// Classify a curl error for retry decisions.
pub fn classify_curl_error(e: &curl::Error) -> ErrorKind {
    if e.is_operation_timedout() {
        return ErrorKind::Timeout;
    }
    if e.is_couldnt_connect()
        || e.is_couldnt_resolve_host()
        || e.is_couldnt_resolve_proxy()
        || e.is_read_error()
        || e.is_recv_error()
        || e.is_send_error()
        || e.is_got_nothing()
        || e.is_partial_file()
    {
        return ErrorKind::Connection;
    }
    if e.is_login_denied() || e.is_remote_access_denied() {
        return ErrorKind::Auth;
    }
    if e.code() == curl_sys::CURLE_REMOTE_FILE_NOT_FOUND {
        return ErrorKind::NotFound;
    }
    ErrorKind::Other
}

/// Classify a connector error into an ErrorKind.
pub fn classify(e: &ConnectorError) -> ErrorKind {
    match e {
        ConnectorError::Curl(ce) => classify_curl_error(ce),
        ConnectorError::Timeout(_) => ErrorKind::Timeout,
        ConnectorError::Connection(_) => ErrorKind::Connection,
        ConnectorError::Auth(_) => ErrorKind::Auth,
        ConnectorError::NotFound(_) => ErrorKind::NotFound,
        ConnectorError::NoMatchingFiles => ErrorKind::NoMatchingFiles,
        ConnectorError::Unsupported { .. }
        | ConnectorError::InvalidUrl(_)
        | ConnectorError::Storage(_) => ErrorKind::Other,
    }
}
