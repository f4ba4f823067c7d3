//! Map curl failures to `Unreachable` with a short cause.

use crate::error::{ErrorKind, FetchError};

/// Short human cause for a curl error.
pub(crate) fn transport_cause(e: &curl::Error) -> &'static str {
    if e.is_operation_timedout() {
        return "timed out";
    }
    if e.is_couldnt_resolve_host() || e.is_couldnt_resolve_proxy() {
        return "could not resolve host";
    }
    if e.is_couldnt_connect() {
        return "could not connect";
    }
    if e.is_url_malformed() || e.is_unsupported_protocol() {
        return "invalid URL";
    }
    if e.is_too_many_redirects() {
        return "too many redirects";
    }
    if e.is_read_error() || e.is_recv_error() || e.is_send_error() || e.is_got_nothing() {
        return "connection dropped";
    }
    "transfer failed"
}

pub(crate) fn unreachable(url: &str, e: &curl::Error) -> FetchError {
    FetchError::new(
        ErrorKind::Unreachable,
        url,
        format!("{}: {}", transport_cause(e), e),
    )
}
