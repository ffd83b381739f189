//! Classify curl errors into fetch failures.

use super::{FetchError, TransportError};
use crate::control::Interrupted;
use std::time::Duration;

/// Map a curl error to a `FetchError`. `timeout` is the configured per-attempt
/// limit (for reporting); `stop_requested` tells a user abort from other callback aborts.
pub fn classify_curl_error(e: curl::Error, timeout: Duration, stop_requested: bool) -> FetchError {
    if e.is_operation_timedout() {
        return FetchError::Timeout(timeout);
    }
    if e.is_aborted_by_callback() && stop_requested {
        return FetchError::Transport(TransportError::Interrupted(Interrupted));
    }
    FetchError::Transport(TransportError::Curl(e))
}

#[cfg(test)]
mod tests {
    use super::*;

    // libcurl codes: 7 = COULDNT_CONNECT, 28 = OPERATION_TIMEDOUT, 42 = ABORTED_BY_CALLBACK.
    const TIMEOUT: Duration = Duration::from_secs(30);

    #[test]
    fn timeout_is_timeout() {
        let e = classify_curl_error(curl::Error::new(28), TIMEOUT, false);
        assert!(matches!(e, FetchError::Timeout(d) if d == TIMEOUT));
    }

    #[test]
    fn connect_failure_is_transport() {
        let e = classify_curl_error(curl::Error::new(7), TIMEOUT, false);
        assert!(matches!(e, FetchError::Transport(TransportError::Curl(_))));
    }

    #[test]
    fn callback_abort_with_stop_is_interrupted() {
        let e = classify_curl_error(curl::Error::new(42), TIMEOUT, true);
        assert!(matches!(
            e,
            FetchError::Transport(TransportError::Interrupted(_))
        ));
        let e = classify_curl_error(curl::Error::new(42), TIMEOUT, false);
        assert!(matches!(e, FetchError::Transport(TransportError::Curl(_))));
    }
}
