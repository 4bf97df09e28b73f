//! Error types for the network layer.
//!
//! Transport failures carry a numeric code: positive codes are HTTP status
//! codes returned by the service, negative codes identify failures below
//! HTTP (no connection, lost connection, deadline exceeded).

use thiserror::Error;

/// TCP connection to the service could not be opened.
pub const TRANSPORT_CONNECTION_REFUSED: i32 = -1;

/// Request could not be written.
pub const TRANSPORT_SEND_FAILED: i32 = -3;

/// Connection dropped before the response was complete.
pub const TRANSPORT_CONNECTION_LOST: i32 = -5;

/// Response body could not be read.
pub const TRANSPORT_READ_FAILED: i32 = -10;

/// Exchange did not finish within the request deadline.
pub const TRANSPORT_TIMEOUT: i32 = -11;

/// Errors raised while bringing the network link up.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConnectivityError {
    /// Link did not come up within the attempt budget.
    #[error("Link not established after {attempts} attempts ({waited_ms}ms)")]
    NotEstablished { attempts: u32, waited_ms: u64 },

    /// Link refused to start connecting.
    #[error("Link error: {0}")]
    Link(String),
}

/// Failures of a single HTTP exchange below the HTTP status level.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    #[error("Connection failed: {0}")]
    Connect(String),

    #[error("Send failed: {0}")]
    Send(String),

    #[error("Connection lost: {0}")]
    ConnectionLost(String),

    #[error("Body read failed: {0}")]
    Body(String),
}

impl TransportError {
    /// Negative transport code for this failure.
    pub fn code(&self) -> i32 {
        match self {
            Self::Connect(_) => TRANSPORT_CONNECTION_REFUSED,
            Self::Send(_) => TRANSPORT_SEND_FAILED,
            Self::ConnectionLost(_) => TRANSPORT_CONNECTION_LOST,
            Self::Body(_) => TRANSPORT_READ_FAILED,
        }
    }
}

/// Errors from one recognition exchange.
///
/// Every variant means "not authenticated" to the access controller.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RecognitionError {
    /// Link is down; no request was sent.
    #[error("Not connected")]
    NotConnected,

    /// Non-200 status, or a failure below HTTP (negative code).
    #[error("Transport failure: {0}")]
    TransportFailure(i32),

    /// 200 response whose body is not a valid verdict.
    #[error("Response parse failure: {0}")]
    ParseFailure(String),
}

impl RecognitionError {
    /// Whether the exchange hit the request deadline.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::TransportFailure(TRANSPORT_TIMEOUT))
    }
}

impl From<TransportError> for RecognitionError {
    fn from(e: TransportError) -> Self {
        Self::TransportFailure(e.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_codes_are_negative() {
        let errors = [
            TransportError::Connect("refused".into()),
            TransportError::Send("broken pipe".into()),
            TransportError::ConnectionLost("reset".into()),
            TransportError::Body("truncated".into()),
        ];
        for error in errors {
            assert!(error.code() < 0, "{error} should map to a negative code");
        }
    }

    #[test]
    fn test_transport_error_converts_to_recognition_error() {
        let error: RecognitionError = TransportError::Connect("refused".into()).into();
        assert_eq!(
            error,
            RecognitionError::TransportFailure(TRANSPORT_CONNECTION_REFUSED)
        );
    }

    #[test]
    fn test_is_timeout() {
        assert!(RecognitionError::TransportFailure(TRANSPORT_TIMEOUT).is_timeout());
        assert!(!RecognitionError::TransportFailure(500).is_timeout());
        assert!(!RecognitionError::NotConnected.is_timeout());
    }

    #[test]
    fn test_error_display() {
        assert_eq!(RecognitionError::NotConnected.to_string(), "Not connected");
        assert_eq!(
            RecognitionError::TransportFailure(500).to_string(),
            "Transport failure: 500"
        );
        assert_eq!(
            ConnectivityError::NotEstablished {
                attempts: 20,
                waited_ms: 10_000
            }
            .to_string(),
            "Link not established after 20 attempts (10000ms)"
        );
    }
}
