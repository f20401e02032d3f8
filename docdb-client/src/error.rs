//! Client-side error types.
//!
//! This module provides [`ClientError`], the error type for operations that
//! reach the caller, and [`TelemetryError`], the error type of the telemetry
//! path, which never reaches the caller.

use docdb_core::SerializerError;
use http::StatusCode;

/// Errors surfaced to callers of the pipeline, feeds and container surface.
#[derive(Clone, Debug, thiserror::Error)]
pub enum ClientError {
    /// The service answered with a status the caller did not expect.
    #[error("{message} (status: {status})")]
    Status { status: StatusCode, message: String },

    /// A page of a paged feed came back with a non-success status.
    ///
    /// `accumulated_charge` covers only the pages read successfully before it.
    #[error("feed page {page} failed with status {status}")]
    Page {
        status: StatusCode,
        page: usize,
        accumulated_charge: f64,
    },

    /// Transport-level error raised by the terminal network collaborator.
    #[error("transport error: {0}")]
    Transport(String),

    /// The operation's cancellation token fired before it completed.
    #[error("operation canceled")]
    Canceled,

    /// Request payload encoding error.
    #[error("encode error: {0}")]
    Encode(String),

    /// Typed payload decoding error.
    #[error("decode error: {0}")]
    Serialization(#[from] SerializerError),

    /// A collaborator was used outside its contract.
    #[error("protocol error: {0}")]
    Protocol(String),
}

impl ClientError {
    /// Create a status error.
    pub fn status<S: Into<String>>(status: StatusCode, message: S) -> Self {
        ClientError::Status {
            status,
            message: message.into(),
        }
    }

    /// The offending status, for status-carrying variants.
    pub fn status_code(&self) -> Option<StatusCode> {
        match self {
            ClientError::Status { status, .. } | ClientError::Page { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns true if the operation was canceled.
    pub fn is_canceled(&self) -> bool {
        matches!(self, ClientError::Canceled)
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::Encode(err.to_string())
    }
}

/// Errors raised while observing an operation for telemetry.
///
/// These are contained by the telemetry handler: they are logged and dropped,
/// and never change the response returned to the caller.
#[derive(Clone, Debug, thiserror::Error)]
pub enum TelemetryError {
    /// Resolving the effective consistency level failed.
    #[error("consistency resolution failed: {0}")]
    Consistency(#[source] ClientError),

    /// The collector rejected the sample.
    #[error("telemetry collector failed: {0}")]
    Collector(String),

    /// Observation code panicked.
    #[error("telemetry observation panicked: {0}")]
    Panicked(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_error() {
        let err = ClientError::status(StatusCode::CONFLICT, "create failed");
        assert_eq!(err.status_code(), Some(StatusCode::CONFLICT));
        assert_eq!(err.to_string(), "create failed (status: 409 Conflict)");
        assert!(!err.is_canceled());
    }

    #[test]
    fn test_page_error() {
        let err = ClientError::Page {
            status: StatusCode::TOO_MANY_REQUESTS,
            page: 2,
            accumulated_charge: 1.5,
        };
        assert_eq!(err.status_code(), Some(StatusCode::TOO_MANY_REQUESTS));
        assert_eq!(
            err.to_string(),
            "feed page 2 failed with status 429 Too Many Requests"
        );
    }

    #[test]
    fn test_variants_without_status() {
        assert_eq!(ClientError::Canceled.status_code(), None);
        assert!(ClientError::Canceled.is_canceled());
        assert_eq!(ClientError::Transport("reset".into()).status_code(), None);
    }

    #[test]
    fn test_from_serializer_error() {
        let err: ClientError = SerializerError::SizeMismatch {
            serializer: "UInt32",
            expected: 4,
            actual: 1,
        }
        .into();
        assert!(matches!(err, ClientError::Serialization(_)));
    }

    #[test]
    fn test_telemetry_error_source() {
        use std::error::Error;

        let err = TelemetryError::Consistency(ClientError::Canceled);
        assert_eq!(err.to_string(), "consistency resolution failed: operation canceled");
        assert!(err.source().is_some());
    }
}
