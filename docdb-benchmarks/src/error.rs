use docdb_client::ClientError;

/// Errors raised by benchmark operations.
#[derive(Debug, thiserror::Error)]
pub enum BenchmarkError {
    /// The sample document is not a JSON object.
    #[error("invalid sample document: {0}")]
    InvalidSample(String),

    /// A document could not be parsed or serialized.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// A client operation failed or returned an unexpected status.
    #[error(transparent)]
    Client(#[from] ClientError),
}

impl BenchmarkError {
    /// The offending status, if the failure carried one.
    pub fn status_code(&self) -> Option<http::StatusCode> {
        match self {
            BenchmarkError::Client(err) => err.status_code(),
            _ => None,
        }
    }
}
