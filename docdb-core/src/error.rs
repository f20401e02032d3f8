//! Serializer error types.

/// Errors produced while decoding a typed binary payload.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SerializerError {
    /// The input is shorter than the fixed encoded width of the target type.
    #[error("{serializer}: expected at least {expected} bytes, got {actual}")]
    SizeMismatch {
        /// Identifier of the serializer that rejected the input.
        serializer: &'static str,
        /// Minimum number of bytes required.
        expected: usize,
        /// Number of bytes supplied.
        actual: usize,
    },
}

impl SerializerError {
    /// Minimum input length the serializer expected, if this is a size error.
    pub fn expected_len(&self) -> usize {
        match self {
            SerializerError::SizeMismatch { expected, .. } => *expected,
        }
    }
}
