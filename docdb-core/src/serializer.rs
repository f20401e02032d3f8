//! Typed binary serializer contract.
//!
//! A [`TypedSerializer`] converts one payload type to and from its binary
//! encoding. Each implementation carries a stable string identifier that
//! registries elsewhere use as a lookup key, so two serializers for different
//! types (or different nullability) must never share an identifier.
//!
//! # Example
//!
//! ```
//! use docdb_core::{TypedSerializer, UInt32Serializer};
//!
//! let serializer = UInt32Serializer;
//! let bytes = serializer.serialize(&42);
//! assert_eq!(serializer.deserialize(&bytes).unwrap(), 42);
//! assert_eq!(serializer.identifier(), "UInt32");
//! ```

use bytes::Bytes;

use crate::error::SerializerError;

/// Encode/decode contract for a single payload type.
///
/// Implementations must round-trip exactly:
/// `deserialize(&serialize(v)) == Ok(v)` for every value `v`, and
/// `serialize(&deserialize(b)?) == b` for every well-formed encoding `b`.
pub trait TypedSerializer<T>: Send + Sync {
    /// Stable identifier used for registry lookup.
    fn identifier(&self) -> &str;

    /// Encode `value` into its binary form.
    fn serialize(&self, value: &T) -> Bytes;

    /// Decode a value from `bytes`.
    fn deserialize(&self, bytes: &[u8]) -> Result<T, SerializerError>;
}

/// A serializer whose encoding always occupies exactly [`WIDTH`](Self::WIDTH) bytes.
///
/// A fixed-width encoding is never empty, which is what lets
/// [`NullableSerializer`](crate::NullableSerializer) use the empty sequence
/// as its null marker without ambiguity.
pub trait FixedWidthSerializer<T>: TypedSerializer<T> {
    /// Encoded width in bytes. Always greater than zero.
    const WIDTH: usize;
}

/// Reject inputs shorter than `width`.
pub(crate) fn check_width(
    serializer: &'static str,
    width: usize,
    bytes: &[u8],
) -> Result<(), SerializerError> {
    if bytes.len() < width {
        return Err(SerializerError::SizeMismatch {
            serializer,
            expected: width,
            actual: bytes.len(),
        });
    }
    Ok(())
}
