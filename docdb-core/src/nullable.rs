//! Nullable adapter over a fixed-width serializer.

use std::marker::PhantomData;

use bytes::Bytes;

use crate::error::SerializerError;
use crate::serializer::{FixedWidthSerializer, TypedSerializer};

/// Identifier suffix that keeps a nullable serializer distinct from its base.
pub const NULLABLE_SUFFIX: &str = "_Nullable";

/// Adds a null marker to a fixed-width base serializer.
///
/// `None` encodes to the empty byte sequence and the empty sequence decodes to
/// `None` without consulting the base serializer. Because the base encoding is
/// fixed-width and never empty, the null marker cannot collide with an encoded
/// value.
///
/// # Example
///
/// ```
/// use docdb_core::{NullableSerializer, TypedSerializer, UInt32Serializer};
///
/// let serializer = NullableSerializer::new(UInt32Serializer);
/// assert_eq!(serializer.identifier(), "UInt32_Nullable");
/// assert!(serializer.serialize(&None).is_empty());
/// assert_eq!(serializer.deserialize(&[]).unwrap(), None);
/// assert_eq!(serializer.deserialize(&[7, 0, 0, 0]).unwrap(), Some(7));
/// ```
pub struct NullableSerializer<S, T> {
    base: S,
    identifier: String,
    _marker: PhantomData<fn() -> T>,
}

impl<S, T> NullableSerializer<S, T>
where
    S: FixedWidthSerializer<T>,
{
    /// Wrap `base`.
    pub fn new(base: S) -> Self {
        let identifier = format!("{}{}", base.identifier(), NULLABLE_SUFFIX);
        Self {
            base,
            identifier,
            _marker: PhantomData,
        }
    }

    /// The wrapped serializer.
    pub fn base(&self) -> &S {
        &self.base
    }
}

impl<S, T> Clone for NullableSerializer<S, T>
where
    S: Clone,
{
    fn clone(&self) -> Self {
        Self {
            base: self.base.clone(),
            identifier: self.identifier.clone(),
            _marker: PhantomData,
        }
    }
}

impl<S, T> std::fmt::Debug for NullableSerializer<S, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NullableSerializer")
            .field("identifier", &self.identifier)
            .finish_non_exhaustive()
    }
}

impl<S, T> TypedSerializer<Option<T>> for NullableSerializer<S, T>
where
    S: FixedWidthSerializer<T>,
{
    fn identifier(&self) -> &str {
        &self.identifier
    }

    fn serialize(&self, value: &Option<T>) -> Bytes {
        match value {
            Some(value) => self.base.serialize(value),
            None => Bytes::new(),
        }
    }

    fn deserialize(&self, bytes: &[u8]) -> Result<Option<T>, SerializerError> {
        if bytes.is_empty() {
            return Ok(None);
        }
        self.base.deserialize(bytes).map(Some)
    }
}
