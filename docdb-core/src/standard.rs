//! Standard fixed-width serializers for primitive types.
//!
//! All multi-byte values use little-endian byte order. Inputs longer than the
//! fixed width are accepted and only the leading bytes are read.

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::SerializerError;
use crate::serializer::{FixedWidthSerializer, TypedSerializer, check_width};

macro_rules! fixed_width_serializer {
    (
        $(#[$meta:meta])*
        $name:ident, $ty:ty, $id:literal, $width:expr, $put:ident, $get:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, Default)]
        pub struct $name;

        impl TypedSerializer<$ty> for $name {
            fn identifier(&self) -> &str {
                $id
            }

            fn serialize(&self, value: &$ty) -> Bytes {
                let mut buf = BytesMut::with_capacity($width);
                buf.$put(*value);
                buf.freeze()
            }

            fn deserialize(&self, bytes: &[u8]) -> Result<$ty, SerializerError> {
                check_width($id, $width, bytes)?;
                let mut buf = bytes;
                Ok(buf.$get())
            }
        }

        impl FixedWidthSerializer<$ty> for $name {
            const WIDTH: usize = $width;
        }
    };
}

fixed_width_serializer!(
    /// Serializer for `u8` values (1 byte).
    ByteSerializer, u8, "Byte", 1, put_u8, get_u8
);
fixed_width_serializer!(
    /// Serializer for `i16` values (2 bytes).
    Int16Serializer, i16, "Int16", 2, put_i16_le, get_i16_le
);
fixed_width_serializer!(
    /// Serializer for `u16` values (2 bytes).
    UInt16Serializer, u16, "UInt16", 2, put_u16_le, get_u16_le
);
fixed_width_serializer!(
    /// Serializer for `i32` values (4 bytes).
    Int32Serializer, i32, "Int32", 4, put_i32_le, get_i32_le
);
fixed_width_serializer!(
    /// Serializer for `u32` values (4 bytes).
    UInt32Serializer, u32, "UInt32", 4, put_u32_le, get_u32_le
);
fixed_width_serializer!(
    /// Serializer for `i64` values (8 bytes).
    Int64Serializer, i64, "Int64", 8, put_i64_le, get_i64_le
);
fixed_width_serializer!(
    /// Serializer for `u64` values (8 bytes).
    UInt64Serializer, u64, "UInt64", 8, put_u64_le, get_u64_le
);
fixed_width_serializer!(
    /// Serializer for `f32` values (4 bytes, IEEE 754 bit pattern).
    SingleSerializer, f32, "Single", 4, put_f32_le, get_f32_le
);
fixed_width_serializer!(
    /// Serializer for `f64` values (8 bytes, IEEE 754 bit pattern).
    DoubleSerializer, f64, "Double", 8, put_f64_le, get_f64_le
);

/// Serializer for `bool` values (1 byte).
///
/// Encodes `false` as `0x00` and `true` as `0x01`. Any non-zero byte decodes
/// to `true`; only `0x00` and `0x01` are well-formed encodings.
#[derive(Debug, Clone, Copy, Default)]
pub struct BooleanSerializer;

impl TypedSerializer<bool> for BooleanSerializer {
    fn identifier(&self) -> &str {
        "Boolean"
    }

    fn serialize(&self, value: &bool) -> Bytes {
        Bytes::copy_from_slice(&[u8::from(*value)])
    }

    fn deserialize(&self, bytes: &[u8]) -> Result<bool, SerializerError> {
        check_width("Boolean", 1, bytes)?;
        Ok(bytes[0] != 0)
    }
}

impl FixedWidthSerializer<bool> for BooleanSerializer {
    const WIDTH: usize = 1;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uint32_round_trip() {
        let serializer = UInt32Serializer;
        for value in [0u32, 1, 42, 0xDEAD_BEEF, u32::MAX] {
            let bytes = serializer.serialize(&value);
            assert_eq!(bytes.len(), UInt32Serializer::WIDTH);
            assert_eq!(serializer.deserialize(&bytes).unwrap(), value);
        }
    }

    #[test]
    fn test_uint32_little_endian() {
        let bytes = UInt32Serializer.serialize(&0x0102_0304);
        assert_eq!(&bytes[..], &[0x04, 0x03, 0x02, 0x01]);
    }

    #[test]
    fn test_encoding_round_trip() {
        // serialize(deserialize(b)) == b for encodings of the right width
        let encoded = [0x10, 0x20, 0x30, 0x40, 0x50, 0x60, 0x70, 0x80];
        let value = Int64Serializer.deserialize(&encoded).unwrap();
        assert_eq!(&Int64Serializer.serialize(&value)[..], &encoded);

        let value = UInt16Serializer.deserialize(&encoded[..2]).unwrap();
        assert_eq!(&UInt16Serializer.serialize(&value)[..], &encoded[..2]);
    }

    #[test]
    fn test_undersized_input() {
        let err = UInt32Serializer.deserialize(&[0x01, 0x02]).unwrap_err();
        assert_eq!(
            err,
            SerializerError::SizeMismatch {
                serializer: "UInt32",
                expected: 4,
                actual: 2,
            }
        );

        assert!(DoubleSerializer.deserialize(&[0; 7]).is_err());
        assert!(BooleanSerializer.deserialize(&[]).is_err());
    }

    #[test]
    fn test_longer_input_reads_leading_bytes() {
        let value = UInt16Serializer.deserialize(&[0x01, 0x00, 0xFF]).unwrap();
        assert_eq!(value, 1);
    }

    #[test]
    fn test_signed_and_float_round_trip() {
        assert_eq!(
            Int16Serializer
                .deserialize(&Int16Serializer.serialize(&-1234))
                .unwrap(),
            -1234
        );
        assert_eq!(
            Int32Serializer
                .deserialize(&Int32Serializer.serialize(&i32::MIN))
                .unwrap(),
            i32::MIN
        );
        assert_eq!(
            DoubleSerializer
                .deserialize(&DoubleSerializer.serialize(&-0.125))
                .unwrap(),
            -0.125
        );
        assert_eq!(
            SingleSerializer
                .deserialize(&SingleSerializer.serialize(&3.5))
                .unwrap(),
            3.5
        );
    }

    #[test]
    fn test_boolean() {
        assert_eq!(&BooleanSerializer.serialize(&true)[..], &[1]);
        assert_eq!(&BooleanSerializer.serialize(&false)[..], &[0]);
        assert!(BooleanSerializer.deserialize(&[1]).unwrap());
        assert!(!BooleanSerializer.deserialize(&[0]).unwrap());
    }

    #[test]
    fn test_identifiers_are_distinct() {
        let ids = [
            BooleanSerializer.identifier(),
            ByteSerializer.identifier(),
            Int16Serializer.identifier(),
            UInt16Serializer.identifier(),
            Int32Serializer.identifier(),
            UInt32Serializer.identifier(),
            Int64Serializer.identifier(),
            UInt64Serializer.identifier(),
            SingleSerializer.identifier(),
            DoubleSerializer.identifier(),
        ];
        let mut sorted = ids.to_vec();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(sorted.len(), ids.len());
    }
}
