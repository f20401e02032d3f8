//! Core payload types for the docdb client.
//!
//! This crate provides the typed binary serializer contract shared by the
//! client crates.
//!
//! ## Contents
//!
//! - [`TypedSerializer`] and [`FixedWidthSerializer`]: the serializer contract
//! - Fixed-width serializers for primitive types, e.g. [`UInt32Serializer`]
//! - [`NullableSerializer`]: adds an empty-encoding null to any fixed-width serializer
//! - [`SerializerError`]: decoding failures

mod error;
mod nullable;
mod serializer;
mod standard;

pub use error::*;
pub use nullable::*;
pub use serializer::{FixedWidthSerializer, TypedSerializer};
pub use standard::*;
