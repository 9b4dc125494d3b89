//
// Copyright 2026 Hans W. Uhlig. All Rights Reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//

//! Serialization layer for schemata.
//!
//! This module provides pluggable wire formats driven entirely by
//! descriptors.
//!
//! # Overview
//!
//! The serialization layer consists of several key components:
//!
//! - **[`Serializer`] trait**: object-safe abstraction over every format
//! - **[`codec`] module**: the recursive traversal shared by all formats,
//!   with the [`ValueWriter`](codec::ValueWriter) and
//!   [`ValueReader`](codec::ValueReader) hooks a format implements
//! - **Serialization backends**: compact binary and compact JSON
//! - **[`CodecOptions`]**: strict mode and decoding limits
//! - **Error type**: [`CodecError`]
//!
//! # Serialization Backends
//!
//! ## Binary (Recommended)
//!
//! [`BinarySerializer`] is the compact default:
//! - Self-describing, type-tagged values
//! - Narrowest integer widths
//! - Bit-exact doubles
//! - Stop-terminated field lists
//!
//! ## JSON
//!
//! [`JsonSerializer`] is useful for debugging and interchange:
//! - Numeric or named field keys, both accepted on read
//! - Optional pretty-printing
//! - Binary values as hex
//!
//! A third format, the field-id protocol bridge, lives in
//! [`crate::protocol`].
//!
//! # Decoding Rules
//!
//! Every format decodes the same way:
//!
//! - Unknown fields are skipped, or rejected with
//!   [`CodecError::UnknownField`] in strict mode
//! - A field whose wire type differs from its declared type fails with
//!   [`CodecError::WireTypeMismatch`]; values are never coerced
//! - An enum value without a constant fails with
//!   [`CodecError::InvalidEnumValue`]
//! - The message is produced by its builder, so missing required fields
//!   and malformed unions fail with [`CodecError::Validation`]
//!
//! # Examples
//!
//! ## Comparing serializers
//!
//! ```rust
//! use schemata::descriptor::{Descriptor, Field, MessageDescriptor, TypeName, Variant};
//! use schemata::message::GenericMessage;
//! use schemata::serialization::{BinarySerializer, JsonSerializer, Serializer};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let data = MessageDescriptor::builder(TypeName::new("demo", "Data"), Variant::Struct)
//!     .with_field(Field::new(1, "value", Descriptor::I64))
//!     .with_field(Field::new(2, "name", Descriptor::STRING))
//!     .build()?;
//! let message = GenericMessage::builder(&data)
//!     .with(1, 12345i64)?
//!     .with(2, "test")?
//!     .build_generic()?;
//!
//! let serializers: Vec<Box<dyn Serializer>> = vec![
//!     Box::new(BinarySerializer::new()),
//!     Box::new(JsonSerializer::new().named()),
//! ];
//! for serializer in &serializers {
//!     let bytes = serializer.to_vec(&message)?;
//!     println!("{}: {} bytes", serializer.name(), bytes.len());
//!     let decoded = serializer.from_slice(&bytes, &data)?;
//!     assert_eq!(decoded.get(2), Some("test".into()));
//! }
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

pub mod binary;
pub mod codec;
mod config;
mod error;
mod json;
mod traits;

pub use binary::BinarySerializer;
pub use config::{CodecOptions, DEFAULT_MAX_CONTAINER_LEN, DEFAULT_MAX_DEPTH, IdType};
pub use error::CodecError;
pub use json::{JsonSerializer, parse_literal};
pub use traits::Serializer;
