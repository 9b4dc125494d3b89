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

//! Serialization trait definitions.
//!
//! This module defines the [`Serializer`] trait that every wire format
//! implements.

use crate::descriptor::{Descriptor, MessageDescriptor};
use crate::message::{Message, Value};
use crate::serialization::CodecError;
use std::io::{Read, Write};
use std::sync::Arc;

/// Trait for encoding and decoding messages against their descriptors.
///
/// The `Serializer` trait is object safe so collaborators can pick a format
/// at runtime. Implementations hold only immutable configuration, so one
/// instance can be shared across threads; each call owns its stream.
///
/// # Thread Safety
///
/// All serializers must be `Send + Sync + 'static`.
///
/// # Examples
///
/// ## Using a serializer
///
/// ```rust
/// use schemata::descriptor::{Descriptor, Field, MessageDescriptor, TypeName, Variant};
/// use schemata::message::{GenericMessage, Message, Value};
/// use schemata::serialization::{BinarySerializer, Serializer};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let point = MessageDescriptor::builder(TypeName::new("geo", "Point"), Variant::Struct)
///     .with_field(Field::new(1, "x", Descriptor::I32))
///     .with_field(Field::new(2, "y", Descriptor::I32))
///     .build()?;
/// let message = GenericMessage::builder(&point).with(1, 10)?.with(2, 20)?.build_generic()?;
///
/// let serializer = BinarySerializer::new();
/// let bytes = serializer.to_vec(&message)?;
/// println!("Serialized to {} bytes using {}", bytes.len(), serializer.name());
///
/// let decoded = serializer.from_slice(&bytes, &point)?;
/// assert_eq!(decoded.get(2), Some(Value::I32(20)));
/// # Ok(())
/// # }
/// # example().unwrap();
/// ```
pub trait Serializer: Send + Sync + 'static {
    /// Encodes a message to `out` and returns the number of bytes written.
    ///
    /// # Errors
    ///
    /// Returns a [`CodecError`] if a field value cannot be represented in
    /// this format or the stream fails. Bytes already written are left in
    /// the stream.
    fn serialize(&self, out: &mut dyn Write, message: &dyn Message) -> Result<usize, CodecError>;

    /// Decodes a message of type `descriptor` from `input`.
    ///
    /// # Errors
    ///
    /// Returns a [`CodecError`] on wire type mismatches, unmapped enum
    /// values, unknown fields in strict mode, validation failures and stream
    /// failures. No partially decoded message is ever returned.
    fn deserialize(
        &self,
        input: &mut dyn Read,
        descriptor: &Arc<MessageDescriptor>,
    ) -> Result<Arc<dyn Message>, CodecError>;

    /// Encodes a bare value of any type and returns the number of bytes
    /// written.
    ///
    /// # Errors
    ///
    /// Same as [`Serializer::serialize`], plus a mismatch if `value` does
    /// not have the shape `descriptor` declares.
    fn serialize_value(
        &self,
        out: &mut dyn Write,
        value: &Value,
        descriptor: &Descriptor,
    ) -> Result<usize, CodecError>;

    /// Decodes a bare value of type `descriptor`.
    ///
    /// # Errors
    ///
    /// Same as [`Serializer::deserialize`].
    fn deserialize_value(&self, input: &mut dyn Read, descriptor: &Descriptor) -> Result<Value, CodecError>;

    /// Returns the name of this serializer.
    ///
    /// The name is a stable identifier collaborators can use for content
    /// negotiation.
    fn name(&self) -> &'static str;

    /// Returns the MIME type of the encoded form.
    fn mime_type(&self) -> &'static str;

    /// Returns `true` if the encoded form is not text.
    fn is_binary(&self) -> bool;

    /// Encodes a message into a new buffer.
    ///
    /// # Errors
    ///
    /// Same as [`Serializer::serialize`].
    fn to_vec(&self, message: &dyn Message) -> Result<Vec<u8>, CodecError> {
        let mut out = Vec::new();
        self.serialize(&mut out, message)?;
        Ok(out)
    }

    /// Decodes a message from a byte slice.
    ///
    /// # Errors
    ///
    /// Same as [`Serializer::deserialize`].
    fn from_slice(&self, bytes: &[u8], descriptor: &Arc<MessageDescriptor>) -> Result<Arc<dyn Message>, CodecError> {
        let mut input = bytes;
        self.deserialize(&mut input, descriptor)
    }
}
