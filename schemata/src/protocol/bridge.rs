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

//! Adapters between the value traversal and a field-id protocol.

use crate::descriptor::{Descriptor, Field, MessageDescriptor, ServiceDescriptor};
use crate::message::{Message, Value};
use crate::observability::CodecMetrics;
use crate::protocol::{
    ApplicationException, BinaryInputProtocol, BinaryOutputProtocol, CallType, ProtocolReader, ProtocolWriter,
    ServiceCall, TFieldIdentifier, TListIdentifier, TMapIdentifier, TMessageIdentifier, TSetIdentifier,
    TStructIdentifier, TType,
};
use crate::serialization::codec::{
    CollectionKind, CountingReader, CountingWriter, Decoder, FieldHeader, FieldId, ValueReader, ValueWriter,
    write_message, write_value,
};
use crate::serialization::{CodecError, CodecOptions, Serializer};
use std::io::{Read, Write};
use std::sync::Arc;
use tracing::{debug, trace};

/// Drives a [`ProtocolWriter`] from the value traversal.
pub struct ProtocolValueWriter<'a, P: ProtocolWriter + ?Sized> {
    protocol: &'a mut P,
}

impl<'a, P: ProtocolWriter + ?Sized> ProtocolValueWriter<'a, P> {
    /// Wraps a protocol.
    pub fn new(protocol: &'a mut P) -> Self {
        Self { protocol }
    }
}

impl<P: ProtocolWriter + ?Sized> ValueWriter for ProtocolValueWriter<'_, P> {
    fn write_bool(&mut self, value: bool) -> Result<(), CodecError> {
        self.protocol.write_bool(value)
    }

    fn write_byte(&mut self, value: i8) -> Result<(), CodecError> {
        self.protocol.write_byte(value)
    }

    fn write_i16(&mut self, value: i16) -> Result<(), CodecError> {
        self.protocol.write_i16(value)
    }

    fn write_i32(&mut self, value: i32) -> Result<(), CodecError> {
        self.protocol.write_i32(value)
    }

    fn write_i64(&mut self, value: i64) -> Result<(), CodecError> {
        self.protocol.write_i64(value)
    }

    fn write_double(&mut self, value: f64) -> Result<(), CodecError> {
        self.protocol.write_double(value)
    }

    fn write_string(&mut self, value: &str) -> Result<(), CodecError> {
        self.protocol.write_string(value)
    }

    fn write_binary(&mut self, value: &[u8]) -> Result<(), CodecError> {
        self.protocol.write_binary(value)
    }

    fn begin_message(&mut self, descriptor: &MessageDescriptor) -> Result<(), CodecError> {
        self.protocol.write_struct_begin(&TStructIdentifier {
            name: descriptor.type_name().to_string(),
        })
    }

    fn begin_field(&mut self, field: &Field, descriptor: &Descriptor) -> Result<(), CodecError> {
        self.protocol.write_field_begin(&TFieldIdentifier::new(
            field.name(),
            TType::of(descriptor)?,
            field.key() as i16,
        ))
    }

    fn end_field(&mut self) -> Result<(), CodecError> {
        self.protocol.write_field_end()
    }

    fn end_message(&mut self) -> Result<(), CodecError> {
        self.protocol.write_field_stop()?;
        self.protocol.write_struct_end()
    }

    fn begin_collection(&mut self, kind: CollectionKind, item: &Descriptor, len: usize) -> Result<(), CodecError> {
        let element_type = TType::of(item)?;
        match kind {
            CollectionKind::List => self.protocol.write_list_begin(&TListIdentifier {
                element_type,
                size: len,
            }),
            CollectionKind::Set => self.protocol.write_set_begin(&TSetIdentifier {
                element_type,
                size: len,
            }),
        }
    }

    fn end_collection(&mut self, kind: CollectionKind) -> Result<(), CodecError> {
        match kind {
            CollectionKind::List => self.protocol.write_list_end(),
            CollectionKind::Set => self.protocol.write_set_end(),
        }
    }

    fn begin_map(&mut self, key: &Descriptor, value: &Descriptor, len: usize) -> Result<(), CodecError> {
        self.protocol.write_map_begin(&TMapIdentifier {
            key_type: TType::of(key)?,
            value_type: TType::of(value)?,
            size: len,
        })
    }

    fn end_map(&mut self) -> Result<(), CodecError> {
        self.protocol.write_map_end()
    }
}

/// Drives the value traversal from a [`ProtocolReader`].
pub struct ProtocolValueReader<'a, P: ProtocolReader + ?Sized> {
    protocol: &'a mut P,
    max_depth: usize,
    /// One flag per open struct: whether a field header is awaiting its end.
    open_fields: Vec<bool>,
    /// Remaining items of each open container.
    remaining: Vec<usize>,
    collections: Vec<CollectionKind>,
}

impl<'a, P: ProtocolReader + ?Sized> ProtocolValueReader<'a, P> {
    /// Wraps a protocol. `max_depth` bounds the nesting of skipped values.
    pub fn new(protocol: &'a mut P, max_depth: usize) -> Self {
        Self {
            protocol,
            max_depth,
            open_fields: Vec::new(),
            remaining: Vec::new(),
            collections: Vec::new(),
        }
    }

    fn check_element(context: &str, expected: &Descriptor, actual: TType, size: usize) -> Result<(), CodecError> {
        let expected = TType::of(expected)?;
        if size > 0 && expected != actual {
            return Err(CodecError::mismatch(context, expected, actual));
        }
        Ok(())
    }

    fn next(&mut self) -> bool {
        match self.remaining.last_mut() {
            Some(remaining) if *remaining > 0 => {
                *remaining -= 1;
                true
            }
            _ => false,
        }
    }
}

impl<P: ProtocolReader + ?Sized> ValueReader for ProtocolValueReader<'_, P> {
    type WireType = TType;

    fn wire_type_of(&self, descriptor: &Descriptor) -> Result<TType, CodecError> {
        TType::of(descriptor)
    }

    fn read_bool(&mut self) -> Result<bool, CodecError> {
        self.protocol.read_bool()
    }

    fn read_byte(&mut self) -> Result<i8, CodecError> {
        self.protocol.read_byte()
    }

    fn read_i16(&mut self) -> Result<i16, CodecError> {
        self.protocol.read_i16()
    }

    fn read_i32(&mut self) -> Result<i32, CodecError> {
        self.protocol.read_i32()
    }

    fn read_i64(&mut self) -> Result<i64, CodecError> {
        self.protocol.read_i64()
    }

    fn read_double(&mut self) -> Result<f64, CodecError> {
        self.protocol.read_double()
    }

    fn read_string(&mut self) -> Result<String, CodecError> {
        self.protocol.read_string()
    }

    fn read_binary(&mut self) -> Result<Vec<u8>, CodecError> {
        self.protocol.read_binary()
    }

    fn begin_message(&mut self, _descriptor: &MessageDescriptor) -> Result<(), CodecError> {
        self.protocol.read_struct_begin()?;
        self.open_fields.push(false);
        Ok(())
    }

    fn next_field(&mut self) -> Result<Option<FieldHeader<TType>>, CodecError> {
        let Some(open) = self.open_fields.last_mut() else {
            return Err(CodecError::malformed("field read outside of a struct"));
        };
        if std::mem::replace(open, false) {
            self.protocol.read_field_end()?;
        }
        let field = self.protocol.read_field_begin()?;
        if field.field_type == TType::Stop {
            return Ok(None);
        }
        if let Some(open) = self.open_fields.last_mut() {
            *open = true;
        }
        Ok(Some(FieldHeader {
            id: FieldId::Key(field.id as u16),
            wire_type: Some(field.field_type),
        }))
    }

    fn skip_field(&mut self, header: &FieldHeader<TType>) -> Result<(), CodecError> {
        let ttype = header
            .wire_type
            .ok_or_else(|| CodecError::malformed("field without a type"))?;
        self.protocol.skip(ttype, self.max_depth)
    }

    fn end_message(&mut self) -> Result<(), CodecError> {
        self.open_fields.pop();
        self.protocol.read_struct_end()
    }

    fn begin_collection(&mut self, kind: CollectionKind, item: &Descriptor) -> Result<Option<usize>, CodecError> {
        let (element_type, size) = match kind {
            CollectionKind::List => {
                let list = self.protocol.read_list_begin()?;
                (list.element_type, list.size)
            }
            CollectionKind::Set => {
                let set = self.protocol.read_set_begin()?;
                (set.element_type, set.size)
            }
        };
        Self::check_element("collection item", item, element_type, size)?;
        self.remaining.push(size);
        self.collections.push(kind);
        Ok(Some(size))
    }

    fn next_item(&mut self) -> Result<bool, CodecError> {
        Ok(self.next())
    }

    fn end_collection(&mut self) -> Result<(), CodecError> {
        self.remaining.pop();
        match self.collections.pop() {
            Some(CollectionKind::Set) => self.protocol.read_set_end(),
            _ => self.protocol.read_list_end(),
        }
    }

    fn begin_map(&mut self, key: &Descriptor, value: &Descriptor) -> Result<Option<usize>, CodecError> {
        let map = self.protocol.read_map_begin()?;
        Self::check_element("map key", key, map.key_type, map.size)?;
        Self::check_element("map value", value, map.value_type, map.size)?;
        self.remaining.push(map.size);
        Ok(Some(map.size))
    }

    fn next_entry(&mut self) -> Result<bool, CodecError> {
        Ok(self.next())
    }

    fn end_map(&mut self) -> Result<(), CodecError> {
        self.remaining.pop();
        self.protocol.read_map_end()
    }
}

/// Serializer speaking the strict binary field-id protocol.
///
/// Besides messages and bare values, it frames [`ServiceCall`]s in the
/// protocol's call envelope.
///
/// # Examples
///
/// ```rust
/// use schemata::descriptor::{Descriptor, Field, MessageDescriptor, TypeName, Variant};
/// use schemata::message::{GenericMessage, Message, Value};
/// use schemata::protocol::ProtocolSerializer;
/// use schemata::serialization::Serializer;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let point = MessageDescriptor::builder(TypeName::new("geo", "Point"), Variant::Struct)
///     .with_field(Field::new(1, "x", Descriptor::I32))
///     .build()?;
/// let message = GenericMessage::builder(&point).with(1, 300)?.build_generic()?;
///
/// let serializer = ProtocolSerializer::new();
/// let bytes = serializer.to_vec(&message)?;
/// // I32 field 1, big-endian 300, stop.
/// assert_eq!(hex::encode(&bytes), "0800010000012c00");
/// let decoded = serializer.from_slice(&bytes, &point)?;
/// assert_eq!(decoded.get(1), Some(Value::I32(300)));
/// # Ok(())
/// # }
/// # example().unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct ProtocolSerializer {
    strict_read: bool,
    strict_write: bool,
    options: CodecOptions,
    metrics: Option<Arc<CodecMetrics>>,
}

impl Default for ProtocolSerializer {
    fn default() -> Self {
        Self {
            strict_read: false,
            strict_write: true,
            options: CodecOptions::default(),
            metrics: None,
        }
    }
}

impl ProtocolSerializer {
    /// Creates a serializer writing versioned envelopes and accepting both
    /// envelope forms.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rejects call envelopes without a version marker.
    pub fn with_strict_read(mut self, strict_read: bool) -> Self {
        self.strict_read = strict_read;
        self
    }

    /// Selects the versioned call envelope on write.
    pub fn with_strict_write(mut self, strict_write: bool) -> Self {
        self.strict_write = strict_write;
        self
    }

    /// Replaces the decoding options.
    pub fn with_options(mut self, options: CodecOptions) -> Self {
        self.options = options;
        self
    }

    /// Records traffic in `metrics`.
    pub fn with_metrics(mut self, metrics: Arc<CodecMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    fn decoder(&self) -> Decoder<'_> {
        Decoder::new(&self.options).with_metrics(self.metrics.as_deref())
    }

    fn finish_encode(&self, written: usize, result: Result<(), CodecError>) -> Result<usize, CodecError> {
        if let Some(metrics) = &self.metrics {
            metrics.record_encode(written, result.as_ref().err());
        }
        result?;
        trace!(bytes = written, "protocol encode complete");
        Ok(written)
    }

    fn finish_decode<T>(&self, read: usize, result: Result<T, CodecError>) -> Result<T, CodecError> {
        if let Some(metrics) = &self.metrics {
            metrics.record_decode(read, result.as_ref().err());
        }
        trace!(bytes = read, ok = result.is_ok(), "protocol decode complete");
        result
    }

    /// Writes a call envelope around the call's message.
    ///
    /// # Errors
    ///
    /// Same as [`Serializer::serialize`].
    pub fn serialize_call(&self, out: &mut dyn Write, call: &ServiceCall) -> Result<usize, CodecError> {
        let mut counter = CountingWriter::new(out);
        let mut protocol = BinaryOutputProtocol::new(&mut counter, self.strict_write);
        let result = write_call(&mut protocol, call);
        drop(protocol);
        self.finish_encode(counter.count(), result)
    }

    /// Reads a call envelope for a method of `service`.
    ///
    /// Calls and one-way calls decode as the method's request type, replies
    /// as its response type and exceptions as [`ApplicationException`].
    ///
    /// # Errors
    ///
    /// Fails with [`CodecError::UnknownMethod`] if the service and its
    /// parents declare no such method, and as [`Serializer::deserialize`]
    /// otherwise.
    pub fn deserialize_call(&self, input: &mut dyn Read, service: &ServiceDescriptor) -> Result<ServiceCall, CodecError> {
        let mut counter = CountingReader::new(input);
        let mut protocol =
            BinaryInputProtocol::new(&mut counter, self.strict_read).with_max_len(self.options.max_container_len);
        let result = self.read_call(&mut protocol, service);
        drop(protocol);
        self.finish_decode(counter.count(), result)
    }

    fn read_call<P: ProtocolReader + ?Sized>(
        &self,
        protocol: &mut P,
        service: &ServiceDescriptor,
    ) -> Result<ServiceCall, CodecError> {
        let header = protocol.read_message_begin()?;
        let call_type = CallType::from_u8(header.message_type)
            .ok_or_else(|| CodecError::malformed(format!("unknown call type {}", header.message_type)))?;
        debug!(method = %header.name, call_type = %call_type, sequence = header.sequence, "reading service call");
        let descriptor = if call_type == CallType::Exception {
            ApplicationException::descriptor()?
        } else {
            let method = service
                .find_method(&header.name)?
                .ok_or_else(|| CodecError::UnknownMethod {
                    service: service.type_name().to_string(),
                    method: header.name.clone(),
                })?;
            if call_type.is_request() {
                method.request_type()?
            } else {
                method.response_type()?.ok_or_else(|| {
                    CodecError::unsupported(format!("method `{}` has no response type", header.name))
                })?
            }
        };
        let message = self
            .decoder()
            .read_message(&mut ProtocolValueReader::new(protocol, self.options.max_depth), descriptor)?;
        protocol.read_message_end()?;
        Ok(ServiceCall::new(header.name, call_type, header.sequence, message))
    }
}

fn write_call<P: ProtocolWriter + ?Sized>(protocol: &mut P, call: &ServiceCall) -> Result<(), CodecError> {
    protocol.write_message_begin(&TMessageIdentifier {
        name: call.method().to_string(),
        message_type: call.call_type().id(),
        sequence: call.sequence(),
    })?;
    write_message(&mut ProtocolValueWriter::new(protocol), call.message().as_ref())?;
    protocol.write_message_end()?;
    protocol.flush()
}

fn write_bare<P: ProtocolWriter + ?Sized>(protocol: &mut P, message: &dyn Message) -> Result<(), CodecError> {
    write_message(&mut ProtocolValueWriter::new(protocol), message)?;
    protocol.flush()
}

/// Wraps a bare value in a struct with a single field 0.
fn write_wrapped<P: ProtocolWriter + ?Sized>(
    protocol: &mut P,
    value: &Value,
    descriptor: &Descriptor,
) -> Result<(), CodecError> {
    protocol.write_struct_begin(&TStructIdentifier { name: "msg".to_string() })?;
    protocol.write_field_begin(&TFieldIdentifier::new("", TType::of(descriptor)?, 0))?;
    write_value(&mut ProtocolValueWriter::new(protocol), value, descriptor)?;
    protocol.write_field_end()?;
    protocol.write_field_stop()?;
    protocol.write_struct_end()?;
    protocol.flush()
}

impl ProtocolSerializer {
    fn read_wrapped<P: ProtocolReader + ?Sized>(&self, protocol: &mut P, descriptor: &Descriptor) -> Result<Value, CodecError> {
        if let Descriptor::Message(message) = descriptor {
            let reader = &mut ProtocolValueReader::new(protocol, self.options.max_depth);
            return Ok(Value::Message(self.decoder().read_message(reader, message)?));
        }
        protocol.read_struct_begin()?;
        let field = protocol.read_field_begin()?;
        if field.field_type == TType::Stop {
            return Err(CodecError::malformed("unexpected end of fields"));
        }
        if field.id != 0 {
            return Err(CodecError::malformed(format!("wrapped value in field {}, expected 0", field.id)));
        }
        let expected = TType::of(descriptor)?;
        if field.field_type != expected {
            return Err(CodecError::mismatch("value", expected, field.field_type));
        }
        let value = self
            .decoder()
            .read_value(&mut ProtocolValueReader::new(protocol, self.options.max_depth), descriptor)?;
        protocol.read_field_end()?;
        if protocol.read_field_begin()?.field_type != TType::Stop {
            return Err(CodecError::malformed("more than one value in wrapper"));
        }
        protocol.read_struct_end()?;
        Ok(value)
    }
}

impl Serializer for ProtocolSerializer {
    fn serialize(&self, out: &mut dyn Write, message: &dyn Message) -> Result<usize, CodecError> {
        let mut counter = CountingWriter::new(out);
        let mut protocol = BinaryOutputProtocol::new(&mut counter, self.strict_write);
        let result = write_bare(&mut protocol, message);
        drop(protocol);
        self.finish_encode(counter.count(), result)
    }

    fn deserialize(
        &self,
        input: &mut dyn Read,
        descriptor: &Arc<MessageDescriptor>,
    ) -> Result<Arc<dyn Message>, CodecError> {
        let mut counter = CountingReader::new(input);
        let mut protocol =
            BinaryInputProtocol::new(&mut counter, self.strict_read).with_max_len(self.options.max_container_len);
        let result = self
            .decoder()
            .read_message(&mut ProtocolValueReader::new(&mut protocol, self.options.max_depth), descriptor);
        drop(protocol);
        self.finish_decode(counter.count(), result)
    }

    fn serialize_value(&self, out: &mut dyn Write, value: &Value, descriptor: &Descriptor) -> Result<usize, CodecError> {
        let mut counter = CountingWriter::new(out);
        let mut protocol = BinaryOutputProtocol::new(&mut counter, self.strict_write);
        let result = match (descriptor, value) {
            (Descriptor::Message(_), Value::Message(message)) => write_bare(&mut protocol, message.as_ref()),
            _ => write_wrapped(&mut protocol, value, descriptor),
        };
        drop(protocol);
        self.finish_encode(counter.count(), result)
    }

    fn deserialize_value(&self, input: &mut dyn Read, descriptor: &Descriptor) -> Result<Value, CodecError> {
        let mut counter = CountingReader::new(input);
        let mut protocol =
            BinaryInputProtocol::new(&mut counter, self.strict_read).with_max_len(self.options.max_container_len);
        let result = self.read_wrapped(&mut protocol, descriptor);
        drop(protocol);
        self.finish_decode(counter.count(), result)
    }

    fn name(&self) -> &'static str {
        "binary-protocol"
    }

    fn mime_type(&self) -> &'static str {
        "application/vnd.apache.thrift.binary"
    }

    fn is_binary(&self) -> bool {
        true
    }
}
