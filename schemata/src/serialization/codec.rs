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

//! The recursive value traversal shared by every format.
//!
//! A format supplies a [`ValueWriter`] and a [`ValueReader`]: leaf encoders
//! for primitives plus framing hooks for messages, fields and containers.
//! The functions in this module walk the descriptor tree and call those
//! hooks. All ordering and decision logic lives here, so every format
//! writes fields in declaration order, skips absent fields, type-checks
//! field headers, rejects unmapped enum values and validates through a
//! builder the same way.

use crate::descriptor::{Descriptor, EnumDescriptor, Field, MessageDescriptor, Primitive};
use crate::message::{Message, Value};
use crate::observability::CodecMetrics;
use crate::serialization::{CodecError, CodecOptions};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::io::{self, Read, Write};
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// List or set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionKind {
    /// Ordered, duplicates allowed.
    List,
    /// Duplicate-free.
    Set,
}

/// How a field is identified on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldId {
    /// Numeric key.
    Key(u16),
    /// Field name.
    Name(String),
}

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Key(key) => write!(f, "{key}"),
            Self::Name(name) => f.write_str(name),
        }
    }
}

/// A decoded field header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldHeader<W> {
    /// The field identifier.
    pub id: FieldId,
    /// The wire type announced by the header, for formats that carry one.
    pub wire_type: Option<W>,
}

/// Leaf encoder and framing hooks for one output format.
pub trait ValueWriter {
    /// Writes a `bool`.
    fn write_bool(&mut self, value: bool) -> Result<(), CodecError>;
    /// Writes a `byte`.
    fn write_byte(&mut self, value: i8) -> Result<(), CodecError>;
    /// Writes an `i16`.
    fn write_i16(&mut self, value: i16) -> Result<(), CodecError>;
    /// Writes an `i32`.
    fn write_i32(&mut self, value: i32) -> Result<(), CodecError>;
    /// Writes an `i64`.
    fn write_i64(&mut self, value: i64) -> Result<(), CodecError>;
    /// Writes a `double`.
    fn write_double(&mut self, value: f64) -> Result<(), CodecError>;
    /// Writes a `string`.
    fn write_string(&mut self, value: &str) -> Result<(), CodecError>;
    /// Writes a `binary`.
    fn write_binary(&mut self, value: &[u8]) -> Result<(), CodecError>;

    /// Writes an enum value. Formats that can name constants override this.
    fn write_enum(&mut self, value: i32, _descriptor: &EnumDescriptor) -> Result<(), CodecError> {
        self.write_i32(value)
    }

    /// Opens a message.
    fn begin_message(&mut self, descriptor: &MessageDescriptor) -> Result<(), CodecError>;
    /// Announces the next present field; its value follows.
    fn begin_field(&mut self, field: &Field, descriptor: &Descriptor) -> Result<(), CodecError>;
    /// Closes the field opened by [`ValueWriter::begin_field`].
    fn end_field(&mut self) -> Result<(), CodecError> {
        Ok(())
    }
    /// Closes a message, writing its stop marker.
    fn end_message(&mut self) -> Result<(), CodecError>;

    /// Opens a list or set of `len` items.
    fn begin_collection(
        &mut self,
        kind: CollectionKind,
        item: &Descriptor,
        len: usize,
    ) -> Result<(), CodecError>;
    /// Closes a list or set.
    fn end_collection(&mut self, _kind: CollectionKind) -> Result<(), CodecError> {
        Ok(())
    }

    /// Opens a map of `len` entries; keys and values then alternate.
    fn begin_map(&mut self, key: &Descriptor, value: &Descriptor, len: usize) -> Result<(), CodecError>;
    /// Closes a map.
    fn end_map(&mut self) -> Result<(), CodecError> {
        Ok(())
    }
}

/// Leaf decoder and framing hooks for one input format.
pub trait ValueReader {
    /// The format's wire type tag, compared against the descriptor.
    type WireType: Copy + PartialEq + fmt::Display;

    /// Wire type the format uses for values of `descriptor`.
    ///
    /// # Errors
    ///
    /// Fails for types the format cannot carry.
    fn wire_type_of(&self, descriptor: &Descriptor) -> Result<Self::WireType, CodecError>;

    /// Reads a `bool`.
    fn read_bool(&mut self) -> Result<bool, CodecError>;
    /// Reads a `byte`.
    fn read_byte(&mut self) -> Result<i8, CodecError>;
    /// Reads an `i16`.
    fn read_i16(&mut self) -> Result<i16, CodecError>;
    /// Reads an `i32`.
    fn read_i32(&mut self) -> Result<i32, CodecError>;
    /// Reads an `i64`.
    fn read_i64(&mut self) -> Result<i64, CodecError>;
    /// Reads a `double`.
    fn read_double(&mut self) -> Result<f64, CodecError>;
    /// Reads a `string`.
    fn read_string(&mut self) -> Result<String, CodecError>;
    /// Reads a `binary`.
    fn read_binary(&mut self) -> Result<Vec<u8>, CodecError>;

    /// Reads the integer of an enum value. Formats that can name constants
    /// override this; the traversal checks the result against `descriptor`.
    fn read_enum(&mut self, _descriptor: &EnumDescriptor) -> Result<i32, CodecError> {
        self.read_i32()
    }

    /// Opens a message.
    fn begin_message(&mut self, descriptor: &MessageDescriptor) -> Result<(), CodecError>;
    /// Reads the next field header, or `None` at the stop marker.
    fn next_field(&mut self) -> Result<Option<FieldHeader<Self::WireType>>, CodecError>;
    /// Returns `true` when the field just read holds an explicit null, which
    /// decodes as an unset field.
    fn field_is_null(&self) -> bool {
        false
    }
    /// Discards the value of a field the type does not declare.
    fn skip_field(&mut self, header: &FieldHeader<Self::WireType>) -> Result<(), CodecError>;
    /// Closes a message.
    fn end_message(&mut self) -> Result<(), CodecError>;

    /// Opens a list or set and returns its announced length, if the format
    /// carries one.
    fn begin_collection(&mut self, kind: CollectionKind, item: &Descriptor) -> Result<Option<usize>, CodecError>;
    /// Advances to the next item, returning `false` at the end.
    fn next_item(&mut self) -> Result<bool, CodecError>;
    /// Closes a list or set.
    fn end_collection(&mut self) -> Result<(), CodecError>;

    /// Opens a map and returns its announced length, if the format carries one.
    fn begin_map(&mut self, key: &Descriptor, value: &Descriptor) -> Result<Option<usize>, CodecError>;
    /// Advances to the next entry, returning `false` at the end. The key is
    /// read next, then the value.
    fn next_entry(&mut self) -> Result<bool, CodecError>;
    /// Positions the reader on the value of the current entry.
    fn begin_map_value(&mut self) -> Result<(), CodecError> {
        Ok(())
    }
    /// Closes a map.
    fn end_map(&mut self) -> Result<(), CodecError>;
}

/// Encodes `value` as a value of type `descriptor`.
///
/// # Errors
///
/// Fails if the value does not have the shape the descriptor declares, if a
/// type reference cannot be resolved, or if the writer fails.
pub fn write_value<W>(writer: &mut W, value: &Value, descriptor: &Descriptor) -> Result<(), CodecError>
where
    W: ValueWriter + ?Sized,
{
    match (descriptor, value) {
        (Descriptor::Primitive(Primitive::Bool), Value::Bool(v)) => writer.write_bool(*v),
        (Descriptor::Primitive(Primitive::Byte), Value::Byte(v)) => writer.write_byte(*v),
        (Descriptor::Primitive(Primitive::I16), Value::I16(v)) => writer.write_i16(*v),
        (Descriptor::Primitive(Primitive::I32), Value::I32(v)) => writer.write_i32(*v),
        (Descriptor::Primitive(Primitive::I64), Value::I64(v)) => writer.write_i64(*v),
        (Descriptor::Primitive(Primitive::Double), Value::Double(v)) => writer.write_double(*v),
        (Descriptor::Primitive(Primitive::String), Value::String(v)) => writer.write_string(v),
        (Descriptor::Primitive(Primitive::Binary), Value::Binary(v)) => writer.write_binary(v),
        (Descriptor::Enum(e), Value::Enum(v)) => writer.write_enum(*v, e),
        (Descriptor::List(item), Value::List(items)) => {
            write_collection(writer, CollectionKind::List, item.descriptor()?, items.iter())
        }
        (Descriptor::Set(item), Value::Set(items)) => {
            // Hand-built sets may repeat items; only the first occurrence is written.
            let mut seen = HashSet::with_capacity(items.len());
            let unique: Vec<&Value> = items.iter().filter(|v| seen.insert(*v)).collect();
            write_collection(writer, CollectionKind::Set, item.descriptor()?, unique.into_iter())
        }
        (Descriptor::Map(key, val), Value::Map(entries)) => {
            let (key, val) = (key.descriptor()?, val.descriptor()?);
            let entries = unique_entries(entries);
            writer.begin_map(key, val, entries.len())?;
            for (k, v) in entries {
                write_value(writer, k, key)?;
                write_value(writer, v, val)?;
            }
            writer.end_map()
        }
        (Descriptor::Message(_), Value::Message(message)) => write_message(writer, message.as_ref()),
        (descriptor, value) => Err(CodecError::mismatch("value", descriptor.name(), value.type_name())),
    }
}

fn write_collection<'v, W, I>(
    writer: &mut W,
    kind: CollectionKind,
    item: &Descriptor,
    items: I,
) -> Result<(), CodecError>
where
    W: ValueWriter + ?Sized,
    I: ExactSizeIterator<Item = &'v Value>,
{
    writer.begin_collection(kind, item, items.len())?;
    for value in items {
        write_value(writer, value, item)?;
    }
    writer.end_collection(kind)
}

/// Map entries with repeated keys folded the way [`Value::map`] folds them.
fn unique_entries(entries: &[(Value, Value)]) -> Vec<(&Value, &Value)> {
    let mut positions: HashMap<&Value, usize> = HashMap::with_capacity(entries.len());
    let mut ordered: Vec<(&Value, &Value)> = Vec::with_capacity(entries.len());
    for (key, value) in entries {
        match positions.get(key) {
            Some(&index) => ordered[index].1 = value,
            None => {
                positions.insert(key, ordered.len());
                ordered.push((key, value));
            }
        }
    }
    ordered
}

/// Encodes every present field of `message` in declaration order.
///
/// # Errors
///
/// Same as [`write_value`].
pub fn write_message<W>(writer: &mut W, message: &dyn Message) -> Result<(), CodecError>
where
    W: ValueWriter + ?Sized,
{
    let descriptor = message.descriptor();
    trace!(type_name = %descriptor.type_name(), "encoding message");
    writer.begin_message(descriptor)?;
    for field in descriptor.fields() {
        let Some(value) = message.get(field.key()) else {
            continue;
        };
        let field_type = field.descriptor()?;
        writer.begin_field(field, field_type)?;
        write_value(writer, &value, field_type)?;
        writer.end_field()?;
    }
    writer.end_message()
}

/// Decoding half of the traversal, carrying options and optional metrics.
#[derive(Debug, Clone, Copy)]
pub struct Decoder<'a> {
    options: &'a CodecOptions,
    metrics: Option<&'a CodecMetrics>,
}

impl<'a> Decoder<'a> {
    /// Creates a decoder.
    pub fn new(options: &'a CodecOptions) -> Self {
        Self {
            options,
            metrics: None,
        }
    }

    /// Counts skipped unknown fields in `metrics`.
    pub fn with_metrics(mut self, metrics: Option<&'a CodecMetrics>) -> Self {
        self.metrics = metrics;
        self
    }

    /// Decodes a value of type `descriptor`.
    ///
    /// # Errors
    ///
    /// Fails on wire type mismatches, unmapped enum values, limit
    /// violations, invalid messages and reader failures.
    pub fn read_value<R>(&self, reader: &mut R, descriptor: &Descriptor) -> Result<Value, CodecError>
    where
        R: ValueReader + ?Sized,
    {
        self.read_value_at(reader, descriptor, 0)
    }

    /// Decodes a message of type `descriptor`.
    ///
    /// # Errors
    ///
    /// Same as [`Decoder::read_value`].
    pub fn read_message<R>(
        &self,
        reader: &mut R,
        descriptor: &Arc<MessageDescriptor>,
    ) -> Result<Arc<dyn Message>, CodecError>
    where
        R: ValueReader + ?Sized,
    {
        self.read_message_at(reader, descriptor, 0)
    }

    fn enter(&self, depth: usize) -> Result<usize, CodecError> {
        if depth >= self.options.max_depth {
            return Err(CodecError::LimitExceeded {
                what: "nesting depth",
                limit: self.options.max_depth,
            });
        }
        Ok(depth + 1)
    }

    fn check_len(&self, announced: Option<usize>) -> Result<usize, CodecError> {
        let announced = announced.unwrap_or(0);
        if announced > self.options.max_container_len {
            return Err(CodecError::LimitExceeded {
                what: "container length",
                limit: self.options.max_container_len,
            });
        }
        Ok(announced)
    }

    fn push_item<T>(&self, items: &mut Vec<T>, item: T) -> Result<(), CodecError> {
        if items.len() >= self.options.max_container_len {
            return Err(CodecError::LimitExceeded {
                what: "container length",
                limit: self.options.max_container_len,
            });
        }
        items.push(item);
        Ok(())
    }

    fn read_value_at<R>(&self, reader: &mut R, descriptor: &Descriptor, depth: usize) -> Result<Value, CodecError>
    where
        R: ValueReader + ?Sized,
    {
        let value = match descriptor {
            Descriptor::Primitive(primitive) => match primitive {
                Primitive::Bool => Value::Bool(reader.read_bool()?),
                Primitive::Byte => Value::Byte(reader.read_byte()?),
                Primitive::I16 => Value::I16(reader.read_i16()?),
                Primitive::I32 => Value::I32(reader.read_i32()?),
                Primitive::I64 => Value::I64(reader.read_i64()?),
                Primitive::Double => Value::Double(reader.read_double()?),
                Primitive::String => Value::String(reader.read_string()?),
                Primitive::Binary => Value::Binary(reader.read_binary()?),
                Primitive::Void => return Err(CodecError::unsupported("void has no value")),
            },
            Descriptor::Enum(e) => {
                let value = reader.read_enum(e)?;
                if e.find_by_value(value).is_none() {
                    return Err(CodecError::InvalidEnumValue {
                        enum_name: e.type_name().to_string(),
                        value: value.to_string(),
                    });
                }
                Value::Enum(value)
            }
            Descriptor::List(item) => {
                Value::List(self.read_collection(reader, CollectionKind::List, item.descriptor()?, depth)?)
            }
            Descriptor::Set(item) => {
                Value::set(self.read_collection(reader, CollectionKind::Set, item.descriptor()?, depth)?)
            }
            Descriptor::Map(key, val) => {
                let (key, val) = (key.descriptor()?, val.descriptor()?);
                let depth = self.enter(depth)?;
                let announced = self.check_len(reader.begin_map(key, val)?)?;
                let mut entries = Vec::with_capacity(announced.min(1024));
                while reader.next_entry()? {
                    let k = self.read_value_at(reader, key, depth)?;
                    reader.begin_map_value()?;
                    let v = self.read_value_at(reader, val, depth)?;
                    self.push_item(&mut entries, (k, v))?;
                }
                reader.end_map()?;
                Value::map(entries)
            }
            Descriptor::Message(message) => Value::Message(self.read_message_at(reader, message, depth)?),
            Descriptor::Service(service) => {
                return Err(CodecError::unsupported(format!(
                    "service {} is not a value type",
                    service.type_name()
                )));
            }
        };
        Ok(value)
    }

    fn read_collection<R>(
        &self,
        reader: &mut R,
        kind: CollectionKind,
        item: &Descriptor,
        depth: usize,
    ) -> Result<Vec<Value>, CodecError>
    where
        R: ValueReader + ?Sized,
    {
        let depth = self.enter(depth)?;
        let announced = self.check_len(reader.begin_collection(kind, item)?)?;
        let mut items = Vec::with_capacity(announced.min(1024));
        while reader.next_item()? {
            let value = self.read_value_at(reader, item, depth)?;
            self.push_item(&mut items, value)?;
        }
        reader.end_collection()?;
        Ok(items)
    }

    fn read_message_at<R>(
        &self,
        reader: &mut R,
        descriptor: &Arc<MessageDescriptor>,
        depth: usize,
    ) -> Result<Arc<dyn Message>, CodecError>
    where
        R: ValueReader + ?Sized,
    {
        let depth = self.enter(depth)?;
        let type_name = descriptor.type_name();
        trace!(type_name = %type_name, depth, "decoding message");
        reader.begin_message(descriptor)?;
        let mut builder = descriptor.new_builder();
        while let Some(header) = reader.next_field()? {
            let field = match &header.id {
                FieldId::Key(key) => descriptor.field(*key),
                FieldId::Name(name) => descriptor.field_by_name(name),
            };
            let Some(field) = field else {
                if self.options.strict {
                    warn!(type_name = %type_name, field = %header.id, "unknown field in strict mode");
                    return Err(CodecError::UnknownField {
                        type_name: type_name.to_string(),
                        field: header.id.to_string(),
                    });
                }
                debug!(type_name = %type_name, field = %header.id, "skipping unknown field");
                if let Some(metrics) = self.metrics {
                    metrics.record_unknown_field();
                }
                reader.skip_field(&header)?;
                continue;
            };
            if reader.field_is_null() {
                reader.skip_field(&header)?;
                continue;
            }
            let field_type = field.descriptor()?;
            if let Some(actual) = header.wire_type {
                let expected = reader.wire_type_of(field_type)?;
                if expected != actual {
                    return Err(CodecError::mismatch(
                        format!("{}.{}", type_name, field.name()),
                        expected,
                        actual,
                    ));
                }
            }
            let value = self.read_value_at(reader, field_type, depth)?;
            builder.set(field.key(), value)?;
        }
        reader.end_message()?;
        Ok(builder.build()?)
    }
}

/// Write adapter that counts bytes passing through.
pub(crate) struct CountingWriter<'a, W: Write + ?Sized> {
    inner: &'a mut W,
    count: usize,
}

impl<'a, W: Write + ?Sized> CountingWriter<'a, W> {
    pub(crate) fn new(inner: &'a mut W) -> Self {
        Self { inner, count: 0 }
    }

    pub(crate) fn count(&self) -> usize {
        self.count
    }
}

impl<W: Write + ?Sized> Write for CountingWriter<'_, W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.inner.write(buf)?;
        self.count += n;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

/// Read adapter that counts bytes passing through.
pub(crate) struct CountingReader<'a, R: Read + ?Sized> {
    inner: &'a mut R,
    count: usize,
}

impl<'a, R: Read + ?Sized> CountingReader<'a, R> {
    pub(crate) fn new(inner: &'a mut R) -> Self {
        Self { inner, count: 0 }
    }

    pub(crate) fn count(&self) -> usize {
        self.count
    }
}

impl<R: Read + ?Sized> Read for CountingReader<'_, R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.count += n;
        Ok(n)
    }
}
