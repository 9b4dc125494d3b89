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

//! Compact binary serializer.
//!
//! Every value is a tag byte followed by a payload. The high nibble of the
//! tag names the wire class, the low nibble carries flags:
//!
//! ```text
//! +------------+------+--------------------------------+------------------------------+
//! | Class      | Tag  | Flags                          | Payload                      |
//! +------------+------+--------------------------------+------------------------------+
//! | BOOL       | 0x10 | bit 0 = value                  | none                         |
//! | INTEGER    | 0x20 | width 0..3 = 1/2/4/8 bytes     | LE two's complement          |
//! | DOUBLE     | 0x30 | none                           | 8 bytes LE IEEE-754          |
//! | BINARY     | 0x40 | bits 0-1 length width, bit 2   | length, bytes                |
//! |            |      | set for UTF-8 text             |                              |
//! | MESSAGE    | 0x50 | none                           | fields, 0x00                 |
//! | MAP        | 0x60 | count width                    | key class, value class,      |
//! |            |      |                                | count, tagged keys and values|
//! | COLLECTION | 0x70 | count width                    | item class, count, items     |
//! +------------+------+--------------------------------+------------------------------+
//! ```
//!
//! A field inside a message is written as `tag, key (u16 LE), payload`.
//! No tag is zero, so `0x00` terminates the field list. A message passed to
//! [`Serializer::serialize`] is written without its own tag: just the field
//! list and the stop byte. Integers always use the narrowest width that
//! holds the value.

use crate::descriptor::{Descriptor, EnumDescriptor, Field, MessageDescriptor, Primitive};
use crate::message::{Message, Value};
use crate::observability::CodecMetrics;
use crate::serialization::codec::{
    CollectionKind, CountingReader, CountingWriter, Decoder, FieldHeader, FieldId, ValueReader, ValueWriter,
    write_message, write_value,
};
use crate::serialization::{CodecError, CodecOptions, Serializer};
use std::fmt;
use std::io::{self, Read, Write};
use std::sync::Arc;
use tracing::trace;

const STOP: u8 = 0x00;
const UTF8_FLAG: u8 = 0x04;

/// Wire class carried in the high nibble of every tag byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum WireClass {
    /// `bool`.
    Bool = 0x10,
    /// `byte`, `i16`, `i32`, `i64` and enums.
    Integer = 0x20,
    /// `double`.
    Double = 0x30,
    /// `string` and `binary`.
    Binary = 0x40,
    /// Structs, unions and exceptions.
    Message = 0x50,
    /// Maps.
    Map = 0x60,
    /// Lists and sets.
    Collection = 0x70,
}

impl WireClass {
    /// Returns the tag byte with no flags.
    #[must_use]
    pub const fn tag(self) -> u8 {
        self as u8
    }

    /// Parses the class from a tag byte, ignoring the flags.
    #[must_use]
    pub const fn from_tag(tag: u8) -> Option<Self> {
        match tag & 0xF0 {
            0x10 => Some(Self::Bool),
            0x20 => Some(Self::Integer),
            0x30 => Some(Self::Double),
            0x40 => Some(Self::Binary),
            0x50 => Some(Self::Message),
            0x60 => Some(Self::Map),
            0x70 => Some(Self::Collection),
            _ => None,
        }
    }

    /// Wire class used for values of `descriptor`.
    ///
    /// # Errors
    ///
    /// Fails for `void` and services, which have no values.
    pub fn of(descriptor: &Descriptor) -> Result<Self, CodecError> {
        Ok(match descriptor {
            Descriptor::Primitive(Primitive::Bool) => Self::Bool,
            Descriptor::Primitive(Primitive::Byte | Primitive::I16 | Primitive::I32 | Primitive::I64)
            | Descriptor::Enum(_) => Self::Integer,
            Descriptor::Primitive(Primitive::Double) => Self::Double,
            Descriptor::Primitive(Primitive::String | Primitive::Binary) => Self::Binary,
            Descriptor::Message(_) => Self::Message,
            Descriptor::Map(..) => Self::Map,
            Descriptor::List(_) | Descriptor::Set(_) => Self::Collection,
            Descriptor::Primitive(Primitive::Void) | Descriptor::Service(_) => {
                return Err(CodecError::unsupported(format!(
                    "{} has no binary representation",
                    descriptor.name()
                )));
            }
        })
    }
}

impl fmt::Display for WireClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Bool => "BOOL",
            Self::Integer => "INTEGER",
            Self::Double => "DOUBLE",
            Self::Binary => "BINARY",
            Self::Message => "MESSAGE",
            Self::Map => "MAP",
            Self::Collection => "COLLECTION",
        })
    }
}

fn check_width(width: usize) -> Result<(), CodecError> {
    if (1..=8).contains(&width) {
        Ok(())
    } else {
        Err(CodecError::unsupported(format!("integer width {width}")))
    }
}

/// Writes the low `width` bytes of `value`, least significant first.
///
/// # Errors
///
/// Fails if `width` is not within `1..=8` or the stream fails.
///
/// # Examples
///
/// ```rust
/// use schemata::serialization::binary::write_unsigned;
///
/// let mut out = Vec::new();
/// write_unsigned(&mut out, 255, 1)?;
/// assert_eq!(out, [0xFF]);
/// # Ok::<(), schemata::serialization::CodecError>(())
/// ```
pub fn write_unsigned<W: Write + ?Sized>(out: &mut W, value: u64, width: usize) -> Result<(), CodecError> {
    check_width(width)?;
    out.write_all(&value.to_le_bytes()[..width])?;
    Ok(())
}

/// Writes the low `width` bytes of the two's-complement form of `value`.
///
/// # Errors
///
/// Same as [`write_unsigned`].
pub fn write_signed<W: Write + ?Sized>(out: &mut W, value: i64, width: usize) -> Result<(), CodecError> {
    write_unsigned(out, value as u64, width)
}

/// Reads `width` little-endian bytes without sign extension.
///
/// # Errors
///
/// Fails if `width` is not within `1..=8` or the stream ends early.
pub fn read_unsigned<R: Read + ?Sized>(input: &mut R, width: usize) -> Result<u64, CodecError> {
    check_width(width)?;
    let mut buf = [0u8; 8];
    input.read_exact(&mut buf[..width])?;
    Ok(u64::from_le_bytes(buf))
}

/// Reads `width` little-endian bytes and sign-extends the result.
///
/// # Errors
///
/// Same as [`read_unsigned`].
pub fn read_signed<R: Read + ?Sized>(input: &mut R, width: usize) -> Result<i64, CodecError> {
    let raw = read_unsigned(input, width)?;
    let shift = 64 - 8 * width as u32;
    Ok(((raw << shift) as i64) >> shift)
}

/// Writes a tagged double: `0x30` followed by the 8 little-endian bytes of
/// its bit pattern. Returns the 9 bytes written.
///
/// # Errors
///
/// Fails if the stream fails.
///
/// # Examples
///
/// ```rust
/// use schemata::serialization::binary::write_double;
///
/// let mut out = Vec::new();
/// write_double(&mut out, 1234567890.0)?;
/// assert_eq!(hex::encode(&out), "30000080b48065d241");
/// # Ok::<(), schemata::serialization::CodecError>(())
/// ```
pub fn write_double<W: Write + ?Sized>(out: &mut W, value: f64) -> Result<usize, CodecError> {
    out.write_all(&[WireClass::Double.tag()])?;
    out.write_all(&value.to_bits().to_le_bytes())?;
    Ok(9)
}

/// Reads the 8-byte payload of a double. The tag must already be consumed.
///
/// # Errors
///
/// Fails if the stream ends early.
pub fn read_double<R: Read + ?Sized>(input: &mut R) -> Result<f64, CodecError> {
    let mut buf = [0u8; 8];
    input.read_exact(&mut buf)?;
    Ok(f64::from_bits(u64::from_le_bytes(buf)))
}

/// Width flag (0..=3) of the narrowest signed width holding `value`.
fn signed_width_flag(value: i64) -> u8 {
    if i8::try_from(value).is_ok() {
        0
    } else if i16::try_from(value).is_ok() {
        1
    } else if i32::try_from(value).is_ok() {
        2
    } else {
        3
    }
}

/// Width flag (0..=3) of the narrowest unsigned width holding `value`.
fn unsigned_width_flag(value: u64) -> u8 {
    if value <= u64::from(u8::MAX) {
        0
    } else if value <= u64::from(u16::MAX) {
        1
    } else if value <= u64::from(u32::MAX) {
        2
    } else {
        3
    }
}

const fn flag_width(flag: u8) -> usize {
    1 << flag
}

/// Encoder for the compact binary format.
struct BinaryWriter<'a, W: Write + ?Sized> {
    out: &'a mut W,
    pending_key: Option<u16>,
    bare: bool,
}

impl<'a, W: Write + ?Sized> BinaryWriter<'a, W> {
    fn new(out: &'a mut W, bare: bool) -> Self {
        Self {
            out,
            pending_key: None,
            bare,
        }
    }

    /// Writes a tag byte, followed by the key of the field it opens.
    fn tag(&mut self, tag: u8) -> Result<(), CodecError> {
        self.out.write_all(&[tag])?;
        if let Some(key) = self.pending_key.take() {
            self.out.write_all(&key.to_le_bytes())?;
        }
        Ok(())
    }

    fn write_int(&mut self, value: i64) -> Result<(), CodecError> {
        let flag = signed_width_flag(value);
        self.tag(WireClass::Integer.tag() | flag)?;
        write_signed(self.out, value, flag_width(flag))
    }

    fn write_bytes(&mut self, value: &[u8], utf8: bool) -> Result<(), CodecError> {
        let len = value.len() as u64;
        let flag = unsigned_width_flag(len);
        let text = if utf8 { UTF8_FLAG } else { 0 };
        self.tag(WireClass::Binary.tag() | text | flag)?;
        write_unsigned(self.out, len, flag_width(flag))?;
        self.out.write_all(value)?;
        Ok(())
    }
}

impl<W: Write + ?Sized> ValueWriter for BinaryWriter<'_, W> {
    fn write_bool(&mut self, value: bool) -> Result<(), CodecError> {
        self.tag(WireClass::Bool.tag() | u8::from(value))
    }

    fn write_byte(&mut self, value: i8) -> Result<(), CodecError> {
        self.write_int(value.into())
    }

    fn write_i16(&mut self, value: i16) -> Result<(), CodecError> {
        self.write_int(value.into())
    }

    fn write_i32(&mut self, value: i32) -> Result<(), CodecError> {
        self.write_int(value.into())
    }

    fn write_i64(&mut self, value: i64) -> Result<(), CodecError> {
        self.write_int(value)
    }

    fn write_double(&mut self, value: f64) -> Result<(), CodecError> {
        self.tag(WireClass::Double.tag())?;
        self.out.write_all(&value.to_bits().to_le_bytes())?;
        Ok(())
    }

    fn write_string(&mut self, value: &str) -> Result<(), CodecError> {
        self.write_bytes(value.as_bytes(), true)
    }

    fn write_binary(&mut self, value: &[u8]) -> Result<(), CodecError> {
        self.write_bytes(value, false)
    }

    fn begin_message(&mut self, _descriptor: &MessageDescriptor) -> Result<(), CodecError> {
        if self.bare {
            self.bare = false;
            return Ok(());
        }
        self.tag(WireClass::Message.tag())
    }

    fn begin_field(&mut self, field: &Field, _descriptor: &Descriptor) -> Result<(), CodecError> {
        self.pending_key = Some(field.key());
        Ok(())
    }

    fn end_message(&mut self) -> Result<(), CodecError> {
        self.out.write_all(&[STOP])?;
        Ok(())
    }

    fn begin_collection(&mut self, _kind: CollectionKind, item: &Descriptor, len: usize) -> Result<(), CodecError> {
        let len = len as u64;
        let flag = unsigned_width_flag(len);
        self.tag(WireClass::Collection.tag() | flag)?;
        self.out.write_all(&[WireClass::of(item)?.tag()])?;
        write_unsigned(self.out, len, flag_width(flag))
    }

    fn begin_map(&mut self, key: &Descriptor, value: &Descriptor, len: usize) -> Result<(), CodecError> {
        let len = len as u64;
        let flag = unsigned_width_flag(len);
        self.tag(WireClass::Map.tag() | flag)?;
        self.out.write_all(&[WireClass::of(key)?.tag(), WireClass::of(value)?.tag()])?;
        write_unsigned(self.out, len, flag_width(flag))
    }
}

/// Decoder for the compact binary format.
struct BinaryReader<'a, R: Read + ?Sized> {
    input: &'a mut R,
    options: &'a CodecOptions,
    pending_tag: Option<u8>,
    remaining: Vec<u64>,
    bare: bool,
}

impl<'a, R: Read + ?Sized> BinaryReader<'a, R> {
    fn new(input: &'a mut R, options: &'a CodecOptions, bare: bool) -> Self {
        Self {
            input,
            options,
            pending_tag: None,
            remaining: Vec::new(),
            bare,
        }
    }

    fn byte(&mut self) -> Result<u8, CodecError> {
        let mut buf = [0u8; 1];
        self.input.read_exact(&mut buf)?;
        Ok(buf[0])
    }

    fn take_tag(&mut self) -> Result<u8, CodecError> {
        match self.pending_tag.take() {
            Some(tag) => Ok(tag),
            None => self.byte(),
        }
    }

    fn class_of(tag: u8) -> Result<WireClass, CodecError> {
        WireClass::from_tag(tag).ok_or_else(|| CodecError::malformed(format!("invalid tag 0x{tag:02x}")))
    }

    /// Consumes the next tag, requiring `expected`, and returns its flags.
    fn expect(&mut self, expected: WireClass) -> Result<u8, CodecError> {
        let tag = self.take_tag()?;
        let actual = Self::class_of(tag)?;
        if actual != expected {
            return Err(CodecError::mismatch("value", expected, actual));
        }
        Ok(tag & 0x0F)
    }

    fn width(flags: u8) -> Result<usize, CodecError> {
        let flag = flags & 0x03;
        if flags & !0x07 != 0 {
            return Err(CodecError::malformed(format!("invalid flags 0x{flags:x}")));
        }
        Ok(flag_width(flag))
    }

    fn read_int(&mut self) -> Result<i64, CodecError> {
        let flags = self.expect(WireClass::Integer)?;
        if flags > 3 {
            return Err(CodecError::malformed(format!("invalid integer width flag {flags}")));
        }
        read_signed(self.input, flag_width(flags))
    }

    fn read_len(&mut self, width: usize) -> Result<usize, CodecError> {
        let len = read_unsigned(self.input, width)?;
        usize::try_from(len)
            .ok()
            .filter(|len| *len <= self.options.max_container_len)
            .ok_or(CodecError::LimitExceeded {
                what: "length",
                limit: self.options.max_container_len,
            })
    }

    fn read_bytes(&mut self) -> Result<Vec<u8>, CodecError> {
        let flags = self.expect(WireClass::Binary)?;
        let len = self.read_len(Self::width(flags)?)?;
        let mut bytes = Vec::with_capacity(len.min(64 * 1024));
        (&mut *self.input).take(len as u64).read_to_end(&mut bytes)?;
        if bytes.len() != len {
            return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "binary value truncated").into());
        }
        Ok(bytes)
    }

    fn check_class(&mut self, context: &str, expected: &Descriptor) -> Result<(), CodecError> {
        let found = self.byte()?;
        let found = Self::class_of(found)?;
        let expected = WireClass::of(expected)?;
        if found != expected {
            return Err(CodecError::mismatch(context, expected, found));
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

    /// Discards the next tagged value.
    fn skip_value(&mut self, depth: usize) -> Result<(), CodecError> {
        if depth >= self.options.max_depth {
            return Err(CodecError::LimitExceeded {
                what: "nesting depth",
                limit: self.options.max_depth,
            });
        }
        let tag = self.take_tag()?;
        let flags = tag & 0x0F;
        match Self::class_of(tag)? {
            WireClass::Bool => {}
            WireClass::Integer => self.discard(Self::width(flags)? as u64)?,
            WireClass::Double => self.discard(8)?,
            WireClass::Binary => {
                let len = self.read_len(Self::width(flags)?)?;
                self.discard(len as u64)?;
            }
            WireClass::Message => loop {
                let tag = self.byte()?;
                if tag == STOP {
                    break;
                }
                let mut key = [0u8; 2];
                self.input.read_exact(&mut key)?;
                self.pending_tag = Some(tag);
                self.skip_value(depth + 1)?;
            },
            WireClass::Map => {
                let mut classes = [0u8; 2];
                self.input.read_exact(&mut classes)?;
                let count = self.read_len(Self::width(flags)?)?;
                for _ in 0..count * 2 {
                    self.skip_value(depth + 1)?;
                }
            }
            WireClass::Collection => {
                self.byte()?;
                let count = self.read_len(Self::width(flags)?)?;
                for _ in 0..count {
                    self.skip_value(depth + 1)?;
                }
            }
        }
        Ok(())
    }

    fn discard(&mut self, len: u64) -> Result<(), CodecError> {
        let copied = io::copy(&mut (&mut *self.input).take(len), &mut io::sink())?;
        if copied != len {
            return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "skipped value truncated").into());
        }
        Ok(())
    }
}

impl<R: Read + ?Sized> ValueReader for BinaryReader<'_, R> {
    type WireType = WireClass;

    fn wire_type_of(&self, descriptor: &Descriptor) -> Result<WireClass, CodecError> {
        WireClass::of(descriptor)
    }

    fn read_bool(&mut self) -> Result<bool, CodecError> {
        let flags = self.expect(WireClass::Bool)?;
        match flags {
            0 => Ok(false),
            1 => Ok(true),
            _ => Err(CodecError::malformed(format!("invalid bool flags 0x{flags:x}"))),
        }
    }

    fn read_byte(&mut self) -> Result<i8, CodecError> {
        let value = self.read_int()?;
        i8::try_from(value).map_err(|_| CodecError::malformed(format!("{value} out of range for byte")))
    }

    fn read_i16(&mut self) -> Result<i16, CodecError> {
        let value = self.read_int()?;
        i16::try_from(value).map_err(|_| CodecError::malformed(format!("{value} out of range for i16")))
    }

    fn read_i32(&mut self) -> Result<i32, CodecError> {
        let value = self.read_int()?;
        i32::try_from(value).map_err(|_| CodecError::malformed(format!("{value} out of range for i32")))
    }

    fn read_i64(&mut self) -> Result<i64, CodecError> {
        self.read_int()
    }

    fn read_double(&mut self) -> Result<f64, CodecError> {
        self.expect(WireClass::Double)?;
        read_double(self.input)
    }

    fn read_string(&mut self) -> Result<String, CodecError> {
        String::from_utf8(self.read_bytes()?).map_err(|e| CodecError::malformed(format!("invalid UTF-8: {e}")))
    }

    fn read_binary(&mut self) -> Result<Vec<u8>, CodecError> {
        self.read_bytes()
    }

    fn read_enum(&mut self, _descriptor: &EnumDescriptor) -> Result<i32, CodecError> {
        self.read_i32()
    }

    fn begin_message(&mut self, _descriptor: &MessageDescriptor) -> Result<(), CodecError> {
        if self.bare {
            self.bare = false;
            return Ok(());
        }
        self.expect(WireClass::Message)?;
        Ok(())
    }

    fn next_field(&mut self) -> Result<Option<FieldHeader<WireClass>>, CodecError> {
        let tag = self.byte()?;
        if tag == STOP {
            return Ok(None);
        }
        let class = Self::class_of(tag)?;
        let mut key = [0u8; 2];
        self.input.read_exact(&mut key)?;
        self.pending_tag = Some(tag);
        Ok(Some(FieldHeader {
            id: FieldId::Key(u16::from_le_bytes(key)),
            wire_type: Some(class),
        }))
    }

    fn skip_field(&mut self, _header: &FieldHeader<WireClass>) -> Result<(), CodecError> {
        self.skip_value(0)
    }

    fn end_message(&mut self) -> Result<(), CodecError> {
        Ok(())
    }

    fn begin_collection(&mut self, _kind: CollectionKind, item: &Descriptor) -> Result<Option<usize>, CodecError> {
        let flags = self.expect(WireClass::Collection)?;
        self.check_class("collection item", item)?;
        let count = self.read_len(Self::width(flags)?)?;
        self.remaining.push(count as u64);
        Ok(Some(count))
    }

    fn next_item(&mut self) -> Result<bool, CodecError> {
        Ok(self.next())
    }

    fn end_collection(&mut self) -> Result<(), CodecError> {
        self.remaining.pop();
        Ok(())
    }

    fn begin_map(&mut self, key: &Descriptor, value: &Descriptor) -> Result<Option<usize>, CodecError> {
        let flags = self.expect(WireClass::Map)?;
        self.check_class("map key", key)?;
        self.check_class("map value", value)?;
        let count = self.read_len(Self::width(flags)?)?;
        self.remaining.push(count as u64);
        Ok(Some(count))
    }

    fn next_entry(&mut self) -> Result<bool, CodecError> {
        Ok(self.next())
    }

    fn end_map(&mut self) -> Result<(), CodecError> {
        self.remaining.pop();
        Ok(())
    }
}

/// Compact binary serializer.
///
/// `BinarySerializer` produces the smallest encoding of the built-in
/// formats. The output is not self-framing: a transport or storage layer
/// supplies message boundaries.
///
/// # Examples
///
/// ```rust
/// use schemata::descriptor::{Descriptor, Field, MessageDescriptor, TypeName, Variant};
/// use schemata::message::GenericMessage;
/// use schemata::serialization::{BinarySerializer, Serializer};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let point = MessageDescriptor::builder(TypeName::new("geo", "Point"), Variant::Struct)
///     .with_field(Field::new(1, "x", Descriptor::I32))
///     .build()?;
/// let message = GenericMessage::builder(&point).with(1, 300)?.build_generic()?;
///
/// let bytes = BinarySerializer::new().to_vec(&message)?;
/// // INTEGER width 2, key 1, 300 little-endian, stop.
/// assert_eq!(hex::encode(&bytes), "2101002c0100");
/// # Ok(())
/// # }
/// # example().unwrap();
/// ```
#[derive(Debug, Clone, Default)]
pub struct BinarySerializer {
    options: CodecOptions,
    metrics: Option<Arc<CodecMetrics>>,
}

impl BinarySerializer {
    /// Creates a lenient serializer with default limits.
    pub fn new() -> Self {
        Self::default()
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

    /// Returns the decoding options.
    pub fn options(&self) -> &CodecOptions {
        &self.options
    }

    fn finish_encode(&self, written: usize, result: Result<(), CodecError>) -> Result<usize, CodecError> {
        if let Some(metrics) = &self.metrics {
            metrics.record_encode(written, result.as_ref().err());
        }
        result?;
        trace!(bytes = written, "binary encode complete");
        Ok(written)
    }

    fn finish_decode<T>(&self, read: usize, result: Result<T, CodecError>) -> Result<T, CodecError> {
        if let Some(metrics) = &self.metrics {
            metrics.record_decode(read, result.as_ref().err());
        }
        trace!(bytes = read, ok = result.is_ok(), "binary decode complete");
        result
    }

    fn decoder(&self) -> Decoder<'_> {
        Decoder::new(&self.options).with_metrics(self.metrics.as_deref())
    }
}

impl Serializer for BinarySerializer {
    fn serialize(&self, out: &mut dyn Write, message: &dyn Message) -> Result<usize, CodecError> {
        let mut counter = CountingWriter::new(out);
        let result = write_message(&mut BinaryWriter::new(&mut counter, true), message);
        self.finish_encode(counter.count(), result)
    }

    fn deserialize(
        &self,
        input: &mut dyn Read,
        descriptor: &Arc<MessageDescriptor>,
    ) -> Result<Arc<dyn Message>, CodecError> {
        let mut counter = CountingReader::new(input);
        let result = self
            .decoder()
            .read_message(&mut BinaryReader::new(&mut counter, &self.options, true), descriptor);
        self.finish_decode(counter.count(), result)
    }

    fn serialize_value(&self, out: &mut dyn Write, value: &Value, descriptor: &Descriptor) -> Result<usize, CodecError> {
        let mut counter = CountingWriter::new(out);
        let result = write_value(&mut BinaryWriter::new(&mut counter, false), value, descriptor);
        self.finish_encode(counter.count(), result)
    }

    fn deserialize_value(&self, input: &mut dyn Read, descriptor: &Descriptor) -> Result<Value, CodecError> {
        let mut counter = CountingReader::new(input);
        let result = self
            .decoder()
            .read_value(&mut BinaryReader::new(&mut counter, &self.options, false), descriptor);
        self.finish_decode(counter.count(), result)
    }

    fn name(&self) -> &'static str {
        "binary"
    }

    fn mime_type(&self) -> &'static str {
        "application/x-schemata-binary"
    }

    fn is_binary(&self) -> bool {
        true
    }
}
