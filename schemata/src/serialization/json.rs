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

//! Compact JSON serializer.
//!
//! Messages are JSON objects keyed either by field key (`{"1": ...}`) or by
//! field name (`{"operator": ...}`). The reader accepts both forms whatever
//! the configured mode: a key made only of digits is a field key, anything
//! else is a field name.
//!
//! # Value Mapping
//!
//! | Type | JSON |
//! |------|------|
//! | `bool` | `true` / `false` |
//! | integers | number |
//! | `double` | number; integral values without a fraction (`-2.0` is `-2`) |
//! | `string` | string |
//! | `binary` | lowercase hex string |
//! | enum | number, or the constant name in name mode |
//! | list, set | array |
//! | map | object; keys are the compact JSON text of the key value, strings as-is |
//! | message | object |
//!
//! A `null` field value reads as an absent field. Non-finite doubles have no
//! JSON form and fail to encode.

use crate::descriptor::{Descriptor, EnumDescriptor, Field, MessageDescriptor, Primitive, TypeKind};
use crate::message::{Message, Value};
use crate::observability::CodecMetrics;
use crate::serialization::codec::{
    CollectionKind, CountingReader, CountingWriter, Decoder, FieldHeader, FieldId, ValueReader, ValueWriter,
    write_message, write_value,
};
use crate::serialization::{CodecError, CodecOptions, IdType, Serializer};
use serde_json::{Map, Number, Value as Json};
use std::io::{Read, Write};
use std::sync::Arc;
use tracing::trace;

/// Largest magnitude below which every integer is exactly a double.
const EXACT_INTEGER_LIMIT: f64 = 9_007_199_254_740_992.0;

fn json_type(value: &Json) -> &'static str {
    match value {
        Json::Null => "null",
        Json::Bool(_) => "bool",
        Json::Number(_) => "number",
        Json::String(_) => "string",
        Json::Array(_) => "array",
        Json::Object(_) => "object",
    }
}

fn map_key_text(key: Json) -> String {
    match key {
        Json::String(text) => text,
        other => other.to_string(),
    }
}

enum WriteFrame {
    Object { map: Map<String, Json>, name: Option<String> },
    Array(Vec<Json>),
    Map { map: Map<String, Json>, key: Option<String> },
}

/// Builds a JSON tree from the traversal.
struct JsonWriter {
    key_mode: IdType,
    enum_mode: IdType,
    stack: Vec<WriteFrame>,
    root: Option<Json>,
}

impl JsonWriter {
    fn new(key_mode: IdType, enum_mode: IdType) -> Self {
        Self {
            key_mode,
            enum_mode,
            stack: Vec::new(),
            root: None,
        }
    }

    fn emit(&mut self, value: Json) -> Result<(), CodecError> {
        match self.stack.last_mut() {
            None => self.root = Some(value),
            Some(WriteFrame::Object { map, name }) => {
                let name = name
                    .take()
                    .ok_or_else(|| CodecError::malformed("object value without a field"))?;
                map.insert(name, value);
            }
            Some(WriteFrame::Array(items)) => items.push(value),
            Some(WriteFrame::Map { map, key }) => match key.take() {
                None => *key = Some(map_key_text(value)),
                Some(key) => {
                    map.insert(key, value);
                }
            },
        }
        Ok(())
    }

    fn finish(self) -> Result<Json, CodecError> {
        self.root.ok_or_else(|| CodecError::malformed("nothing was written"))
    }
}

impl ValueWriter for JsonWriter {
    fn write_bool(&mut self, value: bool) -> Result<(), CodecError> {
        self.emit(Json::Bool(value))
    }

    fn write_byte(&mut self, value: i8) -> Result<(), CodecError> {
        self.emit(Json::from(value))
    }

    fn write_i16(&mut self, value: i16) -> Result<(), CodecError> {
        self.emit(Json::from(value))
    }

    fn write_i32(&mut self, value: i32) -> Result<(), CodecError> {
        self.emit(Json::from(value))
    }

    fn write_i64(&mut self, value: i64) -> Result<(), CodecError> {
        self.emit(Json::from(value))
    }

    fn write_double(&mut self, value: f64) -> Result<(), CodecError> {
        let integral = value.fract() == 0.0
            && value.abs() < EXACT_INTEGER_LIMIT
            && !(value == 0.0 && value.is_sign_negative());
        let number = if integral {
            Number::from(value as i64)
        } else {
            Number::from_f64(value)
                .ok_or_else(|| CodecError::unsupported(format!("{value} has no JSON representation")))?
        };
        self.emit(Json::Number(number))
    }

    fn write_string(&mut self, value: &str) -> Result<(), CodecError> {
        self.emit(Json::String(value.to_string()))
    }

    fn write_binary(&mut self, value: &[u8]) -> Result<(), CodecError> {
        self.emit(Json::String(hex::encode(value)))
    }

    fn write_enum(&mut self, value: i32, descriptor: &EnumDescriptor) -> Result<(), CodecError> {
        match (self.enum_mode, descriptor.find_by_value(value)) {
            (IdType::Name, Some(constant)) => self.emit(Json::String(constant.name().to_string())),
            _ => self.emit(Json::from(value)),
        }
    }

    fn begin_message(&mut self, _descriptor: &MessageDescriptor) -> Result<(), CodecError> {
        self.stack.push(WriteFrame::Object {
            map: Map::new(),
            name: None,
        });
        Ok(())
    }

    fn begin_field(&mut self, field: &Field, _descriptor: &Descriptor) -> Result<(), CodecError> {
        match self.stack.last_mut() {
            Some(WriteFrame::Object { name, .. }) => {
                *name = Some(match self.key_mode {
                    IdType::Id => field.key().to_string(),
                    IdType::Name => field.name().to_string(),
                });
                Ok(())
            }
            _ => Err(CodecError::malformed("field outside of a message")),
        }
    }

    fn end_message(&mut self) -> Result<(), CodecError> {
        match self.stack.pop() {
            Some(WriteFrame::Object { map, .. }) => self.emit(Json::Object(map)),
            _ => Err(CodecError::malformed("unbalanced message")),
        }
    }

    fn begin_collection(&mut self, _kind: CollectionKind, _item: &Descriptor, len: usize) -> Result<(), CodecError> {
        self.stack.push(WriteFrame::Array(Vec::with_capacity(len)));
        Ok(())
    }

    fn end_collection(&mut self, _kind: CollectionKind) -> Result<(), CodecError> {
        match self.stack.pop() {
            Some(WriteFrame::Array(items)) => self.emit(Json::Array(items)),
            _ => Err(CodecError::malformed("unbalanced collection")),
        }
    }

    fn begin_map(&mut self, _key: &Descriptor, _value: &Descriptor, _len: usize) -> Result<(), CodecError> {
        self.stack.push(WriteFrame::Map {
            map: Map::new(),
            key: None,
        });
        Ok(())
    }

    fn end_map(&mut self) -> Result<(), CodecError> {
        match self.stack.pop() {
            Some(WriteFrame::Map { map, .. }) => self.emit(Json::Object(map)),
            _ => Err(CodecError::malformed("unbalanced map")),
        }
    }
}

enum ReadFrame {
    Object(serde_json::map::IntoIter),
    Array(std::vec::IntoIter<Json>),
    Map {
        entries: serde_json::map::IntoIter,
        key: Descriptor,
        value: Option<Json>,
    },
}

/// Walks a parsed JSON tree for the traversal.
struct JsonReader {
    stack: Vec<ReadFrame>,
    current: Option<Json>,
}

impl JsonReader {
    fn new(root: Json) -> Self {
        Self {
            stack: Vec::new(),
            current: Some(root),
        }
    }

    fn take(&mut self) -> Result<Json, CodecError> {
        self.current
            .take()
            .ok_or_else(|| CodecError::malformed("no JSON value at this position"))
    }

    fn integer(&mut self, expected: &'static str) -> Result<i64, CodecError> {
        match self.take()? {
            Json::Number(n) => n
                .as_i64()
                .ok_or_else(|| CodecError::mismatch("value", expected, n)),
            other => Err(CodecError::mismatch("value", expected, json_type(&other))),
        }
    }

    fn ranged<T: TryFrom<i64>>(&mut self, expected: &'static str) -> Result<T, CodecError> {
        let value = self.integer(expected)?;
        T::try_from(value).map_err(|_| CodecError::malformed(format!("{value} out of range for {expected}")))
    }

    fn string(&mut self, expected: &'static str) -> Result<String, CodecError> {
        match self.take()? {
            Json::String(text) => Ok(text),
            other => Err(CodecError::mismatch("value", expected, json_type(&other))),
        }
    }

    fn pop(&mut self) -> Result<(), CodecError> {
        self.stack
            .pop()
            .map(|_| ())
            .ok_or_else(|| CodecError::malformed("unbalanced JSON traversal"))
    }
}

/// Turns an object key back into the JSON value it was written from.
fn parse_map_key(text: String, key: &Descriptor) -> Result<Json, CodecError> {
    match key {
        Descriptor::Primitive(Primitive::String | Primitive::Binary) => Ok(Json::String(text)),
        Descriptor::Enum(_) => Ok(match text.parse::<i64>() {
            Ok(number) => Json::from(number),
            Err(_) => Json::String(text),
        }),
        _ => serde_json::from_str(&text).map_err(|e| CodecError::malformed(format!("invalid map key `{text}`: {e}"))),
    }
}

impl ValueReader for JsonReader {
    type WireType = TypeKind;

    fn wire_type_of(&self, descriptor: &Descriptor) -> Result<TypeKind, CodecError> {
        Ok(descriptor.kind())
    }

    fn read_bool(&mut self) -> Result<bool, CodecError> {
        match self.take()? {
            Json::Bool(value) => Ok(value),
            other => Err(CodecError::mismatch("value", "bool", json_type(&other))),
        }
    }

    fn read_byte(&mut self) -> Result<i8, CodecError> {
        self.ranged("byte")
    }

    fn read_i16(&mut self) -> Result<i16, CodecError> {
        self.ranged("i16")
    }

    fn read_i32(&mut self) -> Result<i32, CodecError> {
        self.ranged("i32")
    }

    fn read_i64(&mut self) -> Result<i64, CodecError> {
        self.integer("i64")
    }

    fn read_double(&mut self) -> Result<f64, CodecError> {
        match self.take()? {
            Json::Number(n) => n
                .as_f64()
                .ok_or_else(|| CodecError::malformed(format!("{n} is not a double"))),
            other => Err(CodecError::mismatch("value", "double", json_type(&other))),
        }
    }

    fn read_string(&mut self) -> Result<String, CodecError> {
        self.string("string")
    }

    fn read_binary(&mut self) -> Result<Vec<u8>, CodecError> {
        let text = self.string("binary")?;
        hex::decode(&text).map_err(|e| CodecError::malformed(format!("invalid hex binary: {e}")))
    }

    fn read_enum(&mut self, descriptor: &EnumDescriptor) -> Result<i32, CodecError> {
        match self.take()? {
            Json::String(name) => descriptor
                .find_by_name(&name)
                .map(|constant| constant.value())
                .ok_or_else(|| CodecError::InvalidEnumValue {
                    enum_name: descriptor.type_name().to_string(),
                    value: name,
                }),
            other => {
                self.current = Some(other);
                self.ranged("enum")
            }
        }
    }

    fn begin_message(&mut self, _descriptor: &MessageDescriptor) -> Result<(), CodecError> {
        match self.take()? {
            Json::Object(map) => {
                self.stack.push(ReadFrame::Object(map.into_iter()));
                Ok(())
            }
            other => Err(CodecError::mismatch("value", "object", json_type(&other))),
        }
    }

    fn next_field(&mut self) -> Result<Option<FieldHeader<TypeKind>>, CodecError> {
        let Some(ReadFrame::Object(fields)) = self.stack.last_mut() else {
            return Err(CodecError::malformed("field read outside of an object"));
        };
        if let Some((name, value)) = fields.next() {
            let id = match name.parse::<u16>() {
                Ok(key) if name.bytes().all(|b| b.is_ascii_digit()) => FieldId::Key(key),
                _ => FieldId::Name(name),
            };
            self.current = Some(value);
            return Ok(Some(FieldHeader { id, wire_type: None }));
        }
        Ok(None)
    }

    fn field_is_null(&self) -> bool {
        matches!(self.current, Some(Json::Null))
    }

    fn skip_field(&mut self, _header: &FieldHeader<TypeKind>) -> Result<(), CodecError> {
        self.current = None;
        Ok(())
    }

    fn end_message(&mut self) -> Result<(), CodecError> {
        self.pop()
    }

    fn begin_collection(&mut self, _kind: CollectionKind, _item: &Descriptor) -> Result<Option<usize>, CodecError> {
        match self.take()? {
            Json::Array(items) => {
                let len = items.len();
                self.stack.push(ReadFrame::Array(items.into_iter()));
                Ok(Some(len))
            }
            other => Err(CodecError::mismatch("value", "array", json_type(&other))),
        }
    }

    fn next_item(&mut self) -> Result<bool, CodecError> {
        let Some(ReadFrame::Array(items)) = self.stack.last_mut() else {
            return Err(CodecError::malformed("item read outside of an array"));
        };
        self.current = items.next();
        Ok(self.current.is_some())
    }

    fn end_collection(&mut self) -> Result<(), CodecError> {
        self.pop()
    }

    fn begin_map(&mut self, key: &Descriptor, _value: &Descriptor) -> Result<Option<usize>, CodecError> {
        match self.take()? {
            Json::Object(map) => {
                let len = map.len();
                self.stack.push(ReadFrame::Map {
                    entries: map.into_iter(),
                    key: key.clone(),
                    value: None,
                });
                Ok(Some(len))
            }
            other => Err(CodecError::mismatch("value", "object", json_type(&other))),
        }
    }

    fn next_entry(&mut self) -> Result<bool, CodecError> {
        let Some(ReadFrame::Map { entries, key, value }) = self.stack.last_mut() else {
            return Err(CodecError::malformed("entry read outside of a map"));
        };
        match entries.next() {
            Some((text, entry)) => {
                *value = Some(entry);
                let parsed = parse_map_key(text, key)?;
                self.current = Some(parsed);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn begin_map_value(&mut self) -> Result<(), CodecError> {
        let Some(ReadFrame::Map { value, .. }) = self.stack.last_mut() else {
            return Err(CodecError::malformed("map value read outside of a map"));
        };
        self.current = value.take();
        Ok(())
    }

    fn end_map(&mut self) -> Result<(), CodecError> {
        self.pop()
    }
}

/// Parses a default-value literal as a value of type `descriptor`.
///
/// The literal is JSON text in either key form. Text that is not valid JSON
/// is read as a bare string, so enum defaults may be written as `ADD` or
/// `Operator.ADD`.
///
/// # Errors
///
/// Fails if the literal does not describe a value of the type.
///
/// # Examples
///
/// ```rust
/// use schemata::descriptor::{Descriptor, EnumDescriptor, TypeName};
/// use schemata::message::Value;
/// use schemata::serialization::parse_literal;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let operator = EnumDescriptor::new(TypeName::new("calculator", "Operator"), [("ADD", 2), ("MULTIPLY", 4)])?;
/// let operator = Descriptor::from(operator);
/// assert_eq!(parse_literal("Operator.MULTIPLY", &operator)?, Value::Enum(4));
/// assert_eq!(parse_literal("[1, 2]", &Descriptor::list(Descriptor::I32))?, Value::List(vec![1.into(), 2.into()]));
/// # Ok(())
/// # }
/// # example().unwrap();
/// ```
pub fn parse_literal(literal: &str, descriptor: &Descriptor) -> Result<Value, CodecError> {
    let json = serde_json::from_str(literal).unwrap_or_else(|_| Json::String(literal.to_string()));
    let options = CodecOptions::default();
    Decoder::new(&options).read_value(&mut JsonReader::new(json), descriptor)
}

/// JSON serializer.
///
/// `JsonSerializer` writes compact JSON by default. Field keys and enum
/// values are numeric unless name mode is selected; the reader accepts
/// either form.
///
/// # Examples
///
/// ## ID and name keys
///
/// ```rust
/// use schemata::descriptor::{Descriptor, Field, MessageDescriptor, TypeName, Variant};
/// use schemata::message::{GenericMessage, Message};
/// use schemata::serialization::{JsonSerializer, Serializer};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let imaginary = MessageDescriptor::builder(TypeName::new("calculator", "Imaginary"), Variant::Struct)
///     .with_field(Field::new(1, "v", Descriptor::DOUBLE))
///     .with_field(Field::new(2, "i", Descriptor::DOUBLE))
///     .build()?;
/// let message = GenericMessage::builder(&imaginary).with(1, 1.7)?.with(2, -2.0)?.build_generic()?;
///
/// let by_id = JsonSerializer::new().to_vec(&message)?;
/// assert_eq!(by_id, br#"{"1":1.7,"2":-2}"#);
///
/// let by_name = JsonSerializer::new().named().to_vec(&message)?;
/// assert_eq!(by_name, br#"{"v":1.7,"i":-2}"#);
///
/// // Either form decodes with either configuration.
/// let decoded = JsonSerializer::new().from_slice(&by_name, &imaginary)?;
/// assert_eq!(decoded.get(2), message.get(2));
/// # Ok(())
/// # }
/// # example().unwrap();
/// ```
///
/// ## Pretty-printed JSON
///
/// ```rust
/// use schemata::serialization::{IdType, JsonSerializer};
///
/// let serializer = JsonSerializer::new().with_pretty_print().with_key_mode(IdType::Name);
/// ```
#[derive(Debug, Clone, Default)]
pub struct JsonSerializer {
    key_mode: IdType,
    enum_mode: IdType,
    pretty: bool,
    options: CodecOptions,
    metrics: Option<Arc<CodecMetrics>>,
}

impl JsonSerializer {
    /// Creates a new JSON serializer with default configuration.
    ///
    /// The default configuration produces compact JSON with numeric field
    /// keys and numeric enum values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses field names and enum constant names.
    pub fn named(self) -> Self {
        self.with_key_mode(IdType::Name).with_enum_mode(IdType::Name)
    }

    /// Sets how fields are keyed.
    pub fn with_key_mode(mut self, key_mode: IdType) -> Self {
        self.key_mode = key_mode;
        self
    }

    /// Sets how enum values are written.
    pub fn with_enum_mode(mut self, enum_mode: IdType) -> Self {
        self.enum_mode = enum_mode;
        self
    }

    /// Configures the serializer to produce pretty-printed JSON.
    pub fn with_pretty_print(mut self) -> Self {
        self.pretty = true;
        self
    }

    /// Configures the serializer to produce compact JSON.
    ///
    /// This is the default behavior.
    pub fn with_compact(mut self) -> Self {
        self.pretty = false;
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

    /// Returns how fields are keyed.
    pub fn key_mode(&self) -> IdType {
        self.key_mode
    }

    /// Returns how enum values are written.
    pub fn enum_mode(&self) -> IdType {
        self.enum_mode
    }

    fn emit(&self, out: &mut dyn Write, tree: Result<Json, CodecError>) -> Result<usize, CodecError> {
        let mut counter = CountingWriter::new(out);
        let result = tree.and_then(|tree| {
            if self.pretty {
                serde_json::to_writer_pretty(&mut counter, &tree)?;
            } else {
                serde_json::to_writer(&mut counter, &tree)?;
            }
            Ok(())
        });
        let written = counter.count();
        if let Some(metrics) = &self.metrics {
            metrics.record_encode(written, result.as_ref().err());
        }
        result?;
        trace!(bytes = written, pretty = self.pretty, "json encode complete");
        Ok(written)
    }

    fn parse<T, F>(&self, input: &mut dyn Read, decode: F) -> Result<T, CodecError>
    where
        F: FnOnce(&Decoder<'_>, &mut JsonReader) -> Result<T, CodecError>,
    {
        let mut counter = CountingReader::new(input);
        let result = serde_json::from_reader::<_, Json>(&mut counter)
            .map_err(CodecError::from)
            .and_then(|root| {
                let decoder = Decoder::new(&self.options).with_metrics(self.metrics.as_deref());
                decode(&decoder, &mut JsonReader::new(root))
            });
        let read = counter.count();
        if let Some(metrics) = &self.metrics {
            metrics.record_decode(read, result.as_ref().err());
        }
        trace!(bytes = read, ok = result.is_ok(), "json decode complete");
        result
    }

    fn writer(&self) -> JsonWriter {
        JsonWriter::new(self.key_mode, self.enum_mode)
    }
}

impl Serializer for JsonSerializer {
    fn serialize(&self, out: &mut dyn Write, message: &dyn Message) -> Result<usize, CodecError> {
        let mut writer = self.writer();
        let tree = write_message(&mut writer, message).and_then(|()| writer.finish());
        self.emit(out, tree)
    }

    fn deserialize(
        &self,
        input: &mut dyn Read,
        descriptor: &Arc<MessageDescriptor>,
    ) -> Result<Arc<dyn Message>, CodecError> {
        self.parse(input, |decoder, reader| decoder.read_message(reader, descriptor))
    }

    fn serialize_value(&self, out: &mut dyn Write, value: &Value, descriptor: &Descriptor) -> Result<usize, CodecError> {
        let mut writer = self.writer();
        let tree = write_value(&mut writer, value, descriptor).and_then(|()| writer.finish());
        self.emit(out, tree)
    }

    fn deserialize_value(&self, input: &mut dyn Read, descriptor: &Descriptor) -> Result<Value, CodecError> {
        self.parse(input, |decoder, reader| decoder.read_value(reader, descriptor))
    }

    fn name(&self) -> &'static str {
        "json"
    }

    fn mime_type(&self) -> &'static str {
        "application/json"
    }

    fn is_binary(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{TypeName, Variant};
    use crate::message::GenericMessage;

    fn record() -> Arc<MessageDescriptor> {
        let color = EnumDescriptor::new(TypeName::new("test", "Color"), [("RED", 1), ("GREEN", 2)]).unwrap();
        MessageDescriptor::builder(TypeName::new("test", "Record"), Variant::Struct)
            .with_field(Field::new(1, "id", Descriptor::I64))
            .with_field(Field::new(2, "blob", Descriptor::BINARY))
            .with_field(Field::new(3, "color", color.clone()))
            .with_field(Field::new(4, "scores", Descriptor::map(color, Descriptor::DOUBLE)))
            .with_field(Field::new(5, "flags", Descriptor::map(Descriptor::I32, Descriptor::BOOL)))
            .build()
            .unwrap()
    }

    fn to_string(serializer: &JsonSerializer, value: &Value, descriptor: &Descriptor) -> String {
        let mut out = Vec::new();
        serializer.serialize_value(&mut out, value, descriptor).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_integral_doubles_drop_fraction() {
        let serializer = JsonSerializer::new();
        assert_eq!(to_string(&serializer, &Value::Double(-2.0), &Descriptor::DOUBLE), "-2");
        assert_eq!(to_string(&serializer, &Value::Double(4.321), &Descriptor::DOUBLE), "4.321");
        assert_eq!(to_string(&serializer, &Value::Double(-0.0), &Descriptor::DOUBLE), "-0.0");

        let decoded = serializer.deserialize_value(&mut &b"-2"[..], &Descriptor::DOUBLE).unwrap();
        assert_eq!(decoded, Value::Double(-2.0));
    }

    #[test]
    fn test_non_finite_double_rejected() {
        let mut out = Vec::new();
        let error = JsonSerializer::new()
            .serialize_value(&mut out, &Value::Double(f64::NAN), &Descriptor::DOUBLE)
            .unwrap_err();
        assert!(matches!(error, CodecError::Unsupported { .. }));
    }

    #[test]
    fn test_binary_as_hex_and_enum_modes() {
        let descriptor = record();
        let message = GenericMessage::builder(&descriptor)
            .with(2, vec![0xCAu8, 0xFE])
            .unwrap()
            .with(3, Value::Enum(2))
            .unwrap()
            .build_generic()
            .unwrap();
        let by_id = JsonSerializer::new().to_vec(&message).unwrap();
        assert_eq!(by_id, br#"{"2":"cafe","3":2}"#);
        let by_name = JsonSerializer::new().named().to_vec(&message).unwrap();
        assert_eq!(by_name, br#"{"blob":"cafe","color":"GREEN"}"#);

        for bytes in [by_id, by_name] {
            let decoded = JsonSerializer::new().from_slice(&bytes, &descriptor).unwrap();
            assert_eq!(decoded.get(2), Some(Value::Binary(vec![0xCA, 0xFE])));
            assert_eq!(decoded.get(3), Some(Value::Enum(2)));
        }
    }

    #[test]
    fn test_map_keys() {
        let descriptor = record();
        let message = GenericMessage::builder(&descriptor)
            .with(4, Value::map([(Value::Enum(1), Value::Double(0.5))]))
            .unwrap()
            .with(5, Value::map([(Value::I32(7), Value::Bool(true))]))
            .unwrap()
            .build_generic()
            .unwrap();
        let by_name = JsonSerializer::new().named().to_vec(&message).unwrap();
        assert_eq!(by_name, br#"{"scores":{"RED":0.5},"flags":{"7":true}}"#);
        let by_id = JsonSerializer::new().to_vec(&message).unwrap();
        assert_eq!(by_id, br#"{"4":{"1":0.5},"5":{"7":true}}"#);

        let decoded = JsonSerializer::new().from_slice(&by_name, &descriptor).unwrap();
        assert_eq!(decoded.get(4), message.get(4));
        assert_eq!(decoded.get(5), message.get(5));
    }

    #[test]
    fn test_null_field_is_absent() {
        let decoded = JsonSerializer::new()
            .from_slice(br#"{"1":null,"color":"RED"}"#, &record())
            .unwrap();
        assert!(!decoded.has(1));
        assert_eq!(decoded.get(3), Some(Value::Enum(1)));
    }

    #[test]
    fn test_no_coercion() {
        let error = JsonSerializer::new()
            .from_slice(br#"{"id":"5"}"#, &record())
            .unwrap_err();
        assert!(matches!(error, CodecError::WireTypeMismatch { .. }));

        let error = JsonSerializer::new().from_slice(br#"{"id":1.5}"#, &record()).unwrap_err();
        assert!(matches!(error, CodecError::WireTypeMismatch { .. }));
    }

    #[test]
    fn test_unknown_enum_name() {
        let error = JsonSerializer::new()
            .from_slice(br#"{"color":"BLUE"}"#, &record())
            .unwrap_err();
        match error {
            CodecError::InvalidEnumValue { enum_name, value } => {
                assert_eq!(enum_name, "test.Color");
                assert_eq!(value, "BLUE");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_enum_name_with_foreign_prefix() {
        let qualified = JsonSerializer::new()
            .from_slice(br#"{"color":"test.Color.GREEN"}"#, &record())
            .unwrap();
        assert_eq!(qualified.get(3), Some(Value::Enum(2)));

        let error = JsonSerializer::new()
            .from_slice(br#"{"color":"Totally.Bogus.RED"}"#, &record())
            .unwrap_err();
        assert!(matches!(
            error,
            CodecError::InvalidEnumValue { ref value, .. } if value == "Totally.Bogus.RED"
        ));
    }

    #[test]
    fn test_unknown_fields() {
        let lenient = JsonSerializer::new().from_slice(br#"{"extra":[1,2],"9":{},"id":3}"#, &record()).unwrap();
        assert_eq!(lenient.get(1), Some(Value::I64(3)));

        let strict = JsonSerializer::new().with_options(CodecOptions::new().with_strict(true));
        let error = strict.from_slice(br#"{"extra":1}"#, &record()).unwrap_err();
        assert!(matches!(error, CodecError::UnknownField { .. }));
        let error = strict.from_slice(br#"{"nope":null}"#, &record()).unwrap_err();
        assert!(matches!(error, CodecError::UnknownField { ref field, .. } if field == "nope"));

        let known_null = strict.from_slice(br#"{"id":null}"#, &record()).unwrap();
        assert!(!known_null.has(1));
    }

    #[test]
    fn test_pretty_output_decodes_identically() {
        let descriptor = record();
        let message = GenericMessage::builder(&descriptor).with(1, 42i64).unwrap().build_generic().unwrap();
        let pretty = JsonSerializer::new().with_pretty_print().to_vec(&message).unwrap();
        assert_eq!(pretty, b"{\n  \"1\": 42\n}");
        let decoded = JsonSerializer::new().from_slice(&pretty, &descriptor).unwrap();
        assert_eq!(decoded.get(1), Some(Value::I64(42)));
    }

    #[test]
    fn test_parse_literal() {
        assert_eq!(parse_literal("\"abc\"", &Descriptor::STRING).unwrap(), Value::from("abc"));
        assert_eq!(parse_literal("abc", &Descriptor::STRING).unwrap(), Value::from("abc"));
        assert_eq!(parse_literal("true", &Descriptor::BOOL).unwrap(), Value::Bool(true));
        assert_eq!(
            parse_literal("{\"a\": 1}", &Descriptor::map(Descriptor::STRING, Descriptor::I16)).unwrap(),
            Value::map([(Value::from("a"), Value::I16(1))])
        );
        assert!(parse_literal("300", &Descriptor::BYTE).is_err());
    }

    #[test]
    fn test_metadata() {
        let serializer = JsonSerializer::new();
        assert_eq!(serializer.name(), "json");
        assert_eq!(serializer.mime_type(), "application/json");
        assert!(!serializer.is_binary());
    }
}
