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

//! Field-id protocol abstraction.
//!
//! [`ProtocolWriter`] and [`ProtocolReader`] model a tag-length-value
//! protocol in which every field carries a numeric id and a [`TType`], and
//! every container carries its element types and size. The identifiers are
//! the plain records the protocol exchanges at each boundary.

use crate::descriptor::{Descriptor, Primitive};
use crate::serialization::CodecError;
use std::fmt;

/// Wire type of a protocol field or container element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TType {
    /// End of a field list.
    Stop = 0,
    /// `bool`.
    Bool = 2,
    /// `byte`.
    Byte = 3,
    /// `double`.
    Double = 4,
    /// `i16`.
    I16 = 6,
    /// `i32` and enums.
    I32 = 8,
    /// `i64`.
    I64 = 10,
    /// `string` and `binary`.
    String = 11,
    /// Structs, unions and exceptions.
    Struct = 12,
    /// Maps.
    Map = 13,
    /// Sets.
    Set = 14,
    /// Lists.
    List = 15,
}

impl TType {
    /// Parses a type id.
    #[must_use]
    pub const fn from_u8(id: u8) -> Option<Self> {
        Some(match id {
            0 => Self::Stop,
            2 => Self::Bool,
            3 => Self::Byte,
            4 => Self::Double,
            6 => Self::I16,
            8 => Self::I32,
            10 => Self::I64,
            11 => Self::String,
            12 => Self::Struct,
            13 => Self::Map,
            14 => Self::Set,
            15 => Self::List,
            _ => return None,
        })
    }

    /// The type id.
    #[must_use]
    pub const fn id(self) -> u8 {
        self as u8
    }

    /// Protocol type used for values of `descriptor`.
    ///
    /// # Errors
    ///
    /// Fails for `void` and services.
    pub fn of(descriptor: &Descriptor) -> Result<Self, CodecError> {
        Ok(match descriptor {
            Descriptor::Primitive(primitive) => match primitive {
                Primitive::Bool => Self::Bool,
                Primitive::Byte => Self::Byte,
                Primitive::I16 => Self::I16,
                Primitive::I32 => Self::I32,
                Primitive::I64 => Self::I64,
                Primitive::Double => Self::Double,
                Primitive::String | Primitive::Binary => Self::String,
                Primitive::Void => return Err(CodecError::unsupported("void has no protocol type")),
            },
            Descriptor::Enum(_) => Self::I32,
            Descriptor::Message(_) => Self::Struct,
            Descriptor::Map(..) => Self::Map,
            Descriptor::Set(_) => Self::Set,
            Descriptor::List(_) => Self::List,
            Descriptor::Service(service) => {
                return Err(CodecError::unsupported(format!(
                    "service {} has no protocol type",
                    service.type_name()
                )));
            }
        })
    }
}

impl fmt::Display for TType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Stop => "STOP",
            Self::Bool => "BOOL",
            Self::Byte => "BYTE",
            Self::Double => "DOUBLE",
            Self::I16 => "I16",
            Self::I32 => "I32",
            Self::I64 => "I64",
            Self::String => "STRING",
            Self::Struct => "STRUCT",
            Self::Map => "MAP",
            Self::Set => "SET",
            Self::List => "LIST",
        })
    }
}

/// Header of a service call envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TMessageIdentifier {
    /// Method name.
    pub name: String,
    /// Call type id.
    pub message_type: u8,
    /// Sequence number pairing a reply with its call.
    pub sequence: i32,
}

/// Header of a struct.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TStructIdentifier {
    /// Struct name; not carried by binary protocols.
    pub name: String,
}

/// Header of a field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TFieldIdentifier {
    /// Field name; not carried by binary protocols.
    pub name: String,
    /// Wire type of the value. [`TType::Stop`] ends the field list.
    pub field_type: TType,
    /// Field id.
    pub id: i16,
}

impl TFieldIdentifier {
    /// Creates a field header.
    pub fn new(name: impl Into<String>, field_type: TType, id: i16) -> Self {
        Self {
            name: name.into(),
            field_type,
            id,
        }
    }

    /// The header that ends a field list.
    pub fn stop() -> Self {
        Self::new("", TType::Stop, 0)
    }
}

/// Header of a list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TListIdentifier {
    /// Element type.
    pub element_type: TType,
    /// Number of elements.
    pub size: usize,
}

/// Header of a set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TSetIdentifier {
    /// Element type.
    pub element_type: TType,
    /// Number of elements.
    pub size: usize,
}

/// Header of a map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TMapIdentifier {
    /// Key type.
    pub key_type: TType,
    /// Value type.
    pub value_type: TType,
    /// Number of entries.
    pub size: usize,
}

/// Output half of a field-id protocol.
pub trait ProtocolWriter {
    /// Opens a service call envelope.
    fn write_message_begin(&mut self, identifier: &TMessageIdentifier) -> Result<(), CodecError>;
    /// Closes a service call envelope.
    fn write_message_end(&mut self) -> Result<(), CodecError>;
    /// Opens a struct.
    fn write_struct_begin(&mut self, identifier: &TStructIdentifier) -> Result<(), CodecError>;
    /// Closes a struct.
    fn write_struct_end(&mut self) -> Result<(), CodecError>;
    /// Writes a field header.
    fn write_field_begin(&mut self, identifier: &TFieldIdentifier) -> Result<(), CodecError>;
    /// Closes a field.
    fn write_field_end(&mut self) -> Result<(), CodecError>;
    /// Ends a field list.
    fn write_field_stop(&mut self) -> Result<(), CodecError>;
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
    /// Opens a list.
    fn write_list_begin(&mut self, identifier: &TListIdentifier) -> Result<(), CodecError>;
    /// Closes a list.
    fn write_list_end(&mut self) -> Result<(), CodecError>;
    /// Opens a set.
    fn write_set_begin(&mut self, identifier: &TSetIdentifier) -> Result<(), CodecError>;
    /// Closes a set.
    fn write_set_end(&mut self) -> Result<(), CodecError>;
    /// Opens a map.
    fn write_map_begin(&mut self, identifier: &TMapIdentifier) -> Result<(), CodecError>;
    /// Closes a map.
    fn write_map_end(&mut self) -> Result<(), CodecError>;
    /// Flushes buffered output.
    fn flush(&mut self) -> Result<(), CodecError>;
}

/// Input half of a field-id protocol.
pub trait ProtocolReader {
    /// Reads a service call envelope header.
    fn read_message_begin(&mut self) -> Result<TMessageIdentifier, CodecError>;
    /// Closes a service call envelope.
    fn read_message_end(&mut self) -> Result<(), CodecError>;
    /// Opens a struct.
    fn read_struct_begin(&mut self) -> Result<Option<TStructIdentifier>, CodecError>;
    /// Closes a struct.
    fn read_struct_end(&mut self) -> Result<(), CodecError>;
    /// Reads a field header; [`TType::Stop`] marks the end of the struct.
    fn read_field_begin(&mut self) -> Result<TFieldIdentifier, CodecError>;
    /// Closes a field.
    fn read_field_end(&mut self) -> Result<(), CodecError>;
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
    /// Opens a list.
    fn read_list_begin(&mut self) -> Result<TListIdentifier, CodecError>;
    /// Closes a list.
    fn read_list_end(&mut self) -> Result<(), CodecError>;
    /// Opens a set.
    fn read_set_begin(&mut self) -> Result<TSetIdentifier, CodecError>;
    /// Closes a set.
    fn read_set_end(&mut self) -> Result<(), CodecError>;
    /// Opens a map.
    fn read_map_begin(&mut self) -> Result<TMapIdentifier, CodecError>;
    /// Closes a map.
    fn read_map_end(&mut self) -> Result<(), CodecError>;

    /// Discards a value of type `ttype`, nested at most `max_depth` deep.
    ///
    /// # Errors
    ///
    /// Fails if the value is deeper than `max_depth`, if it contains an
    /// invalid type or if the stream fails.
    fn skip(&mut self, ttype: TType, max_depth: usize) -> Result<(), CodecError> {
        if max_depth == 0 {
            return Err(CodecError::LimitExceeded {
                what: "nesting depth",
                limit: 0,
            });
        }
        match ttype {
            TType::Bool => self.read_bool().map(|_| ()),
            TType::Byte => self.read_byte().map(|_| ()),
            TType::I16 => self.read_i16().map(|_| ()),
            TType::I32 => self.read_i32().map(|_| ()),
            TType::I64 => self.read_i64().map(|_| ()),
            TType::Double => self.read_double().map(|_| ()),
            TType::String => self.read_binary().map(|_| ()),
            TType::Struct => {
                self.read_struct_begin()?;
                loop {
                    let field = self.read_field_begin()?;
                    if field.field_type == TType::Stop {
                        break;
                    }
                    self.skip(field.field_type, max_depth - 1)?;
                    self.read_field_end()?;
                }
                self.read_struct_end()
            }
            TType::List => {
                let list = self.read_list_begin()?;
                for _ in 0..list.size {
                    self.skip(list.element_type, max_depth - 1)?;
                }
                self.read_list_end()
            }
            TType::Set => {
                let set = self.read_set_begin()?;
                for _ in 0..set.size {
                    self.skip(set.element_type, max_depth - 1)?;
                }
                self.read_set_end()
            }
            TType::Map => {
                let map = self.read_map_begin()?;
                for _ in 0..map.size {
                    self.skip(map.key_type, max_depth - 1)?;
                    self.skip(map.value_type, max_depth - 1)?;
                }
                self.read_map_end()
            }
            TType::Stop => Err(CodecError::malformed("cannot skip a STOP value")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::EnumDescriptor;
    use crate::descriptor::TypeName;

    #[test]
    fn test_ttype_ids_round_trip() {
        for id in 0..=20u8 {
            if let Some(ttype) = TType::from_u8(id) {
                assert_eq!(ttype.id(), id);
            }
        }
        assert_eq!(TType::from_u8(1), None);
        assert_eq!(TType::from_u8(16), None);
    }

    #[test]
    fn test_ttype_of_descriptor() {
        let color = EnumDescriptor::new(TypeName::new("t", "Color"), [("RED", 1)]).unwrap();
        assert_eq!(TType::of(&Descriptor::BINARY).unwrap(), TType::String);
        assert_eq!(TType::of(&Descriptor::from(color)).unwrap(), TType::I32);
        assert_eq!(TType::of(&Descriptor::set(Descriptor::I64)).unwrap(), TType::Set);
        assert!(TType::of(&Descriptor::VOID).is_err());
    }
}
